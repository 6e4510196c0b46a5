use log::debug;

/// Wrong moves tolerated before the solve is abandoned.
pub const WRONG_MOVE_LIMIT: u8 = 3;

/// Moves of the active solution and progress through them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveState {
    moves: Vec<String>,
    current_move_index: usize,
    wrong_move_count: u8,
}

impl SolveState {
    /// Replace the solution. The wrong-move counter starts over.
    pub fn begin(&mut self, moves: Vec<String>, current_move: usize) {
        self.current_move_index = current_move.min(moves.len());
        self.moves = moves;
        self.wrong_move_count = 0;
        debug!(
            "Solution with {} moves, at {}",
            self.moves.len(),
            self.current_move_index
        );
    }

    /// Count a wrong move and return the new total.
    pub fn record_wrong_move(&mut self) -> u8 {
        self.wrong_move_count = self.wrong_move_count.saturating_add(1);
        self.wrong_move_count
    }

    pub fn limit_reached(&self) -> bool {
        self.wrong_move_count >= WRONG_MOVE_LIMIT
    }

    pub fn reset(&mut self) {
        self.moves.clear();
        self.current_move_index = 0;
        self.wrong_move_count = 0;
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn current_move_index(&self) -> usize {
        self.current_move_index
    }

    pub fn current_move(&self) -> Option<&str> {
        self.moves.get(self.current_move_index).map(String::as_str)
    }

    pub fn wrong_move_count(&self) -> u8 {
        self.wrong_move_count
    }
}
