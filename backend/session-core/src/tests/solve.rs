use crate::solve::{SolveState, WRONG_MOVE_LIMIT};

fn moves(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|m| m.to_string()).collect()
}

/// **VALUE**: Verifies a fresh solution resets the wrong-move counter.
///
/// **WHY THIS MATTERS**: The service re-sends `solving` after every correct move. Two
/// unrelated slips across a long solve must not add up to an abort.
///
/// **BUG THIS CATCHES**: Would catch if `begin` keeps the previous count.
#[test]
fn given_wrong_moves_when_new_solution_begins_then_counter_resets() {
    // GIVEN
    let mut solve = SolveState::default();
    solve.begin(moves(&["R", "U"]), 0);
    solve.record_wrong_move();
    solve.record_wrong_move();

    // WHEN
    solve.begin(moves(&["U", "R'"]), 1);

    // THEN
    assert_eq!(solve.wrong_move_count(), 0);
    assert_eq!(solve.current_move(), Some("R'"));
}

#[test]
fn given_limit_wrong_moves_when_recorded_then_limit_reached() {
    let mut solve = SolveState::default();
    solve.begin(moves(&["R"]), 0);

    for _ in 0..WRONG_MOVE_LIMIT {
        assert!(!solve.limit_reached());
        solve.record_wrong_move();
    }

    assert!(solve.limit_reached());
    solve.reset();
    assert!(solve.moves().is_empty());
    assert_eq!(solve.current_move_index(), 0);
}

#[test]
fn given_index_past_end_when_begun_then_clamped() {
    let mut solve = SolveState::default();

    solve.begin(moves(&["R", "U"]), 7);

    assert_eq!(solve.current_move_index(), 2);
    assert_eq!(solve.current_move(), None);
}
