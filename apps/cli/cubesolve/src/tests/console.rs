// Unit tests for console parsing and status rendering

use crate::console::{ConsoleInput, parse_line, render_status};
use crate::error::CubesolveError;

use session_core::connection::ConnectionState;
use session_core::machine::UserAction;
use session_core::session::{CalibrationView, SessionCommand, SessionSnapshot};

use models::{
    BoundingBox, CalibrationProfile, FaceCells, FaceId, FaceRecord, SessionPhase, StatusLine,
};

fn action(action: UserAction) -> ConsoleInput {
    ConsoleInput::Command(SessionCommand::Action(action))
}

fn snapshot(phase: SessionPhase, status: StatusLine) -> SessionSnapshot {
    SessionSnapshot {
        session_id: "test".to_string(),
        phase,
        workflow: phase,
        status,
        connection: ConnectionState::default(),
        faces: FaceId::ALL.map(FaceRecord::placeholder).to_vec(),
        calibration: CalibrationView::default(),
        profile: CalibrationProfile::default(),
        moves: Vec::new(),
        current_move_index: 0,
        wrong_move_count: 0,
        streaming: false,
        devices: Vec::new(),
        active_device: None,
    }
}

/// **VALUE**: Verifies every console command maps to the session command it names.
///
/// **BUG THIS CATCHES**: Would catch swapped mappings (e.g. `accept` sending
/// `StartCalibration`) that would silently drive the session somewhere else.
#[test]
fn given_known_commands_when_parsed_then_map_to_session_commands() {
    // GIVEN
    let cases = vec![
        ("connect", action(UserAction::Connect)),
        ("disconnect", action(UserAction::Disconnect)),
        ("restart", action(UserAction::Restart)),
        ("confirm y", action(UserAction::ConfirmFace(FaceId::Yellow))),
        ("rescan orange", action(UserAction::RescanFace(FaceId::Orange))),
        ("solve", action(UserAction::GetSolution)),
        ("calibrate", action(UserAction::StartCalibration)),
        ("accept", action(UserAction::ConfirmCalibration)),
        ("pick B", action(UserAction::SelectCalibrationColor(FaceId::Blue))),
        ("reset-calibration", action(UserAction::ResetCalibration)),
        (
            "region 10 20 200 180",
            action(UserAction::SetCubeRegion(BoundingBox::new(10, 20, 200, 180))),
        ),
        (
            "device cam-2",
            ConsoleInput::Command(SessionCommand::SelectDevice("cam-2".to_string())),
        ),
        ("QUIT", ConsoleInput::Command(SessionCommand::Shutdown)),
        ("status", ConsoleInput::Status),
        ("snapshot", ConsoleInput::Snapshot),
        ("help", ConsoleInput::Help),
        ("   ", ConsoleInput::Empty),
    ];

    // WHEN / THEN
    for (line, expected) in cases {
        assert_eq!(parse_line(line).unwrap(), expected, "line: {line:?}");
    }
}

#[test]
fn given_bad_input_when_parsed_then_input_errors() {
    let cases = [
        ("dance", "Unknown command 'dance'"),
        ("confirm", "Wrong number of arguments for 'confirm'"),
        ("confirm purple", "Unknown face 'purple'"),
        ("region 1 2 x 4", "'x' is not a whole number"),
        ("solve now", "Wrong number of arguments for 'solve'"),
    ];

    for (line, expected) in cases {
        let err = parse_line(line).unwrap_err();
        assert!(matches!(err, CubesolveError::Input { .. }), "line: {line:?}");
        assert!(
            err.message().starts_with(expected),
            "line {line:?} gave {:?}",
            err.message()
        );
    }
}

#[test]
fn given_idle_snapshot_when_rendered_then_phase_and_status_only() {
    let line = render_status(&snapshot(SessionPhase::Idle, StatusLine::info("Idle")));

    assert_eq!(line, "[idle] Idle");
}

/// **VALUE**: Verifies the status line shows solve progress and warnings.
///
/// **WHY THIS MATTERS**: The console is the only view in this front end; the next
/// move and the wrong-move count are what the user acts on.
#[test]
fn given_solving_snapshot_when_rendered_then_shows_progress() {
    // GIVEN
    let mut state = snapshot(
        SessionPhase::Solving,
        StatusLine::warning("Wrong move (1/3)"),
    );
    for record in &mut state.faces {
        record.cells = FaceCells::uniform(record.face);
        record.confirmed = true;
    }
    state.moves = vec!["R".into(), "U".into(), "R'".into()];
    state.current_move_index = 1;
    state.wrong_move_count = 1;

    // WHEN
    let line = render_status(&state);

    // THEN
    assert_eq!(
        line,
        "[solving] WARNING: Wrong move (1/3) | faces 6/6 | next U (2/3) | wrong moves 1"
    );
}

#[test]
fn given_fatal_snapshot_when_rendered_then_marked_fatal() {
    let line = render_status(&snapshot(
        SessionPhase::ErrorFatal,
        StatusLine::fatal("Unable to reach the service"),
    ));

    assert_eq!(line, "[error_fatal] FATAL: Unable to reach the service");
}
