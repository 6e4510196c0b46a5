//! Line-oriented console: commands in on stdin, status lines out on stdout.

use crate::error::CubesolveError;

use session_core::machine::UserAction;
use session_core::session::{SessionCommand, SessionHandle, SessionSnapshot};

use models::face::FACE_COUNT;
use models::{BoundingBox, FaceId, StatusSeverity};

use common::ErrorLocation;

use std::str::FromStr;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};

pub const HELP: &str = "\
Commands:
  connect | disconnect | restart
  confirm <face>        confirm a scanned face (Y W R G B O or color name)
  rescan <face>         clear a face so it is scanned again
  solve                 request the solution once all faces are confirmed
  calibrate             start color calibration
  accept                accept the detected calibration color
  pick <face>           use the reference color of <face> for this step
  reset-calibration     return to the default colors
  region <x> <y> <w> <h>
  device <id>           switch capture device
  status | snapshot | help | quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(SessionCommand),
    Status,
    /// Print the full snapshot as JSON.
    Snapshot,
    Help,
    Empty,
}

/// Parse a console line.
///
/// # Errors
///
/// Returns [`CubesolveError::Input`] for unknown commands and bad arguments.
#[track_caller]
pub fn parse_line(line: &str) -> Result<ConsoleInput, CubesolveError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(ConsoleInput::Empty);
    };
    let args: Vec<&str> = words.collect();

    let action = |action: UserAction| -> Result<ConsoleInput, CubesolveError> {
        Ok(ConsoleInput::Command(SessionCommand::Action(action)))
    };

    match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("connect", []) => action(UserAction::Connect),
        ("disconnect", []) => action(UserAction::Disconnect),
        ("restart", []) => action(UserAction::Restart),
        ("confirm", [face]) => action(UserAction::ConfirmFace(parse_face(face)?)),
        ("rescan", [face]) => action(UserAction::RescanFace(parse_face(face)?)),
        ("solve", []) => action(UserAction::GetSolution),
        ("calibrate", []) => action(UserAction::StartCalibration),
        ("accept", []) => action(UserAction::ConfirmCalibration),
        ("pick", [face]) => action(UserAction::SelectCalibrationColor(parse_face(face)?)),
        ("reset-calibration", []) => action(UserAction::ResetCalibration),
        ("region", [x, y, w, h]) => action(UserAction::SetCubeRegion(BoundingBox::new(
            parse_coord(x)?,
            parse_coord(y)?,
            parse_coord(w)?,
            parse_coord(h)?,
        ))),
        ("device", [id]) => Ok(ConsoleInput::Command(SessionCommand::SelectDevice(
            (*id).to_string(),
        ))),
        ("quit" | "exit", []) => Ok(ConsoleInput::Command(SessionCommand::Shutdown)),
        ("status", []) => Ok(ConsoleInput::Status),
        ("snapshot", []) => Ok(ConsoleInput::Snapshot),
        ("help" | "?", []) => Ok(ConsoleInput::Help),
        (
            "connect" | "disconnect" | "restart" | "confirm" | "rescan" | "solve" | "calibrate"
            | "accept" | "pick" | "reset-calibration" | "region" | "device" | "quit" | "exit"
            | "status" | "snapshot" | "help" | "?",
            _,
        ) => Err(CubesolveError::input(format!(
            "Wrong number of arguments for '{command}'"
        ))),
        _ => Err(CubesolveError::input(format!("Unknown command '{command}'"))),
    }
}

/// One-line summary of a snapshot.
pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut line = format!("[{}] ", snapshot.phase);

    match snapshot.status.severity {
        StatusSeverity::Info => {}
        StatusSeverity::Warning => line.push_str("WARNING: "),
        StatusSeverity::Fatal => line.push_str("FATAL: "),
    }
    line.push_str(&snapshot.status.text);

    let confirmed = snapshot.faces.iter().filter(|r| r.confirmed).count();
    if confirmed > 0 {
        line.push_str(&format!(" | faces {confirmed}/{FACE_COUNT}"));
    }

    if let Some(next) = snapshot.current_move() {
        line.push_str(&format!(
            " | next {next} ({}/{})",
            snapshot.current_move_index + 1,
            snapshot.moves.len()
        ));
    }

    if snapshot.wrong_move_count > 0 {
        line.push_str(&format!(" | wrong moves {}", snapshot.wrong_move_count));
    }

    line
}

/// Read commands until `quit`, end of input, or the session ends.
///
/// A status line is printed whenever the rendered status changes.
pub async fn run(mut handle: SessionHandle) -> Result<(), CubesolveError> {
    let mut lines = BufReader::new(stdin()).lines();
    let mut last_line = render_status(&handle.snapshot());
    println!("{last_line}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|e| CubesolveError::Cubesolve {
                    message: format!("Failed to read stdin: {e}"),
                    location: ErrorLocation::from(std::panic::Location::caller()),
                })?;

                let Some(line) = line else {
                    info!("End of input");
                    break;
                };

                match parse_line(&line) {
                    Ok(ConsoleInput::Command(SessionCommand::Shutdown)) => break,
                    Ok(ConsoleInput::Command(command)) => {
                        debug!("Console command: {command:?}");
                        handle.send(command).map_err(CubesolveError::core)?;
                    }
                    Ok(ConsoleInput::Status) => println!("{}", render_status(&handle.snapshot())),
                    Ok(ConsoleInput::Snapshot) => {
                        let json = serde_json::to_string_pretty(&handle.snapshot())
                            .map_err(CubesolveError::core)?;
                        println!("{json}");
                    }
                    Ok(ConsoleInput::Help) => println!("{HELP}"),
                    Ok(ConsoleInput::Empty) => {}
                    Err(e) => {
                        debug!("{e}");
                        println!("{}. Type 'help' for commands.", e.message());
                    }
                }
            }
            changed = handle.changed() => {
                let Ok(snapshot) = changed else {
                    warn!("Session ended unexpectedly");
                    break;
                };
                let line = render_status(&snapshot);
                if line != last_line {
                    println!("{line}");
                    last_line = line;
                }
            }
        }
    }

    if handle.shutdown().is_ok() {
        handle.closed().await;
    }
    Ok(())
}

#[track_caller]
fn parse_face(value: &str) -> Result<FaceId, CubesolveError> {
    FaceId::from_str(value).map_err(|_| {
        CubesolveError::input(format!(
            "Unknown face '{value}', expected one of Y W R G B O"
        ))
    })
}

#[track_caller]
fn parse_coord(value: &str) -> Result<i32, CubesolveError> {
    value
        .parse()
        .map_err(|_| CubesolveError::input(format!("'{value}' is not a whole number")))
}
