use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every connection, protocol and calibration error in the engine
/// embeds a location. If capture breaks, a dropped frame or rejected confirmation can no
/// longer be traced back to the handler that produced it.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` stops being propagated or
/// the file path is lost.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN: Current caller location
    // WHEN: Creating ErrorLocation from caller
    let location = ErrorLocation::from(Location::caller());

    // THEN: Should capture file, line, and column
    assert!(location.file.contains("error_location.rs"));
    assert!(location.line > 0);
    assert!(location.column > 0);
}

/// **VALUE**: Verifies that Display produces the bracketed `[file:line:column]` format.
///
/// **WHY THIS MATTERS**: Status lines and log output append the location verbatim. A broken
/// format makes fatal-error output unreadable.
///
/// **BUG THIS CATCHES**: Would catch if the Display impl drops the brackets or a component.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::caller();

    // WHEN: Formatting as string
    let formatted = location.to_string();

    // THEN: Should produce "[file:line:column]"
    assert!(formatted.starts_with('['));
    assert!(formatted.ends_with(']'));
    assert!(formatted.contains(&format!(":{}:{}", location.line, location.column)));
}

/// **VALUE**: Verifies that `caller()` reports the call site, not its own body.
///
/// **WHY THIS MATTERS**: Error constructors across the engine are `#[track_caller]`. If
/// `caller()` reported its own line, every error would point into the common crate.
///
/// **BUG THIS CATCHES**: Would catch if `#[track_caller]` is removed from `caller()`.
#[test]
fn given_two_call_sites_when_caller_used_then_lines_differ() {
    // GIVEN: A helper that forwards its caller
    #[track_caller]
    fn capture() -> ErrorLocation {
        ErrorLocation::caller()
    }

    // WHEN: Capturing from two consecutive lines
    let first = capture();
    let second = capture();

    // THEN: Same file, consecutive lines
    assert_eq!(first.file, second.file);
    assert_eq!(first.line + 1, second.line);
}

/// **VALUE**: Verifies that `file_name()` strips directories.
///
/// **WHY THIS MATTERS**: The CLI prints compact locations next to fatal status text.
///
/// **BUG THIS CATCHES**: Would catch a separator bug that returns the full path or an
/// empty string.
#[test]
fn given_nested_path_when_file_name_called_then_returns_last_component() {
    // GIVEN: A location inside a nested path
    let location = ErrorLocation {
        file: "backend/session-core/src/connection/manager.rs",
        line: 1,
        column: 1,
    };

    // WHEN / THEN
    assert_eq!(location.file_name(), "manager.rs");
}
