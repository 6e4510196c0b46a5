// Unit tests for error module
// Tests the text shown to users versus the text written to logs

use crate::error::CubesolveError;

/// **VALUE**: Verifies log output carries kind and location while `message()` does not.
///
/// **WHY THIS MATTERS**: The console prints `message()` after a typo; a source path in
/// front of the user is noise, but the log needs it.
///
/// **BUG THIS CATCHES**: Would catch the Display format losing the location, or
/// `message()` returning the full Display string.
#[test]
fn given_input_error_when_displayed_then_log_text_has_location_and_message_does_not() {
    // GIVEN
    let err = CubesolveError::input("Unknown command 'foo'");

    // WHEN
    let logged = err.to_string();

    // THEN
    assert!(logged.starts_with("Input Error: Unknown command 'foo' ["), "{logged}");
    assert!(logged.contains("error.rs"), "{logged}");
    assert_eq!(err.message(), "Unknown command 'foo'");
}

#[test]
fn given_displayable_error_when_wrapped_as_core_then_message_preserved() {
    let err = CubesolveError::core("Config Validation Error: bad url");

    assert!(matches!(err, CubesolveError::Core { .. }));
    assert_eq!(err.message(), "Config Validation Error: bad url");
    assert!(err.to_string().starts_with("Core Error: Config Validation Error"));
}
