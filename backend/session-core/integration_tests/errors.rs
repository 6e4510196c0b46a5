use session_core::config::SessionConfig;
use session_core::error::CoreError;
use session_core::error::session::SessionError;
use session_core::protocol::InboundMessage;
use session_core::registry::CubeFaceRegistry;
use session_core::session::spawn_session;

use models::FaceId;

/// **VALUE**: Verifies errors name the kind, the details and the line that raised them.
///
/// **WHY THIS MATTERS**: Errors end up as one log line. Without the location a
/// wrong-face confirm is hard to trace back to the caller that sent it.
///
/// **BUG THIS CATCHES**: Would catch a dropped `#[track_caller]` that makes every
/// location point inside the registry instead of at the caller.
#[test]
fn given_unscanned_face_when_confirmed_then_error_points_at_caller() {
    // GIVEN
    let mut registry = CubeFaceRegistry::new();

    // WHEN
    let error = registry.confirm(FaceId::Blue).unwrap_err();
    let text = CoreError::from(error).to_string();

    // THEN
    assert!(text.starts_with("Face Not Found Error: face B"), "{text}");
    assert!(text.contains("errors.rs"), "{text}");
}

#[test]
fn given_malformed_json_when_decoded_then_decode_error_names_problem() {
    let error = InboundMessage::decode(r#"{"status":"face_detected","colors":"YYY"}"#)
        .unwrap_err()
        .to_string();

    assert!(error.starts_with("Decode Error:"), "{error}");
}

#[test]
fn given_no_runtime_when_session_spawned_then_startup_error() {
    let result = spawn_session(SessionConfig::default(), Vec::new());

    assert!(matches!(result, Err(SessionError::Startup { .. })));
}

#[tokio::test]
async fn given_invalid_config_when_session_spawned_then_startup_error_carries_reason() {
    let mut config = SessionConfig::default();
    config.service.base_url = "ftp://localhost:8000".to_string();

    let Err(error) = spawn_session(config, Vec::new()) else {
        panic!("invalid config must not start a session");
    };

    let text = error.to_string();
    assert!(text.starts_with("Session Startup Error:"), "{text}");
    assert!(text.contains("Config Validation Error"), "{text}");
}
