use crate::config::SessionConfig;
use crate::error::config::ConfigError;

use std::fs;

use tempfile::TempDir;

#[test]
fn given_default_config_when_endpoints_derived_then_point_at_local_service() {
    let config = SessionConfig::default();

    assert_eq!(config.ws_url().unwrap().as_str(), "ws://localhost:8000/ws");
    assert_eq!(
        config.health_url().unwrap().as_str(),
        "http://localhost:8000/health"
    );
    assert!(config.validate().is_ok());
}

#[test]
fn given_https_base_when_ws_url_derived_then_uses_wss() {
    let mut config = SessionConfig::default();
    config.service.base_url = "https://cube.example.com".to_string();

    assert_eq!(
        config.ws_url().unwrap().as_str(),
        "wss://cube.example.com/ws"
    );
}

/// **VALUE**: Verifies validation rejects values that would break the session loop.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - A zero frame interval is accepted (a busy loop on the ticker)
/// - A cap below the base delay is accepted
/// - A non-HTTP base URL slips through to the WebSocket client
#[test]
fn given_invalid_values_when_validated_then_validation_error() {
    let cases: Vec<Box<dyn Fn(&mut SessionConfig)>> = vec![
        Box::new(|c: &mut SessionConfig| c.version = 0),
        Box::new(|c: &mut SessionConfig| c.service.base_url = "ftp://localhost".to_string()),
        Box::new(|c: &mut SessionConfig| c.service.ws_path = "ws".to_string()),
        Box::new(|c: &mut SessionConfig| c.reconnect.cap_delay_ms = 1_000),
        Box::new(|c: &mut SessionConfig| c.frames.interval_ms = 0),
        Box::new(|c: &mut SessionConfig| c.frames.jpeg_quality = 0),
        Box::new(|c: &mut SessionConfig| c.liveness.max_attempts = 0),
    ];

    for mutate in cases {
        let mut config = SessionConfig::default();
        mutate(&mut config);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}

/// **VALUE**: Verifies save then load returns the same config.
///
/// **WHY THIS MATTERS**: The CLI persists service URL changes. A lossy save would
/// reset users to localhost on the next run.
///
/// **BUG THIS CATCHES**: Would catch if the temp file is left behind or not renamed.
#[test]
fn given_saved_config_when_loaded_then_values_preserved() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let mut config = SessionConfig::default();
    config.service.base_url = "http://10.0.0.5:9000".to_string();
    config.frames.jpeg_quality = 55;

    // WHEN
    config.save(dir.path()).unwrap();
    let loaded = SessionConfig::load(dir.path()).unwrap();

    // THEN
    assert_eq!(loaded, config);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn given_missing_file_when_loaded_then_defaults() {
    let dir = TempDir::new().unwrap();

    let loaded = SessionConfig::load(dir.path()).unwrap();

    assert_eq!(loaded, SessionConfig::default());
}

#[test]
fn given_partial_file_when_loaded_then_missing_fields_use_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"frames": {"interval_ms": 500}}"#,
    )
    .unwrap();

    let loaded = SessionConfig::load(dir.path()).unwrap();

    assert_eq!(loaded.frames.interval_ms, 500);
    assert_eq!(loaded.frames.max_width, 320);
    assert_eq!(loaded.reconnect.max_attempts, 5);
}

#[test]
fn given_corrupt_file_when_loaded_then_parse_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.json"), "{not json").unwrap();

    let result = SessionConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}
