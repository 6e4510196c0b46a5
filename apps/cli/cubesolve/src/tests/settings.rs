// Unit tests for settings resolution
// Every test touching the environment runs serially

use crate::error::CubesolveError;
use crate::settings::{
    ENV_CAMERA_IMAGE, ENV_CONFIG_DIR, ENV_LOG_DIR, ENV_SERVICE_URL, apply_env_overrides,
    config_dir, load,
};

use session_core::config::SessionConfig;

use std::env;
use std::path::{Path, PathBuf};

use serial_test::serial;

fn set_var(key: &str, value: impl AsRef<std::ffi::OsStr>) {
    // SAFETY: callers are #[serial], so no other test reads the environment concurrently
    unsafe { env::set_var(key, value) };
}

fn clear_vars() {
    for key in [ENV_CONFIG_DIR, ENV_LOG_DIR, ENV_SERVICE_URL, ENV_CAMERA_IMAGE] {
        // SAFETY: see set_var
        unsafe { env::remove_var(key) };
    }
}

/// **VALUE**: Verifies `CUBESOLVE_SERVICE_URL` replaces the configured base URL.
///
/// **WHY THIS MATTERS**: Pointing the client at a service on another machine should
/// not require editing the JSON config.
///
/// **BUG THIS CATCHES**: Would catch the override being read but not applied, or
/// applied without validation.
#[test]
#[serial]
fn given_service_url_env_when_overrides_applied_then_base_url_replaced() {
    // GIVEN
    clear_vars();
    set_var(ENV_SERVICE_URL, "https://cube.example.com:9000");
    let mut config = SessionConfig::default();

    // WHEN
    let result = apply_env_overrides(&mut config);

    // THEN
    assert!(result.is_ok());
    assert_eq!(config.service.base_url, "https://cube.example.com:9000");
    assert_eq!(
        config.ws_url().unwrap().as_str(),
        "wss://cube.example.com:9000/ws"
    );
    clear_vars();
}

#[test]
#[serial]
fn given_invalid_service_url_env_when_overrides_applied_then_core_error() {
    clear_vars();
    set_var(ENV_SERVICE_URL, "ftp://cube.example.com");
    let mut config = SessionConfig::default();

    let result = apply_env_overrides(&mut config);

    assert!(matches!(result, Err(CubesolveError::Core { .. })));
    clear_vars();
}

#[test]
#[serial]
fn given_blank_service_url_env_when_overrides_applied_then_config_unchanged() {
    clear_vars();
    set_var(ENV_SERVICE_URL, "   ");
    let mut config = SessionConfig::default();

    apply_env_overrides(&mut config).unwrap();

    assert_eq!(config, SessionConfig::default());
    clear_vars();
}

#[test]
#[serial]
fn given_config_dir_env_when_resolved_then_env_path_used() {
    clear_vars();
    set_var(ENV_CONFIG_DIR, "/tmp/cubesolve-config");

    let dir = config_dir().unwrap();

    assert_eq!(dir, PathBuf::from("/tmp/cubesolve-config"));
    clear_vars();
}

/// **VALUE**: Verifies the full load: file from the config dir, then env overrides.
///
/// **BUG THIS CATCHES**: Would catch overrides applied before the file is read (and
/// then overwritten by it), or the camera image variable being ignored.
#[test]
#[serial]
fn given_saved_config_and_env_when_loaded_then_env_wins() {
    // GIVEN
    clear_vars();
    let config_dir = tempfile::tempdir().unwrap();
    let mut saved = SessionConfig::default();
    saved.service.base_url = "http://10.0.0.5:8000".to_string();
    saved.frames.jpeg_quality = 55;
    saved.save(config_dir.path()).unwrap();

    set_var(ENV_CONFIG_DIR, config_dir.path());
    set_var(ENV_LOG_DIR, config_dir.path().join("logs"));
    set_var(ENV_SERVICE_URL, "http://10.0.0.9:8000");
    set_var(ENV_CAMERA_IMAGE, "/tmp/cube.jpg");

    // WHEN
    let settings = load().unwrap();

    // THEN
    assert_eq!(settings.config_dir, config_dir.path());
    assert_eq!(settings.log_dir, config_dir.path().join("logs"));
    assert_eq!(settings.config.service.base_url, "http://10.0.0.9:8000");
    assert_eq!(settings.config.frames.jpeg_quality, 55);
    assert_eq!(settings.camera_image.as_deref(), Some(Path::new("/tmp/cube.jpg")));
    clear_vars();
}
