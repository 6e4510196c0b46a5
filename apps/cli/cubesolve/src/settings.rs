//! Where cubesolve keeps its files and how the environment overrides them.
//!
//! # Platform Behavior
//! - **Linux**: `$XDG_CONFIG_HOME/cubesolve` and `$XDG_DATA_HOME/cubesolve`
//! - **macOS**: `~/Library/Application Support/cubesolve`
//! - **Windows**: `%APPDATA%\cubesolve` and `%LOCALAPPDATA%\cubesolve`

use crate::error::CubesolveError;

use session_core::config::SessionConfig;

use common::ErrorLocation;

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const APP_DIR_NAME: &str = "cubesolve";

pub const ENV_CONFIG_DIR: &str = "CUBESOLVE_CONFIG_DIR";
pub const ENV_LOG_DIR: &str = "CUBESOLVE_LOG_DIR";
pub const ENV_SERVICE_URL: &str = "CUBESOLVE_SERVICE_URL";
pub const ENV_CAMERA_IMAGE: &str = "CUBESOLVE_CAMERA_IMAGE";

#[derive(Debug, Clone)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
    pub config: SessionConfig,
    /// Image replayed as the camera feed; a test pattern when unset.
    pub camera_image: Option<PathBuf>,
}

/// Load `.env` from the working directory, then from beside the executable.
///
/// Returns the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from {}", path.display());
        return Some(path);
    }

    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let env_path = exe_dir.join(".env");
    if !env_path.exists() {
        return None;
    }

    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            info!("Loaded .env from {}", env_path.display());
            Some(env_path)
        }
        Err(e) => {
            warn!("Failed to parse .env at {}: {e}", env_path.display());
            None
        }
    }
}

#[track_caller]
pub fn config_dir() -> Result<PathBuf, CubesolveError> {
    resolve_dir(ENV_CONFIG_DIR, dirs::config_dir(), "config")
}

#[track_caller]
pub fn log_dir() -> Result<PathBuf, CubesolveError> {
    resolve_dir(ENV_LOG_DIR, dirs::data_local_dir(), "log")
}

/// Apply environment overrides on top of the loaded file.
///
/// # Errors
///
/// Returns [`CubesolveError::Core`] if the override makes the config invalid.
#[track_caller]
pub fn apply_env_overrides(config: &mut SessionConfig) -> Result<(), CubesolveError> {
    if let Some(url) = non_empty_var(ENV_SERVICE_URL) {
        info!("Using {ENV_SERVICE_URL} override: {url}");
        config.service.base_url = url;
        config.validate().map_err(CubesolveError::core)?;
    }
    Ok(())
}

/// Resolve directories, load the config file and apply overrides.
///
/// # Errors
///
/// Returns an error if no directory can be determined or the config file is
/// corrupt or invalid. A missing config file is not an error.
pub fn load() -> Result<Settings, CubesolveError> {
    let config_dir = config_dir()?;
    let log_dir = log_dir()?;

    let mut config = SessionConfig::load(&config_dir).map_err(CubesolveError::core)?;
    apply_env_overrides(&mut config)?;

    let camera_image = non_empty_var(ENV_CAMERA_IMAGE).map(PathBuf::from);

    debug!(
        "Settings: config_dir={}, log_dir={}, service={}",
        config_dir.display(),
        log_dir.display(),
        config.service.base_url
    );

    Ok(Settings {
        config_dir,
        log_dir,
        config,
        camera_image,
    })
}

#[track_caller]
fn resolve_dir(
    env_key: &str,
    platform_dir: Option<PathBuf>,
    kind: &str,
) -> Result<PathBuf, CubesolveError> {
    let location = ErrorLocation::caller();

    if let Some(custom) = non_empty_var(env_key) {
        return Ok(PathBuf::from(custom));
    }

    platform_dir
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| CubesolveError::Cubesolve {
            message: format!("Could not determine a {kind} directory; set {env_key}"),
            location,
        })
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
