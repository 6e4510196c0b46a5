use crate::error::config::ConfigError;
use crate::{SERVICE_BASE_URL, SERVICE_HEALTH_PATH, SERVICE_WS_PATH};

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_path: default_ws_path(),
            health_path: default_health_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_reconnect_base_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_reconnect_cap_ms")]
    pub cap_delay_ms: u64,
    #[serde(default = "default_reconnect_attempts")]
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_reconnect_base_ms(),
            cap_delay_ms: default_reconnect_cap_ms(),
            max_attempts: default_reconnect_attempts(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessConfig {
    #[serde(default = "default_liveness_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_liveness_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_liveness_timeout_ms")]
    pub timeout_ms: u64,
}

impl LivenessConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_liveness_interval_ms(),
            max_attempts: default_liveness_attempts(),
            timeout_ms: default_liveness_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConfig {
    #[serde(default = "default_frame_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_frame_max_width")]
    pub max_width: u32,
    #[serde(default = "default_frame_max_height")]
    pub max_height: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl FrameConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_frame_interval_ms(),
            max_width: default_frame_max_width(),
            max_height: default_frame_max_height(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub reconnect: ReconnectConfig,

    #[serde(default)]
    pub liveness: LivenessConfig,

    #[serde(default)]
    pub frames: FrameConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            service: ServiceConfig::default(),
            reconnect: ReconnectConfig::default(),
            liveness: LivenessConfig::default(),
            frames: FrameConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_base_url() -> String {
    SERVICE_BASE_URL.to_string()
}
fn default_ws_path() -> String {
    SERVICE_WS_PATH.to_string()
}
fn default_health_path() -> String {
    SERVICE_HEALTH_PATH.to_string()
}
fn default_reconnect_base_ms() -> u64 {
    3_000
}
fn default_reconnect_cap_ms() -> u64 {
    30_000
}
fn default_reconnect_attempts() -> u32 {
    5
}
fn default_liveness_interval_ms() -> u64 {
    5_000
}
fn default_liveness_attempts() -> u32 {
    10
}
fn default_liveness_timeout_ms() -> u64 {
    3_000
}
fn default_frame_interval_ms() -> u64 {
    250
}
fn default_frame_max_width() -> u32 {
    320
}
fn default_frame_max_height() -> u32 {
    240
}
fn default_jpeg_quality() -> u8 {
    70
}

// ============================================
// IMPLEMENTATION
// ============================================

impl SessionConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: SessionConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {e}");
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json via temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// the write or the rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation_error(format!(
                "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                self.version
            )));
        }

        self.base_url()?;

        for (name, path) in [
            ("ws_path", &self.service.ws_path),
            ("health_path", &self.service.health_path),
        ] {
            if !path.starts_with('/') {
                return Err(validation_error(format!(
                    "{name} must start with '/': {path}"
                )));
            }
        }

        if self.reconnect.base_delay_ms == 0 {
            return Err(validation_error("reconnect.base_delay_ms must be positive"));
        }

        if self.reconnect.cap_delay_ms < self.reconnect.base_delay_ms {
            return Err(validation_error(format!(
                "reconnect.cap_delay_ms ({}) is below base_delay_ms ({})",
                self.reconnect.cap_delay_ms, self.reconnect.base_delay_ms
            )));
        }

        if self.liveness.interval_ms == 0 || self.liveness.max_attempts == 0 {
            return Err(validation_error(
                "liveness.interval_ms and liveness.max_attempts must be positive",
            ));
        }

        if self.frames.interval_ms == 0 {
            return Err(validation_error("frames.interval_ms must be positive"));
        }

        if self.frames.max_width == 0 || self.frames.max_height == 0 {
            return Err(validation_error("frames envelope must be non-empty"));
        }

        if !(1..=100).contains(&self.frames.jpeg_quality) {
            return Err(validation_error(format!(
                "Invalid jpeg_quality: {} (must be 1-100)",
                self.frames.jpeg_quality
            )));
        }

        Ok(())
    }

    /// WebSocket endpoint: the base URL with `ws`/`wss` scheme and `ws_path`.
    pub fn ws_url(&self) -> Result<Url, ConfigError> {
        let mut url = self.endpoint(&self.service.ws_path)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };

        url.set_scheme(scheme).map_err(|()| {
            validation_error(format!("Cannot derive websocket URL from {url}"))
        })?;

        Ok(url)
    }

    pub fn health_url(&self) -> Result<Url, ConfigError> {
        self.endpoint(&self.service.health_path)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        self.base_url()?
            .join(path)
            .map_err(|e| validation_error(format!("Invalid endpoint path {path}: {e}")))
    }

    fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.service.base_url).map_err(|e| {
            validation_error(format!("Invalid URL {}: {e}", self.service.base_url))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(validation_error(format!(
                "Invalid URL scheme '{other}' in {}",
                self.service.base_url
            ))),
        }
    }
}

#[track_caller]
fn validation_error(reason: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: reason.into(),
    }
}
