pub mod calibration;
pub mod capture;
pub mod config;
pub mod connection;
pub mod liveness;
pub mod protocol;
pub mod registry;
pub mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Connection(#[from] connection::ConnectionError),

    #[error(transparent)]
    Protocol(#[from] protocol::ProtocolError),

    #[error(transparent)]
    Registry(#[from] registry::RegistryError),

    #[error(transparent)]
    Calibration(#[from] calibration::CalibrationError),

    #[error(transparent)]
    Capture(#[from] capture::CaptureError),

    #[error(transparent)]
    Liveness(#[from] liveness::LivenessError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Session(#[from] session::SessionError),
}
