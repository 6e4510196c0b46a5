use common::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CaptureError {
    #[error("Device Not Ready Error: {device_id} {location}")]
    NotReady {
        device_id: String,
        location: ErrorLocation,
    },

    #[error("Capture Error: {message} {location}")]
    Capture {
        message: String,
        location: ErrorLocation,
    },

    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },
}
