use common::ErrorLocation;
use models::FaceId;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CalibrationError {
    #[error("Calibration Inactive Error: {message} {location}")]
    Inactive {
        message: String,
        location: ErrorLocation,
    },

    #[error("Nothing To Confirm Error: no color pending for {face} {location}")]
    NothingToConfirm {
        face: FaceId,
        location: ErrorLocation,
    },
}
