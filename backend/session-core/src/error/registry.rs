use common::ErrorLocation;
use models::FaceId;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("Face Not Found Error: face {face} has not been detected {location}")]
    NotFound {
        face: FaceId,
        location: ErrorLocation,
    },
}
