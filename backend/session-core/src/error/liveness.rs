use common::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LivenessError {
    #[error("Service Unreachable Error: {url} after {attempts} attempts {location}")]
    Exhausted {
        url: String,
        attempts: u32,
        location: ErrorLocation,
    },
}
