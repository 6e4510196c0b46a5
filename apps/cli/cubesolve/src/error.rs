use common::ErrorLocation;

use thiserror::Error;

/// Errors raised by the command-line front end.
///
/// Engine errors are flattened to their message at the boundary; the engine
/// already logged them with their own location.
#[derive(Debug, Error)]
pub enum CubesolveError {
    /// Error from this app
    #[error("Cubesolve Error: {message} {location}")]
    Cubesolve {
        message: String,
        location: ErrorLocation,
    },

    /// A console line that is not a valid command
    #[error("Input Error: {message} {location}")]
    Input {
        message: String,
        location: ErrorLocation,
    },

    /// Error from session-core (config, capture, session)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}

impl CubesolveError {
    #[track_caller]
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    /// The message without kind or location, for showing to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Cubesolve { message, .. }
            | Self::Input { message, .. }
            | Self::Core { message, .. } => message,
        }
    }

    #[track_caller]
    pub fn core(error: impl std::fmt::Display) -> Self {
        Self::Core {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
