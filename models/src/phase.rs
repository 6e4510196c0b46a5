use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::Serialize;

/// Phase of the scanning and solving workflow as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Connecting,
    AwaitingCube,
    FaceDetecting,
    Calibrating,
    ScanningFaces,
    Solving,
    Solved,
    ErrorRecoverable,
    ErrorFatal,
}

impl SessionPhase {
    /// Phases in which frames may flow to the service.
    pub const fn is_streaming(self) -> bool {
        matches!(
            self,
            SessionPhase::AwaitingCube
                | SessionPhase::FaceDetecting
                | SessionPhase::Calibrating
                | SessionPhase::ScanningFaces
                | SessionPhase::Solving
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Connecting => "connecting",
            SessionPhase::AwaitingCube => "awaiting_cube",
            SessionPhase::FaceDetecting => "face_detecting",
            SessionPhase::Calibrating => "calibrating",
            SessionPhase::ScanningFaces => "scanning_faces",
            SessionPhase::Solving => "solving",
            SessionPhase::Solved => "solved",
            SessionPhase::ErrorRecoverable => "error_recoverable",
            SessionPhase::ErrorFatal => "error_fatal",
        }
    }
}

impl Display for SessionPhase {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSeverity {
    #[default]
    Info,
    Warning,
    Fatal,
}

/// Human-readable status shown alongside the phase.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatusLine {
    pub text: String,
    pub severity: StatusSeverity,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Info,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Warning,
        }
    }

    pub fn fatal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: StatusSeverity::Fatal,
        }
    }
}

impl Display for StatusLine {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(&self.text)
    }
}
