use crate::error::protocol::ProtocolError;

use common::ErrorLocation;
use models::{BoundingBox, ColorTriple, FaceCells, FaceId};

use std::panic::Location;

use serde::Deserialize;

/// Message received from the service.
///
/// Unknown statuses and malformed payloads fail [`InboundMessage::decode`];
/// callers drop them without touching session state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InboundMessage {
    CubeDetected {
        #[serde(default)]
        message: Option<String>,
    },
    NoCube {
        #[serde(default)]
        message: Option<String>,
    },
    FaceDetected {
        colors: FaceCells,
        #[serde(default)]
        bbox: Option<BoundingBox>,
        #[serde(default)]
        face: Option<FaceId>,
        #[serde(default)]
        confirmed: bool,
        #[serde(default)]
        message: Option<String>,
    },
    FaceNotDetected {
        #[serde(default)]
        message: Option<String>,
    },
    FaceConfirmed {
        face: FaceId,
        #[serde(default)]
        message: Option<String>,
    },
    Processing {
        #[serde(default)]
        message: Option<String>,
    },
    CalibrationStarted {
        #[serde(default)]
        message: Option<String>,
    },
    CalibrationFaceDetected {
        #[serde(default, rename = "detectedColor")]
        detected_color: Option<ColorTriple>,
        #[serde(default, rename = "expectedColor")]
        expected_color: Option<FaceId>,
        #[serde(default)]
        message: Option<String>,
    },
    CalibrationNext {
        #[serde(default)]
        message: Option<String>,
    },
    CalibrationComplete {
        #[serde(default)]
        message: Option<String>,
    },
    Solving {
        moves: Vec<String>,
        #[serde(default)]
        current_move: usize,
        #[serde(default)]
        message: Option<String>,
    },
    SolutionReady {
        moves: Vec<String>,
        #[serde(default)]
        current_move: usize,
        #[serde(default)]
        message: Option<String>,
    },
    ScanComplete {
        #[serde(default)]
        message: Option<String>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    Solved {
        #[serde(default)]
        message: Option<String>,
    },
    DetectionError {
        #[serde(default)]
        message: Option<String>,
    },
    DetectionWarning {
        #[serde(default)]
        message: Option<String>,
    },
    ProcessingTimeout {
        #[serde(default)]
        message: Option<String>,
    },
}

impl InboundMessage {
    #[track_caller]
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Decode {
            message: format!("Failed to decode inbound message: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Display text supplied by the service, if any.
    pub fn message(&self) -> Option<&str> {
        let message = match self {
            InboundMessage::CubeDetected { message }
            | InboundMessage::NoCube { message }
            | InboundMessage::FaceDetected { message, .. }
            | InboundMessage::FaceNotDetected { message }
            | InboundMessage::FaceConfirmed { message, .. }
            | InboundMessage::Processing { message }
            | InboundMessage::CalibrationStarted { message }
            | InboundMessage::CalibrationFaceDetected { message, .. }
            | InboundMessage::CalibrationNext { message }
            | InboundMessage::CalibrationComplete { message }
            | InboundMessage::Solving { message, .. }
            | InboundMessage::SolutionReady { message, .. }
            | InboundMessage::ScanComplete { message }
            | InboundMessage::Error { message }
            | InboundMessage::Solved { message }
            | InboundMessage::DetectionError { message }
            | InboundMessage::DetectionWarning { message }
            | InboundMessage::ProcessingTimeout { message } => message,
        };
        message.as_deref().filter(|text| !text.trim().is_empty())
    }

    /// Conditions that raise the recoverable overlay instead of moving the workflow.
    pub fn is_recoverable_condition(&self) -> bool {
        matches!(
            self,
            InboundMessage::DetectionError { .. }
                | InboundMessage::DetectionWarning { .. }
                | InboundMessage::ProcessingTimeout { .. }
        )
    }

    pub fn status(&self) -> &'static str {
        match self {
            InboundMessage::CubeDetected { .. } => "cube_detected",
            InboundMessage::NoCube { .. } => "no_cube",
            InboundMessage::FaceDetected { .. } => "face_detected",
            InboundMessage::FaceNotDetected { .. } => "face_not_detected",
            InboundMessage::FaceConfirmed { .. } => "face_confirmed",
            InboundMessage::Processing { .. } => "processing",
            InboundMessage::CalibrationStarted { .. } => "calibration_started",
            InboundMessage::CalibrationFaceDetected { .. } => "calibration_face_detected",
            InboundMessage::CalibrationNext { .. } => "calibration_next",
            InboundMessage::CalibrationComplete { .. } => "calibration_complete",
            InboundMessage::Solving { .. } => "solving",
            InboundMessage::SolutionReady { .. } => "solution_ready",
            InboundMessage::ScanComplete { .. } => "scan_complete",
            InboundMessage::Error { .. } => "error",
            InboundMessage::Solved { .. } => "solved",
            InboundMessage::DetectionError { .. } => "detection_error",
            InboundMessage::DetectionWarning { .. } => "detection_warning",
            InboundMessage::ProcessingTimeout { .. } => "processing_timeout",
        }
    }
}
