use crate::error::protocol::ProtocolError;

use common::ErrorLocation;
use models::{BoundingBox, CalibrationProfile, FaceId};

use std::panic::Location;

use serde::Serialize;

/// Message sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Base64 JPEG of one downsampled frame.
    Frame { data: String },
    ConfirmFace { face: FaceId },
    GetSolution,
    StartCalibration,
    ConfirmCalibration {
        #[serde(skip_serializing_if = "Option::is_none")]
        selected_color: Option<FaceId>,
    },
    ResetCalibration,
    CubeBbox { bbox: BoundingBox },
    CalibrationProfile { profile: CalibrationProfile },
}

impl OutboundMessage {
    #[track_caller]
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode {
            message: format!("Failed to encode {}: {e}", self.kind()),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Frame { .. } => "frame",
            OutboundMessage::ConfirmFace { .. } => "confirm_face",
            OutboundMessage::GetSolution => "get_solution",
            OutboundMessage::StartCalibration => "start_calibration",
            OutboundMessage::ConfirmCalibration { .. } => "confirm_calibration",
            OutboundMessage::ResetCalibration => "reset_calibration",
            OutboundMessage::CubeBbox { .. } => "cube_bbox",
            OutboundMessage::CalibrationProfile { .. } => "calibration_profile",
        }
    }
}
