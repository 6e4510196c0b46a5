use crate::calibration::CalibrationSession;
use crate::capture::VideoDevice;
use crate::connection::ConnectionState;

use models::{CalibrationProfile, ColorTriple, FaceId, FaceRecord, SessionPhase, StatusLine};

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalibrationView {
    pub active: bool,
    pub step_index: usize,
    pub expected: Option<FaceId>,
    pub pending: Option<ColorTriple>,
    pub manual: Option<FaceId>,
}

impl From<&CalibrationSession> for CalibrationView {
    fn from(session: &CalibrationSession) -> Self {
        Self {
            active: session.is_active(),
            step_index: session.step_index(),
            expected: session.expected_face(),
            pending: session.pending(),
            manual: session.manual(),
        }
    }
}

/// Committed session state after the most recent event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: SessionPhase,
    pub workflow: SessionPhase,
    pub status: StatusLine,
    pub connection: ConnectionState,
    pub faces: Vec<FaceRecord>,
    pub calibration: CalibrationView,
    pub profile: CalibrationProfile,
    pub moves: Vec<String>,
    pub current_move_index: usize,
    pub wrong_move_count: u8,
    pub streaming: bool,
    pub devices: Vec<VideoDevice>,
    pub active_device: Option<String>,
}

impl SessionSnapshot {
    pub fn face(&self, face: FaceId) -> Option<&FaceRecord> {
        self.faces.iter().find(|record| record.face == face)
    }

    pub fn current_move(&self) -> Option<&str> {
        self.moves.get(self.current_move_index).map(String::as_str)
    }
}
