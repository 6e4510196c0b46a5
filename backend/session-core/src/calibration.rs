//! Stepwise calibration of reference colors, one face center at a time.

use crate::error::calibration::CalibrationError;

use common::ErrorLocation;
use models::face::FACE_COUNT;
use models::{CalibrationProfile, ColorTriple, FaceId};

use std::panic::Location;

use log::{debug, info};

/// Order in which face centers are calibrated.
pub const CALIBRATION_ORDER: [FaceId; FACE_COUNT] = FaceId::ALL;

/// Result of one confirmed calibration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationStep {
    pub face: FaceId,
    pub color: ColorTriple,
    /// Set when the user picked the color instead of accepting the detection.
    pub selected: Option<FaceId>,
    /// True when this was the last step.
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalibrationSession {
    step_index: usize,
    pending: Option<ColorTriple>,
    manual: Option<FaceId>,
    active: bool,
    profile: CalibrationProfile,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.step_index = 0;
        self.pending = None;
        self.manual = None;
        self.active = true;
        info!("Calibration started");
    }

    /// Store the color observed for the current step without advancing.
    #[track_caller]
    pub fn record_detection(&mut self, color: ColorTriple) -> Result<FaceId, CalibrationError> {
        let face = self.current_face()?;
        self.pending = Some(color);
        self.manual = None;
        debug!("Calibration {face}: detected {color}");
        Ok(face)
    }

    /// Use the default reference of `color` for the current step.
    #[track_caller]
    pub fn select_manually(&mut self, color: FaceId) -> Result<FaceId, CalibrationError> {
        let face = self.current_face()?;
        self.pending = Some(ColorTriple::reference(color));
        self.manual = Some(color);
        debug!("Calibration {face}: manually selected {}", color.name());
        Ok(face)
    }

    /// Commit the pending color and advance.
    ///
    /// # Errors
    ///
    /// - [`CalibrationError::Inactive`] outside an active calibration
    /// - [`CalibrationError::NothingToConfirm`] when no color is pending, which
    ///   includes a second confirm of the same step
    #[track_caller]
    pub fn confirm(&mut self) -> Result<CalibrationStep, CalibrationError> {
        let face = self.current_face()?;

        let Some(color) = self.pending.take() else {
            return Err(CalibrationError::NothingToConfirm {
                face,
                location: ErrorLocation::from(Location::caller()),
            });
        };
        let selected = self.manual.take();

        self.profile.set(face, color);
        self.step_index += 1;

        let completed = self.is_complete();
        if completed {
            self.active = false;
            info!("Calibration complete");
        }

        Ok(CalibrationStep {
            face,
            color,
            selected,
            completed,
        })
    }

    /// Abandon calibration and return to the default profile.
    pub fn reset(&mut self) {
        *self = Self::default();
        info!("Calibration reset");
    }

    /// Face expected at the current step while calibration is active.
    pub fn expected_face(&self) -> Option<FaceId> {
        if !self.active {
            return None;
        }
        CALIBRATION_ORDER.get(self.step_index).copied()
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn pending(&self) -> Option<ColorTriple> {
        self.pending
    }

    pub fn manual(&self) -> Option<FaceId> {
        self.manual
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_complete(&self) -> bool {
        self.step_index == CALIBRATION_ORDER.len()
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    #[track_caller]
    fn current_face(&self) -> Result<FaceId, CalibrationError> {
        self.expected_face()
            .ok_or_else(|| CalibrationError::Inactive {
                message: format!("no calibration step at index {}", self.step_index),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
