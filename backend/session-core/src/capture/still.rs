use crate::capture::{CaptureDevice, CapturedFrame};
use crate::error::capture::CaptureError;

use common::ErrorLocation;
use models::ColorTriple;

use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use image::{Rgb, RgbImage};

/// Device that serves the same image on every capture.
///
/// Stands in for a camera when replaying a snapshot of the cube, and in tests.
pub struct StillFrameDevice {
    id: String,
    label: Option<String>,
    image: RgbImage,
    ready: AtomicBool,
}

impl StillFrameDevice {
    pub fn new(id: impl Into<String>, image: RgbImage) -> Self {
        Self {
            id: id.into(),
            label: None,
            image,
            ready: AtomicBool::new(true),
        }
    }

    /// Uniform test pattern of the given color.
    pub fn solid(id: impl Into<String>, width: u32, height: u32, color: ColorTriple) -> Self {
        let pixel = Rgb([color.r, color.g, color.b]);
        Self::new(id, RgbImage::from_pixel(width, height, pixel))
    }

    #[track_caller]
    pub fn from_path(id: impl Into<String>, path: &Path) -> Result<Self, CaptureError> {
        let image = image::open(path)
            .map_err(|e| CaptureError::Capture {
                message: format!("Failed to open {}: {e}", path.display()),
                location: ErrorLocation::from(Location::caller()),
            })?
            .to_rgb8();

        Ok(Self::new(id, image).with_label(path.display().to_string()))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }
}

impl CaptureDevice for StillFrameDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn capture(&self) -> Result<CapturedFrame, CaptureError> {
        if !self.is_ready() {
            return Err(CaptureError::NotReady {
                device_id: self.id.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(CapturedFrame {
            image: self.image.clone(),
            captured_at: SystemTime::now(),
        })
    }
}
