//! Capture devices and the downsample + JPEG encode path for frames.

mod encode;
mod still;

pub use encode::{encode_frame, fit_within};
pub use still::StillFrameDevice;

use crate::error::capture::CaptureError;

use std::sync::Arc;
use std::time::SystemTime;

use image::RgbImage;
use serde::Serialize;

const DEVICE_ID_PREFIX_LEN: usize = 8;

/// One captured image and when it was taken.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: RgbImage,
    pub captured_at: SystemTime,
}

/// A camera or camera stand-in. `capture` may block; it is only ever called on
/// the blocking pool.
pub trait CaptureDevice: Send + Sync {
    fn id(&self) -> &str;

    fn label(&self) -> Option<&str>;

    fn is_ready(&self) -> bool;

    fn capture(&self) -> Result<CapturedFrame, CaptureError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoDevice {
    pub device_id: String,
    pub label: String,
}

/// Describe the available devices, naming unlabeled ones after their id.
pub fn list_devices(devices: &[Arc<dyn CaptureDevice>]) -> Vec<VideoDevice> {
    devices
        .iter()
        .map(|device| {
            let label = match device.label() {
                Some(label) if !label.trim().is_empty() => label.to_string(),
                _ => {
                    let prefix: String = device.id().chars().take(DEVICE_ID_PREFIX_LEN).collect();
                    format!("Camera {prefix}")
                }
            };
            VideoDevice {
                device_id: device.id().to_string(),
                label,
            }
        })
        .collect()
}
