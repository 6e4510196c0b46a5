use crate::error::CubesolveError;

use session_core::capture::{CaptureDevice, StillFrameDevice};

use models::ColorTriple;

use std::path::Path;
use std::sync::Arc;

use log::info;

pub const IMAGE_DEVICE_ID: &str = "still-image";
pub const PATTERN_DEVICE_ID: &str = "test-pattern";

const PATTERN_WIDTH: u32 = 640;
const PATTERN_HEIGHT: u32 = 480;
const PATTERN_COLOR: ColorTriple = ColorTriple::new(128, 128, 128);

/// The capture devices offered to the session: the configured image if any,
/// always followed by the gray test pattern.
#[track_caller]
pub fn open_devices(image: Option<&Path>) -> Result<Vec<Arc<dyn CaptureDevice>>, CubesolveError> {
    let mut devices: Vec<Arc<dyn CaptureDevice>> = Vec::new();

    if let Some(path) = image {
        let device =
            StillFrameDevice::from_path(IMAGE_DEVICE_ID, path).map_err(CubesolveError::core)?;
        info!("Replaying {} as the camera", path.display());
        devices.push(Arc::new(device));
    }

    devices.push(Arc::new(
        StillFrameDevice::solid(PATTERN_DEVICE_ID, PATTERN_WIDTH, PATTERN_HEIGHT, PATTERN_COLOR)
            .with_label("Test pattern"),
    ));

    Ok(devices)
}
