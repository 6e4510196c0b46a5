use crate::config::FrameConfig;
use crate::error::capture::CaptureError;

use common::ErrorLocation;

use std::panic::Location;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};

/// Largest size within `max_width` x `max_height` that keeps the aspect ratio.
/// Images already inside the envelope are returned unchanged.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let (w, h) = (u64::from(width), u64::from(height));
    let (max_w, max_h) = (u64::from(max_width), u64::from(max_height));

    // Compare w/h against max_w/max_h without floating point.
    let (fit_w, fit_h) = if w * max_h >= h * max_w {
        (max_w, (h * max_w / w).max(1))
    } else {
        ((w * max_h / h).max(1), max_h)
    };

    (fit_w as u32, fit_h as u32)
}

/// Downsample into the configured envelope, JPEG encode, and base64 the bytes.
pub fn encode_frame(image: &RgbImage, config: &FrameConfig) -> Result<String, CaptureError> {
    let (width, height) = fit_within(
        image.width(),
        image.height(),
        config.max_width,
        config.max_height,
    );

    let jpeg = if (width, height) == image.dimensions() {
        encode_jpeg(image, config.jpeg_quality)?
    } else {
        let resized = imageops::resize(image, width, height, FilterType::Triangle);
        encode_jpeg(&resized, config.jpeg_quality)?
    };

    Ok(STANDARD.encode(jpeg))
}

#[track_caller]
fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    image
        .write_with_encoder(encoder)
        .map_err(|e| CaptureError::Encode {
            message: format!("JPEG encode failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(buffer)
}
