//! Reference colors and the calibration profile built from them.

use crate::error::model_error::ModelError;
use crate::face::{FACE_COUNT, FaceId};

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const CHANNEL_MAX: f64 = 255.0;

/// An RGB triple; each channel is bounded to `0..=255` by its type.
///
/// On the wire it is `[r, g, b]`. Text forms `#rrggbb` and `rgb(r, g, b)` are
/// accepted as well since detections are sometimes reported as CSS colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "[u8; 3]")]
pub struct ColorTriple {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Accepted wire forms of a [`ColorTriple`].
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ColorRepr {
    Channels([f64; 3]),
    Text(String),
}

impl ColorTriple {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default reference color for a face under neutral lighting.
    pub const fn reference(face: FaceId) -> Self {
        match face {
            FaceId::Yellow => Self::new(255, 255, 0),
            FaceId::White => Self::new(255, 255, 255),
            FaceId::Red => Self::new(255, 0, 0),
            FaceId::Green => Self::new(0, 255, 0),
            FaceId::Blue => Self::new(0, 0, 255),
            FaceId::Orange => Self::new(255, 165, 0),
        }
    }

    pub fn distance_squared(&self, other: &ColorTriple) -> u32 {
        let channel = |a: u8, b: u8| {
            let delta = i32::from(a) - i32::from(b);
            delta.unsigned_abs().pow(2)
        };
        channel(self.r, other.r) + channel(self.g, other.g) + channel(self.b, other.b)
    }

    #[track_caller]
    fn from_channels(channels: [f64; 3]) -> Result<Self, ModelError> {
        let mut bytes = [0u8; 3];
        for (slot, value) in bytes.iter_mut().zip(channels) {
            if !value.is_finite() || !(0.0..=CHANNEL_MAX).contains(&value) {
                return Err(ModelError::validation(format!(
                    "Color channel {value} outside 0-255"
                )));
            }
            *slot = value.round() as u8;
        }
        Ok(Self::new(bytes[0], bytes[1], bytes[2]))
    }
}

impl FromStr for ColorTriple {
    type Err = ModelError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(ModelError::validation(format!("Invalid hex color '{trimmed}'")));
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range], 16)
                    .map_err(|e| ModelError::validation(format!("Invalid hex color '{trimmed}': {e}")))
            };
            return Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }

        let inner = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ModelError::validation(format!("Unrecognized color '{trimmed}'")))?;

        let parts: Vec<f64> = inner
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| ModelError::validation(format!("Invalid rgb() color '{trimmed}': {e}")))?;

        match parts.as_slice() {
            [r, g, b] => Self::from_channels([*r, *g, *b]),
            _ => Err(ModelError::validation(format!(
                "rgb() color needs 3 channels: '{trimmed}'"
            ))),
        }
    }
}

impl TryFrom<ColorRepr> for ColorTriple {
    type Error = ModelError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Channels(channels) => Self::from_channels(channels),
            ColorRepr::Text(text) => text.parse(),
        }
    }
}

impl From<ColorTriple> for [u8; 3] {
    fn from(color: ColorTriple) -> Self {
        [color.r, color.g, color.b]
    }
}

impl Display for ColorTriple {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Reference color for every face. Always complete: faces missing from a
/// deserialized map fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<FaceId, ColorTriple>", into = "BTreeMap<FaceId, ColorTriple>")]
pub struct CalibrationProfile {
    references: [ColorTriple; FACE_COUNT],
}

impl CalibrationProfile {
    pub fn get(&self, face: FaceId) -> ColorTriple {
        self.references[face.index()]
    }

    pub fn set(&mut self, face: FaceId, color: ColorTriple) {
        self.references[face.index()] = color;
    }

    pub fn iter(&self) -> impl Iterator<Item = (FaceId, ColorTriple)> + '_ {
        FaceId::ALL
            .into_iter()
            .map(|face| (face, self.references[face.index()]))
    }

    /// Face whose reference is nearest to `observed`. Ties resolve to the
    /// earlier face in canonical order.
    pub fn classify(&self, observed: &ColorTriple) -> FaceId {
        let mut best = FaceId::Yellow;
        let mut best_distance = u32::MAX;

        for (face, reference) in self.iter() {
            let distance = reference.distance_squared(observed);
            if distance < best_distance {
                best = face;
                best_distance = distance;
            }
        }

        best
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            references: FaceId::ALL.map(ColorTriple::reference),
        }
    }
}

impl From<BTreeMap<FaceId, ColorTriple>> for CalibrationProfile {
    fn from(map: BTreeMap<FaceId, ColorTriple>) -> Self {
        let mut profile = Self::default();
        for (face, color) in map {
            profile.set(face, color);
        }
        profile
    }
}

impl From<CalibrationProfile> for BTreeMap<FaceId, ColorTriple> {
    fn from(profile: CalibrationProfile) -> Self {
        profile.iter().collect()
    }
}
