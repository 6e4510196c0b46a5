//! Faces, stickers and the per-face record kept by the registry.

use crate::error::model_error::ModelError;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const CELLS_PER_FACE: usize = 9;
pub const FACE_COUNT: usize = 6;
pub const UNKNOWN_SYMBOL: char = 'U';

const CENTER_CELL: usize = 4;

/// One of the six canonical faces, named by its center color.
///
/// Declaration order is the canonical order (Y, W, R, G, B, O); it drives
/// registry slots, calibration steps and snapshot ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FaceId {
    Yellow,
    White,
    Red,
    Green,
    Blue,
    Orange,
}

impl FaceId {
    pub const ALL: [FaceId; FACE_COUNT] = [
        FaceId::Yellow,
        FaceId::White,
        FaceId::Red,
        FaceId::Green,
        FaceId::Blue,
        FaceId::Orange,
    ];

    /// Slot of this face in canonical order.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn symbol(self) -> char {
        match self {
            FaceId::Yellow => 'Y',
            FaceId::White => 'W',
            FaceId::Red => 'R',
            FaceId::Green => 'G',
            FaceId::Blue => 'B',
            FaceId::Orange => 'O',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FaceId::Yellow => "yellow",
            FaceId::White => "white",
            FaceId::Red => "red",
            FaceId::Green => "green",
            FaceId::Blue => "blue",
            FaceId::Orange => "orange",
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'Y' => Some(FaceId::Yellow),
            'W' => Some(FaceId::White),
            'R' => Some(FaceId::Red),
            'G' => Some(FaceId::Green),
            'B' => Some(FaceId::Blue),
            'O' => Some(FaceId::Orange),
            _ => None,
        }
    }
}

impl FromStr for FaceId {
    type Err = ModelError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let mut chars = trimmed.chars();

        if let (Some(symbol), None) = (chars.next(), chars.next())
            && let Some(face) = FaceId::from_symbol(symbol)
        {
            return Ok(face);
        }

        FaceId::ALL
            .into_iter()
            .find(|face| face.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::validation(format!("Unknown face '{trimmed}'")))
    }
}

impl TryFrom<String> for FaceId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FaceId> for String {
    fn from(face: FaceId) -> Self {
        face.symbol().to_string()
    }
}

impl Display for FaceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.symbol())
    }
}

/// A single cell of a face: a known color or not-yet-recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sticker {
    Face(FaceId),
    #[default]
    Unknown,
}

impl Sticker {
    pub const fn symbol(self) -> char {
        match self {
            Sticker::Face(face) => face.symbol(),
            Sticker::Unknown => UNKNOWN_SYMBOL,
        }
    }

    pub const fn is_known(self) -> bool {
        matches!(self, Sticker::Face(_))
    }

    pub const fn face(self) -> Option<FaceId> {
        match self {
            Sticker::Face(face) => Some(face),
            Sticker::Unknown => None,
        }
    }

    #[track_caller]
    pub fn from_symbol(symbol: char) -> Result<Self, ModelError> {
        if symbol.eq_ignore_ascii_case(&UNKNOWN_SYMBOL) {
            return Ok(Sticker::Unknown);
        }

        FaceId::from_symbol(symbol)
            .map(Sticker::Face)
            .ok_or_else(|| ModelError::validation(format!("Unknown sticker symbol '{symbol}'")))
    }
}

/// Exactly nine stickers in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FaceCells([Sticker; CELLS_PER_FACE]);

impl FaceCells {
    pub const fn unknown() -> Self {
        Self([Sticker::Unknown; CELLS_PER_FACE])
    }

    pub const fn uniform(face: FaceId) -> Self {
        Self([Sticker::Face(face); CELLS_PER_FACE])
    }

    pub const fn from_stickers(stickers: [Sticker; CELLS_PER_FACE]) -> Self {
        Self(stickers)
    }

    pub fn stickers(&self) -> &[Sticker; CELLS_PER_FACE] {
        &self.0
    }

    /// The center cell names the face on a standard cube.
    pub fn center(&self) -> Sticker {
        self.0[CENTER_CELL]
    }

    pub fn known_count(&self) -> usize {
        self.0.iter().filter(|sticker| sticker.is_known()).count()
    }

    pub fn is_unknown(&self) -> bool {
        self.known_count() == 0
    }
}

impl FromStr for FaceCells {
    type Err = ModelError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = value.trim().chars().collect();

        if symbols.len() != CELLS_PER_FACE {
            return Err(ModelError::validation(format!(
                "Expected {CELLS_PER_FACE} cells, got {} in '{value}'",
                symbols.len()
            )));
        }

        let mut stickers = [Sticker::Unknown; CELLS_PER_FACE];
        for (slot, symbol) in stickers.iter_mut().zip(symbols) {
            *slot = Sticker::from_symbol(symbol)?;
        }

        Ok(Self(stickers))
    }
}

impl TryFrom<String> for FaceCells {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FaceCells> for String {
    fn from(cells: FaceCells) -> Self {
        cells.to_string()
    }
}

impl Display for FaceCells {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        for sticker in &self.0 {
            write!(formatter, "{}", sticker.symbol())?;
        }
        Ok(())
    }
}

/// Latest known state of one face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaceRecord {
    pub face: FaceId,
    pub cells: FaceCells,
    pub confirmed: bool,
}

impl FaceRecord {
    pub const fn placeholder(face: FaceId) -> Self {
        Self {
            face,
            cells: FaceCells::unknown(),
            confirmed: false,
        }
    }

    /// A face counts as detected once any of its cells is known.
    pub fn is_detected(&self) -> bool {
        !self.cells.is_unknown()
    }
}
