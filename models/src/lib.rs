//! Domain models for the cube session.
//!
//! Pure data shared by the engine and its front ends. Nothing here performs I/O
//! or knows about the connection; `session-core` owns the behavior.
//!
//! ## Architecture
//!
//! - **models** (this crate): faces, stickers, colors, phases
//! - **session-core**: connection, streaming and the state machine operating on models
//! - **cubesolve**: the CLI wiring everything together

pub mod color;
pub mod error;
pub mod face;
pub mod geometry;
pub mod phase;

#[cfg(test)]
mod tests;

pub use color::{CalibrationProfile, ColorTriple};
pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use face::{FaceCells, FaceId, FaceRecord, Sticker};
pub use geometry::BoundingBox;
pub use phase::{SessionPhase, StatusLine, StatusSeverity};
