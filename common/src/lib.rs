//! Shared plumbing for the cubesolve workspace.
//!
//! Every error type in the workspace carries an [`ErrorLocation`] so a log line
//! points straight at the code that produced it.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
