//! Session engine for the cube scanner.
//!
//! Owns the connection to the recognition service, the frame cadence, the face
//! registry, calibration and the state machine that ties them together. Front
//! ends drive it through [`session::SessionHandle`] and render
//! [`session::SessionSnapshot`]s.

pub mod calibration;
pub mod capture;
pub mod config;
pub mod connection;
pub mod error;
pub mod liveness;
pub mod machine;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod solve;
pub mod streamer;

#[cfg(test)]
mod tests;

pub const SERVICE_HOSTNAME: &str = "localhost";
pub const SERVICE_PORT: u16 = 8000;
pub const SERVICE_BASE_URL: &str =
    const_format::concatcp!("http://", SERVICE_HOSTNAME, ":", SERVICE_PORT);
pub const SERVICE_WS_PATH: &str = "/ws";
pub const SERVICE_HEALTH_PATH: &str = "/health";
