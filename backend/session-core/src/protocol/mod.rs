//! JSON messages exchanged with the recognition service.
//!
//! Inbound messages are discriminated by `status`, outbound by `type`.

pub mod inbound;
pub mod outbound;

pub use inbound::InboundMessage;
pub use outbound::OutboundMessage;
