//! Persistent WebSocket channel to the recognition service.
//!
//! [`ConnectionManager`] owns the connection lifecycle and the reconnect
//! schedule. The socket itself lives in a spawned task that only performs I/O
//! and reports [`ChannelEvent`]s back to the session loop, tagged with the
//! generation that spawned it so events from a torn-down channel are ignored.

mod channel;
mod manager;
mod state;

pub use channel::{ChannelEvent, ChannelEventKind};
pub use manager::{ConnectionManager, ConnectionNotice};
pub use state::{ConnectionPhase, ConnectionState, ReconnectPolicy};
