use crate::connection::channel::{ChannelEvent, ChannelEventKind, run_channel};
use crate::connection::state::{ConnectionPhase, ConnectionState, ReconnectPolicy};
use crate::protocol::OutboundMessage;

use log::{debug, info, trace, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

/// What the session loop needs to know after a connection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionNotice {
    Connecting { attempt: u32 },
    Open,
    Closed { attempt: u32, retry_in_ms: u64 },
    Failed { attempts: u32 },
    Disconnected,
    Message(String),
}

pub struct ConnectionManager {
    url: Url,
    policy: ReconnectPolicy,
    state: ConnectionState,
    generation: u64,
    events: UnboundedSender<ChannelEvent>,
    writer: Option<UnboundedSender<String>>,
    task: Option<JoinHandle<()>>,
    reconnect_deadline: Option<Instant>,
}

impl ConnectionManager {
    /// Create a manager for `url`. Channel events arrive on the returned receiver
    /// and must be fed back through [`ConnectionManager::handle_event`].
    pub fn new(url: Url, policy: ReconnectPolicy) -> (Self, UnboundedReceiver<ChannelEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();

        let manager = Self {
            url,
            policy,
            state: ConnectionState::default(),
            generation: 0,
            events,
            writer: None,
            task: None,
            reconnect_deadline: None,
        };

        (manager, receiver)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.state.phase
    }

    pub fn is_open(&self) -> bool {
        self.state.phase == ConnectionPhase::Open
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_deadline
    }

    /// Open a channel unless one is already open or opening.
    ///
    /// A `Failed` manager stays failed until [`ConnectionManager::reset`].
    pub fn connect(&mut self) -> Option<ConnectionNotice> {
        match self.state.phase {
            ConnectionPhase::Open | ConnectionPhase::Connecting => {
                debug!("Connect ignored, channel already {:?}", self.state.phase);
                None
            }
            ConnectionPhase::Failed => {
                warn!("Connect ignored, reconnect attempts exhausted");
                None
            }
            ConnectionPhase::Disconnected | ConnectionPhase::Closed => Some(self.open_channel()),
        }
    }

    /// Send when the channel is open. Returns whether the message was handed to
    /// the writer.
    pub fn send(&self, message: &OutboundMessage) -> bool {
        if !self.is_open() {
            debug!("Dropping {} while channel is {:?}", message.kind(), self.state.phase);
            return false;
        }

        let Some(writer) = self.writer.as_ref() else {
            debug!("Dropping {}, no writer", message.kind());
            return false;
        };

        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                warn!("{e}");
                return false;
            }
        };

        trace!("Sending {}", message.kind());
        writer.send(text).is_ok()
    }

    /// Tear down the channel and any pending reconnect.
    pub fn disconnect(&mut self) -> Option<ConnectionNotice> {
        let was_active = self.task.is_some() || self.reconnect_deadline.is_some();

        self.abandon_channel();
        self.reconnect_deadline = None;

        if self.state.phase == ConnectionPhase::Failed {
            return None;
        }

        self.state.phase = ConnectionPhase::Closed;
        self.state.attempt = 0;

        if was_active {
            info!("Disconnected from {}", self.url);
        }
        Some(ConnectionNotice::Disconnected)
    }

    /// Forget failures so a manual restart can connect again.
    pub fn reset(&mut self) {
        self.abandon_channel();
        self.reconnect_deadline = None;
        self.state = ConnectionState::default();
        debug!("Connection state reset");
    }

    pub fn handle_event(&mut self, event: ChannelEvent) -> Option<ConnectionNotice> {
        if event.generation != self.generation {
            trace!(
                "Ignoring event from stale channel {} (current {})",
                event.generation, self.generation
            );
            return None;
        }

        match event.kind {
            ChannelEventKind::Opened => {
                self.state.phase = ConnectionPhase::Open;
                self.state.attempt = 0;
                info!("Connected to {}", self.url);
                Some(ConnectionNotice::Open)
            }
            ChannelEventKind::Message(text) => Some(ConnectionNotice::Message(text)),
            ChannelEventKind::Closed => self.schedule_retry("closed"),
            ChannelEventKind::Failed(reason) => self.schedule_retry(&reason),
        }
    }

    /// Called when the reconnect deadline passes.
    pub fn fire_reconnect(&mut self) -> Option<ConnectionNotice> {
        self.reconnect_deadline.take()?;

        if self.state.phase != ConnectionPhase::Closed {
            return None;
        }

        Some(self.open_channel())
    }

    fn open_channel(&mut self) -> ConnectionNotice {
        self.abandon_channel();
        self.reconnect_deadline = None;
        self.generation += 1;

        let (writer, outbound) = mpsc::unbounded_channel();
        self.writer = Some(writer);
        self.task = Some(tokio::spawn(run_channel(
            self.url.clone(),
            self.generation,
            self.events.clone(),
            outbound,
        )));

        self.state.phase = ConnectionPhase::Connecting;
        debug!(
            "Opening channel {} to {} (attempt {})",
            self.generation, self.url, self.state.attempt
        );

        ConnectionNotice::Connecting {
            attempt: self.state.attempt,
        }
    }

    fn schedule_retry(&mut self, reason: &str) -> Option<ConnectionNotice> {
        if !matches!(
            self.state.phase,
            ConnectionPhase::Connecting | ConnectionPhase::Open
        ) {
            return None;
        }

        self.writer = None;
        self.task = None;
        self.state.attempt += 1;

        match self.state.next_delay_ms(&self.policy) {
            Some(retry_in_ms) => {
                self.state.phase = ConnectionPhase::Closed;
                self.reconnect_deadline =
                    Some(Instant::now() + std::time::Duration::from_millis(retry_in_ms));
                warn!(
                    "Channel {reason}; retrying in {retry_in_ms} ms (attempt {}/{})",
                    self.state.attempt, self.policy.max_attempts
                );
                Some(ConnectionNotice::Closed {
                    attempt: self.state.attempt,
                    retry_in_ms,
                })
            }
            None => {
                self.state.phase = ConnectionPhase::Failed;
                self.reconnect_deadline = None;
                warn!(
                    "Channel {reason}; giving up after {} attempts",
                    self.policy.max_attempts
                );
                Some(ConnectionNotice::Failed {
                    attempts: self.policy.max_attempts,
                })
            }
        }
    }

    fn abandon_channel(&mut self) {
        self.writer = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
