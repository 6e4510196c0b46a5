//! The session loop and the handle front ends use to drive it.

mod runtime;
mod snapshot;

pub use snapshot::{CalibrationView, SessionSnapshot};

use crate::capture::CaptureDevice;
use crate::config::SessionConfig;
use crate::error::session::SessionError;
use crate::machine::UserAction;
use crate::session::runtime::SessionRuntime;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::info;
use tokio::sync::{mpsc, watch};

/// Requests accepted by the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Action(UserAction),
    SelectDevice(String),
    Shutdown,
}

/// Cloneable handle to a running session. The session shuts down when asked
/// to or when the last handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has exited.
    #[track_caller]
    pub fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .map_err(|e| SessionError::Closed {
                message: format!("Session loop is gone, dropped {:?}", e.0),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    #[track_caller]
    pub fn act(&self, action: UserAction) -> Result<(), SessionError> {
        self.send(SessionCommand::Action(action))
    }

    #[track_caller]
    pub fn connect(&self) -> Result<(), SessionError> {
        self.act(UserAction::Connect)
    }

    #[track_caller]
    pub fn disconnect(&self) -> Result<(), SessionError> {
        self.act(UserAction::Disconnect)
    }

    #[track_caller]
    pub fn restart(&self) -> Result<(), SessionError> {
        self.act(UserAction::Restart)
    }

    #[track_caller]
    pub fn select_device(&self, device_id: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::SelectDevice(device_id.into()))
    }

    #[track_caller]
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown)
    }

    /// Latest committed snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait for the next snapshot.
    pub async fn changed(&mut self) -> Result<SessionSnapshot, SessionError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| SessionError::Closed {
                message: "Session ended".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Wait until a snapshot satisfies `predicate`, checking the current one first.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let snapshot = self
            .snapshots
            .wait_for(predicate)
            .await
            .map_err(|_| SessionError::Closed {
                message: "Session ended before the expected state".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
        Ok(snapshot.clone())
    }

    /// Resolves once the session loop has exited.
    pub async fn closed(&self) {
        self.commands.closed().await;
    }
}

/// Validate `config` and spawn the session loop on the current tokio runtime.
///
/// # Errors
///
/// Returns [`SessionError::Startup`] if the config is invalid or no tokio
/// runtime is active.
pub fn spawn_session(
    config: SessionConfig,
    devices: Vec<Arc<dyn CaptureDevice>>,
) -> Result<SessionHandle, SessionError> {
    let startup_error = |message: String| SessionError::Startup {
        message,
        location: ErrorLocation::from(Location::caller()),
    };

    tokio::runtime::Handle::try_current()
        .map_err(|e| startup_error(format!("No tokio runtime: {e}")))?;

    config
        .validate()
        .map_err(|e| startup_error(e.to_string()))?;
    let ws_url = config.ws_url().map_err(|e| startup_error(e.to_string()))?;
    let health_url = config
        .health_url()
        .map_err(|e| startup_error(e.to_string()))?;

    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (runtime, snapshots) = SessionRuntime::new(config, ws_url, health_url, devices, commands_rx);

    info!("Spawning session {}", runtime.session_id());
    tokio::spawn(runtime.run());

    Ok(SessionHandle {
        commands: commands_tx,
        snapshots,
    })
}
