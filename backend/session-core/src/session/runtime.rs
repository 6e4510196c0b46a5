use crate::capture::{CaptureDevice, list_devices};
use crate::config::SessionConfig;
use crate::connection::{ChannelEvent, ConnectionManager, ConnectionNotice, ReconnectPolicy};
use crate::liveness::{LivenessNotice, wait_for_service};
use crate::machine::{Effect, SessionEvent, SessionStateMachine};
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::session::SessionCommand;
use crate::session::snapshot::{CalibrationView, SessionSnapshot};
use crate::streamer::{FrameGate, FrameOutcome, FrameStreamer};

use std::sync::Arc;

use log::{debug, info, trace, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use url::Url;
use uuid::Uuid;

/// Owns every piece of session state. Only [`SessionRuntime::run`] touches it,
/// one event at a time.
pub(crate) struct SessionRuntime {
    session_id: String,
    config: SessionConfig,
    health_url: Url,
    machine: SessionStateMachine,
    connection: ConnectionManager,
    channel_events: UnboundedReceiver<ChannelEvent>,
    streamer: FrameStreamer,
    frame_tx: UnboundedSender<FrameOutcome>,
    frame_rx: UnboundedReceiver<FrameOutcome>,
    liveness_tx: UnboundedSender<LivenessNotice>,
    liveness_rx: UnboundedReceiver<LivenessNotice>,
    liveness_task: Option<JoinHandle<()>>,
    commands: UnboundedReceiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    devices: Vec<Arc<dyn CaptureDevice>>,
    active_device: Option<usize>,
}

impl SessionRuntime {
    pub(crate) fn new(
        config: SessionConfig,
        ws_url: Url,
        health_url: Url,
        devices: Vec<Arc<dyn CaptureDevice>>,
        commands: UnboundedReceiver<SessionCommand>,
    ) -> (Self, watch::Receiver<SessionSnapshot>) {
        let (connection, channel_events) =
            ConnectionManager::new(ws_url, ReconnectPolicy::from(&config.reconnect));
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (liveness_tx, liveness_rx) = mpsc::unbounded_channel();
        let active_device = if devices.is_empty() { None } else { Some(0) };

        let mut runtime = Self {
            session_id: Uuid::new_v4().to_string(),
            streamer: FrameStreamer::new(config.frames),
            config,
            health_url,
            machine: SessionStateMachine::new(),
            connection,
            channel_events,
            frame_tx,
            frame_rx,
            liveness_tx,
            liveness_rx,
            liveness_task: None,
            commands,
            snapshots: watch::Sender::new(placeholder_snapshot()),
            devices,
            active_device,
        };

        runtime.publish();
        let receiver = runtime.snapshots.subscribe();
        (runtime, receiver)
    }

    pub(crate) fn session_id(&self) -> &str {
        &self.session_id
    }

    pub(crate) async fn run(mut self) {
        info!("Session {} running", self.session_id);

        loop {
            let deadline = self.connection.reconnect_deadline();

            tokio::select! {
                Some(event) = self.channel_events.recv() => self.on_channel_event(event),
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.on_command(command),
                },
                Some(outcome) = self.frame_rx.recv() => self.on_frame_outcome(outcome),
                Some(notice) = self.liveness_rx.recv() => {
                    self.dispatch(SessionEvent::Liveness(notice));
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.on_reconnect_due();
                }
                now = self.streamer.tick() => self.on_tick(now),
            }

            self.publish();
        }

        self.teardown();
        self.publish();
        info!("Session {} ended", self.session_id);
    }

    fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Action(action) => self.dispatch(SessionEvent::User(action)),
            SessionCommand::SelectDevice(device_id) => {
                match self.devices.iter().position(|d| d.id() == device_id) {
                    Some(index) => {
                        self.active_device = Some(index);
                        info!("Switched to device {device_id}");
                    }
                    None => warn!("Unknown device {device_id}"),
                }
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn on_channel_event(&mut self, event: ChannelEvent) {
        let Some(notice) = self.connection.handle_event(event) else {
            return;
        };

        match notice {
            ConnectionNotice::Message(text) => match InboundMessage::decode(&text) {
                Ok(message) => {
                    trace!("Inbound {}", message.status());
                    self.dispatch(SessionEvent::Inbound(message));
                }
                Err(e) => warn!("Dropping inbound message: {e}"),
            },
            notice => self.dispatch(SessionEvent::Connection(notice)),
        }
    }

    fn on_reconnect_due(&mut self) {
        if let Some(notice) = self.connection.fire_reconnect() {
            self.dispatch(SessionEvent::Connection(notice));
        }
    }

    fn on_tick(&mut self, now: Instant) {
        let Some(device) = self.active_device.and_then(|i| self.devices.get(i)).cloned() else {
            debug!("Frame tick without a capture device");
            return;
        };

        let gate = FrameGate {
            channel_open: self.connection.is_open(),
            device_ready: device.is_ready(),
        };

        match self.streamer.begin_frame(now, gate) {
            Ok(epoch) => self
                .streamer
                .spawn_capture(device, epoch, self.frame_tx.clone()),
            Err(skip) => trace!("Frame skipped: {skip:?}"),
        }
    }

    fn on_frame_outcome(&mut self, outcome: FrameOutcome) {
        if !self.streamer.is_current(outcome.epoch) {
            trace!("Discarding frame from epoch {}", outcome.epoch);
            return;
        }

        let sent = match outcome.result {
            Ok(data) => self.connection.send(&OutboundMessage::Frame { data }),
            Err(e) => {
                debug!("Frame not captured: {e}");
                false
            }
        };

        self.streamer.complete_frame(outcome.epoch, sent);
    }

    fn dispatch(&mut self, event: SessionEvent) {
        for effect in self.machine.handle(event) {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Send(message) => {
                if !self.connection.send(&message) {
                    debug!("{} not sent", message.kind());
                }
            }
            Effect::StartFrames => self.streamer.start(),
            Effect::StopFrames => self.streamer.stop(),
            Effect::Connect => {
                if let Some(notice) = self.connection.connect() {
                    self.dispatch(SessionEvent::Connection(notice));
                }
            }
            Effect::Disconnect => {
                self.cancel_liveness();
                if let Some(notice) = self.connection.disconnect() {
                    self.dispatch(SessionEvent::Connection(notice));
                }
            }
            Effect::ResetConnection => {
                self.cancel_liveness();
                self.connection.reset();
            }
            Effect::CheckLiveness => self.spawn_liveness(),
        }
    }

    fn spawn_liveness(&mut self) {
        self.cancel_liveness();

        let url = self.health_url.to_string();
        let config = self.config.liveness;
        let notices = self.liveness_tx.clone();

        self.liveness_task = Some(tokio::spawn(async move {
            let max_attempts = config.max_attempts;
            let result = wait_for_service(&url, &config, |attempt| {
                let _ = notices.send(LivenessNotice::Attempt {
                    attempt,
                    max_attempts,
                });
            })
            .await;

            let notice = match result {
                Ok(attempts) => LivenessNotice::Reachable { attempts },
                Err(e) => {
                    warn!("{e}");
                    LivenessNotice::Exhausted {
                        attempts: max_attempts,
                    }
                }
            };
            let _ = notices.send(notice);
        }));
    }

    fn cancel_liveness(&mut self) {
        if let Some(task) = self.liveness_task.take() {
            task.abort();
        }
    }

    fn teardown(&mut self) {
        self.streamer.stop();
        self.cancel_liveness();
        self.connection.disconnect();
        debug!("Session {} torn down", self.session_id);
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    fn snapshot(&self) -> SessionSnapshot {
        let solve = self.machine.solve();

        SessionSnapshot {
            session_id: self.session_id.clone(),
            phase: self.machine.phase(),
            workflow: self.machine.workflow(),
            status: self.machine.status().clone(),
            connection: self.connection.state(),
            faces: self.machine.registry().iter().cloned().collect(),
            calibration: CalibrationView::from(self.machine.calibration()),
            profile: self.machine.calibration().profile().clone(),
            moves: solve.moves().to_vec(),
            current_move_index: solve.current_move_index(),
            wrong_move_count: solve.wrong_move_count(),
            streaming: self.streamer.is_running(),
            devices: list_devices(&self.devices),
            active_device: self
                .active_device
                .and_then(|i| self.devices.get(i))
                .map(|device| device.id().to_string()),
        }
    }
}

fn placeholder_snapshot() -> SessionSnapshot {
    SessionSnapshot {
        session_id: String::new(),
        phase: Default::default(),
        workflow: Default::default(),
        status: Default::default(),
        connection: Default::default(),
        faces: Vec::new(),
        calibration: CalibrationView::default(),
        profile: Default::default(),
        moves: Vec::new(),
        current_move_index: 0,
        wrong_move_count: 0,
        streaming: false,
        devices: Vec::new(),
        active_device: None,
    }
}
