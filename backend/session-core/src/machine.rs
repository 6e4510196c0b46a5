//! Phase controller for the scan, calibrate and solve workflow.
//!
//! [`SessionStateMachine::handle`] is the only place session state changes.
//! It never performs I/O: everything it wants done comes back as [`Effect`]s
//! for the session loop to apply.
//!
//! The workflow phase and its overlays are stored separately. A
//! `detection_warning` while scanning shows `ErrorRecoverable` but leaves the
//! workflow at `ScanningFaces`, so the next ordinary event resumes scanning.
//! A dropped channel likewise shows `Connecting` over the workflow until the
//! channel reopens, so a reconnect mid-solve picks up where it left off.

use crate::calibration::{CalibrationSession, CalibrationStep};
use crate::connection::ConnectionNotice;
use crate::liveness::LivenessNotice;
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::registry::CubeFaceRegistry;
use crate::solve::{SolveState, WRONG_MOVE_LIMIT};

use models::face::FACE_COUNT;
use models::{BoundingBox, ColorTriple, FaceCells, FaceId, SessionPhase, StatusLine};

use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Connect,
    Disconnect,
    Restart,
    ConfirmFace(FaceId),
    RescanFace(FaceId),
    GetSolution,
    StartCalibration,
    ConfirmCalibration,
    SelectCalibrationColor(FaceId),
    ResetCalibration,
    SetCubeRegion(BoundingBox),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connection(ConnectionNotice),
    Inbound(InboundMessage),
    User(UserAction),
    Liveness(LivenessNotice),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(OutboundMessage),
    StartFrames,
    StopFrames,
    Connect,
    Disconnect,
    CheckLiveness,
    ResetConnection,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStateMachine {
    workflow: SessionPhase,
    recoverable: bool,
    reconnecting: bool,
    fatal: bool,
    status: StatusLine,
    service_verified: bool,
    connection_open: bool,
    registry: CubeFaceRegistry,
    calibration: CalibrationSession,
    solve: SolveState,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            status: StatusLine::info("Idle"),
            ..Self::default()
        }
    }

    /// Phase presented to the user: fatal, then reconnecting, then recoverable,
    /// then workflow.
    pub fn phase(&self) -> SessionPhase {
        if self.fatal {
            SessionPhase::ErrorFatal
        } else if self.reconnecting {
            SessionPhase::Connecting
        } else if self.recoverable {
            SessionPhase::ErrorRecoverable
        } else {
            self.workflow
        }
    }

    pub fn workflow(&self) -> SessionPhase {
        self.workflow
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn service_verified(&self) -> bool {
        self.service_verified
    }

    pub fn registry(&self) -> &CubeFaceRegistry {
        &self.registry
    }

    pub fn calibration(&self) -> &CalibrationSession {
        &self.calibration
    }

    pub fn solve(&self) -> &SolveState {
        &self.solve
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Connection(notice) => self.on_connection(notice),
            SessionEvent::Inbound(message) => self.on_inbound(message),
            SessionEvent::User(action) => self.on_user(action),
            SessionEvent::Liveness(notice) => self.on_liveness(notice),
        }
    }

    // ============================================
    // CONNECTION
    // ============================================

    fn on_connection(&mut self, notice: ConnectionNotice) -> Vec<Effect> {
        match notice {
            ConnectionNotice::Connecting { attempt } => {
                if self.fatal || self.workflow == SessionPhase::Idle {
                    return Vec::new();
                }
                if !self.reconnecting {
                    self.workflow = SessionPhase::Connecting;
                }
                self.status = if attempt == 0 {
                    StatusLine::info("Connecting to service...")
                } else {
                    StatusLine::info(format!("Reconnecting (attempt {attempt})..."))
                };
                Vec::new()
            }
            ConnectionNotice::Open => {
                self.connection_open = true;
                self.service_verified = true;
                self.recoverable = false;

                if std::mem::take(&mut self.reconnecting) {
                    info!("Reconnected; resuming {}", self.workflow);
                    self.status = StatusLine::info("Reconnected to service");
                } else {
                    if matches!(self.workflow, SessionPhase::Idle | SessionPhase::Connecting) {
                        self.workflow = SessionPhase::AwaitingCube;
                    }
                    self.status = StatusLine::info("Connected. Show the cube to the camera.");
                }

                if self.workflow.is_streaming() {
                    vec![Effect::StartFrames]
                } else {
                    Vec::new()
                }
            }
            ConnectionNotice::Closed {
                attempt,
                retry_in_ms,
            } => {
                self.connection_open = false;
                self.recoverable = false;
                if matches!(self.workflow, SessionPhase::Idle | SessionPhase::Connecting) {
                    self.workflow = SessionPhase::Connecting;
                } else {
                    self.reconnecting = true;
                }
                self.status = StatusLine::warning(format!(
                    "Connection lost. Retrying in {}s (attempt {attempt})",
                    retry_in_ms.div_ceil(1000)
                ));
                vec![Effect::StopFrames]
            }
            ConnectionNotice::Failed { attempts } => {
                self.connection_open = false;
                self.reconnecting = false;
                self.fatal = true;
                self.status = StatusLine::fatal(format!(
                    "Unable to reach the service after {attempts} attempts. Restart to try again."
                ));
                vec![Effect::StopFrames]
            }
            ConnectionNotice::Disconnected => {
                self.connection_open = false;
                Vec::new()
            }
            ConnectionNotice::Message(_) => {
                debug!("Raw channel message reached the state machine; ignoring");
                Vec::new()
            }
        }
    }

    fn on_liveness(&mut self, notice: LivenessNotice) -> Vec<Effect> {
        if self.fatal {
            return Vec::new();
        }

        match notice {
            LivenessNotice::Attempt {
                attempt,
                max_attempts,
            } => {
                self.status = StatusLine::info(format!(
                    "Checking service availability ({attempt}/{max_attempts})..."
                ));
                Vec::new()
            }
            LivenessNotice::Reachable { .. } => {
                self.service_verified = true;
                if self.workflow != SessionPhase::Connecting {
                    return Vec::new();
                }
                self.status = StatusLine::info("Service is up. Connecting...");
                vec![Effect::Connect]
            }
            LivenessNotice::Exhausted { attempts } => {
                self.fatal = true;
                self.status = StatusLine::fatal(format!(
                    "Service did not respond after {attempts} checks. Restart to try again."
                ));
                vec![Effect::StopFrames]
            }
        }
    }

    // ============================================
    // USER ACTIONS
    // ============================================

    fn on_user(&mut self, action: UserAction) -> Vec<Effect> {
        match action {
            UserAction::Connect => self.user_connect(),
            UserAction::Disconnect => {
                self.workflow = SessionPhase::Idle;
                self.recoverable = false;
                self.reconnecting = false;
                self.connection_open = false;
                if !self.fatal {
                    self.status = StatusLine::info("Disconnected");
                }
                vec![Effect::StopFrames, Effect::Disconnect]
            }
            UserAction::Restart => self.restart(),
            UserAction::ConfirmFace(face) => self.user_confirm_face(face),
            UserAction::RescanFace(face) => {
                self.registry.rescan(face);
                self.status = StatusLine::info(format!(
                    "Show the {} face again to rescan it",
                    face.name()
                ));
                Vec::new()
            }
            UserAction::GetSolution => {
                if !self.registry.all_confirmed() {
                    self.status = StatusLine::warning(format!(
                        "Confirm all faces first ({}/{FACE_COUNT} confirmed)",
                        self.registry.confirmed_count()
                    ));
                    return Vec::new();
                }
                self.status = StatusLine::info("Requesting solution...");
                vec![Effect::Send(OutboundMessage::GetSolution)]
            }
            UserAction::StartCalibration => {
                if !self.connection_open {
                    self.status = StatusLine::warning("Connect before calibrating");
                    return Vec::new();
                }
                self.status = StatusLine::info("Starting calibration...");
                vec![Effect::Send(OutboundMessage::StartCalibration)]
            }
            UserAction::ConfirmCalibration => self.user_confirm_calibration(None),
            UserAction::SelectCalibrationColor(color) => self.user_confirm_calibration(Some(color)),
            UserAction::ResetCalibration => {
                self.calibration.reset();
                if self.workflow == SessionPhase::Calibrating {
                    self.workflow = SessionPhase::FaceDetecting;
                }
                self.status = StatusLine::info("Calibration reset to default colors");
                vec![Effect::Send(OutboundMessage::ResetCalibration)]
            }
            UserAction::SetCubeRegion(bbox) => {
                if bbox.is_empty() {
                    self.status = StatusLine::warning("Cube region must have a positive size");
                    return Vec::new();
                }
                if !self.connection_open {
                    debug!("Cube region set while disconnected; not sent");
                    return Vec::new();
                }
                vec![Effect::Send(OutboundMessage::CubeBbox { bbox })]
            }
        }
    }

    fn user_connect(&mut self) -> Vec<Effect> {
        if self.fatal {
            debug!("Connect ignored in fatal state; restart required");
            return Vec::new();
        }
        if self.workflow != SessionPhase::Idle {
            debug!("Connect ignored in {}", self.workflow);
            return Vec::new();
        }

        self.workflow = SessionPhase::Connecting;
        self.connect_effects()
    }

    fn restart(&mut self) -> Vec<Effect> {
        info!("Restarting session");

        self.registry.reset();
        self.calibration.reset();
        self.solve.reset();
        self.fatal = false;
        self.recoverable = false;
        self.reconnecting = false;
        self.connection_open = false;
        self.workflow = SessionPhase::Connecting;

        let mut effects = vec![Effect::StopFrames, Effect::ResetConnection];
        effects.extend(self.connect_effects());
        effects
    }

    fn connect_effects(&mut self) -> Vec<Effect> {
        if self.service_verified {
            self.status = StatusLine::info("Connecting to service...");
            vec![Effect::Connect]
        } else {
            self.status = StatusLine::info("Checking service availability...");
            vec![Effect::CheckLiveness]
        }
    }

    fn user_confirm_face(&mut self, face: FaceId) -> Vec<Effect> {
        if self.workflow != SessionPhase::ScanningFaces {
            self.status = StatusLine::warning("Faces can only be confirmed while scanning");
            return Vec::new();
        }

        match self.registry.confirm(face) {
            Ok(_) => {
                self.status = self.confirmed_status(face);
                vec![Effect::Send(OutboundMessage::ConfirmFace { face })]
            }
            Err(e) => {
                debug!("{e}");
                self.status =
                    StatusLine::warning(format!("The {} face has not been scanned yet", face.name()));
                Vec::new()
            }
        }
    }

    fn user_confirm_calibration(&mut self, selected: Option<FaceId>) -> Vec<Effect> {
        if self.workflow != SessionPhase::Calibrating {
            self.status = StatusLine::warning("Calibration is not running");
            return Vec::new();
        }

        if let Some(color) = selected
            && let Err(e) = self.calibration.select_manually(color)
        {
            debug!("{e}");
            self.status = StatusLine::warning("Calibration is not running");
            return Vec::new();
        }

        let step = match self.calibration.confirm() {
            Ok(step) => step,
            Err(e) => {
                debug!("{e}");
                self.status = match self.calibration.expected_face() {
                    Some(face) => StatusLine::warning(format!(
                        "No color detected for {} yet. Hold the center steady or pick it manually.",
                        face.name()
                    )),
                    None => StatusLine::warning("Calibration is not running"),
                };
                return Vec::new();
            }
        };

        let mut effects = vec![Effect::Send(OutboundMessage::ConfirmCalibration {
            selected_color: step.selected,
        })];
        effects.extend(self.after_calibration_step(step));
        effects
    }

    fn after_calibration_step(&mut self, step: CalibrationStep) -> Vec<Effect> {
        if !step.completed {
            self.status = match self.calibration.expected_face() {
                Some(next) => StatusLine::info(format!(
                    "Calibrated {} as {}. Now show the {} center.",
                    step.face.name(),
                    step.color,
                    next.name()
                )),
                None => StatusLine::info(format!("Calibrated {}", step.face.name())),
            };
            return Vec::new();
        }

        self.workflow = SessionPhase::ScanningFaces;
        self.status = StatusLine::info("Calibration complete. Scan each face.");
        vec![Effect::Send(OutboundMessage::CalibrationProfile {
            profile: self.calibration.profile().clone(),
        })]
    }

    // ============================================
    // INBOUND
    // ============================================

    fn on_inbound(&mut self, message: InboundMessage) -> Vec<Effect> {
        if self.fatal {
            debug!("Ignoring {} in fatal state", message.status());
            return Vec::new();
        }

        if message.is_recoverable_condition() {
            let default = match message {
                InboundMessage::DetectionError { .. } => "Detection failed. Adjust the cube.",
                InboundMessage::ProcessingTimeout { .. } => "Service timed out processing a frame",
                _ => "Detection is unreliable. Check lighting.",
            };
            self.recoverable = true;
            self.status = StatusLine::warning(status_text(&message, default));
            return Vec::new();
        }

        self.recoverable = false;
        let text = message.message().map(str::to_owned);

        match message {
            InboundMessage::CubeDetected { .. } => {
                if self.workflow == SessionPhase::AwaitingCube {
                    self.workflow = SessionPhase::FaceDetecting;
                }
                self.status = StatusLine::info(text.unwrap_or_else(|| "Cube detected".into()));
                Vec::new()
            }
            InboundMessage::NoCube { .. } => {
                if self.workflow == SessionPhase::FaceDetecting {
                    self.workflow = SessionPhase::AwaitingCube;
                }
                self.status = StatusLine::warning(text.unwrap_or_else(|| "No cube in view".into()));
                Vec::new()
            }
            InboundMessage::FaceDetected {
                colors,
                face,
                confirmed,
                ..
            } => self.on_face_detected(colors, face, confirmed, text),
            InboundMessage::FaceNotDetected { .. } => {
                self.status =
                    StatusLine::warning(text.unwrap_or_else(|| "Face not detected".into()));
                Vec::new()
            }
            InboundMessage::FaceConfirmed { face, .. } => {
                if self.workflow != SessionPhase::ScanningFaces {
                    debug!("face_confirmed for {face} outside scanning; ignored");
                    return Vec::new();
                }
                match self.registry.confirm(face) {
                    Ok(_) => self.status = self.confirmed_status(face),
                    Err(e) => {
                        warn!("{e}");
                        self.status = StatusLine::warning(format!(
                            "Service confirmed {} before it was scanned",
                            face.name()
                        ));
                    }
                }
                Vec::new()
            }
            InboundMessage::Processing { .. } => {
                self.status = StatusLine::info(text.unwrap_or_else(|| "Processing...".into()));
                Vec::new()
            }
            InboundMessage::CalibrationStarted { .. } => {
                if !matches!(
                    self.workflow,
                    SessionPhase::AwaitingCube
                        | SessionPhase::FaceDetecting
                        | SessionPhase::ScanningFaces
                ) {
                    debug!("calibration_started in {}; ignored", self.workflow);
                    return Vec::new();
                }
                self.calibration.start();
                self.workflow = SessionPhase::Calibrating;
                let first = self.calibration.expected_face().map_or("first", FaceId::name);
                self.status = StatusLine::info(
                    text.unwrap_or_else(|| format!("Calibrating: show the {first} center")),
                );
                Vec::new()
            }
            InboundMessage::CalibrationFaceDetected {
                detected_color,
                expected_color,
                ..
            } => self.on_calibration_detection(detected_color, expected_color, text),
            InboundMessage::CalibrationNext { .. } | InboundMessage::CalibrationComplete { .. } => {
                if let Some(text) = text {
                    self.status = StatusLine::info(text);
                }
                Vec::new()
            }
            InboundMessage::Solving {
                moves,
                current_move,
                ..
            }
            | InboundMessage::SolutionReady {
                moves,
                current_move,
                ..
            } => self.on_solution(moves, current_move, text),
            InboundMessage::ScanComplete { .. } => {
                if !self.connection_open {
                    return Vec::new();
                }
                self.workflow = SessionPhase::Solving;
                self.status =
                    StatusLine::info(text.unwrap_or_else(|| "All faces scanned. Solving...".into()));
                Vec::new()
            }
            InboundMessage::Error { .. } => self.on_wrong_move(text),
            InboundMessage::Solved { .. } => {
                if self.workflow != SessionPhase::Solving {
                    debug!("solved outside solving; ignored");
                    return Vec::new();
                }
                self.solve.reset();
                self.workflow = SessionPhase::Solved;
                self.status = StatusLine::info(text.unwrap_or_else(|| "Cube solved!".into()));
                vec![Effect::StopFrames]
            }
            InboundMessage::DetectionError { .. }
            | InboundMessage::DetectionWarning { .. }
            | InboundMessage::ProcessingTimeout { .. } => Vec::new(),
        }
    }

    fn on_face_detected(
        &mut self,
        colors: FaceCells,
        face: Option<FaceId>,
        confirmed: bool,
        text: Option<String>,
    ) -> Vec<Effect> {
        let Some(face) = face.or_else(|| colors.center().face()) else {
            warn!("Dropping face_detected {colors}: center sticker unknown");
            self.status = StatusLine::warning("Face center not recognized. Hold the cube steady.");
            return Vec::new();
        };

        if matches!(
            self.workflow,
            SessionPhase::AwaitingCube | SessionPhase::FaceDetecting
        ) {
            self.workflow = SessionPhase::ScanningFaces;
        }

        if self.workflow != SessionPhase::ScanningFaces {
            debug!("face_detected for {face} in {}; ignored", self.workflow);
            return Vec::new();
        }

        let record = self.registry.upsert(face, colors, confirmed);
        let known = record.cells.known_count();
        self.status = StatusLine::info(text.unwrap_or_else(|| {
            format!(
                "Detected {} face ({known}/9 stickers). Confirm or rescan.",
                face.name()
            )
        }));
        Vec::new()
    }

    fn on_calibration_detection(
        &mut self,
        detected: Option<ColorTriple>,
        expected: Option<FaceId>,
        text: Option<String>,
    ) -> Vec<Effect> {
        if self.workflow != SessionPhase::Calibrating {
            debug!("calibration_face_detected outside calibration; ignored");
            return Vec::new();
        }

        let Some(color) = detected else {
            self.status =
                StatusLine::info(text.unwrap_or_else(|| "Looking for the center color...".into()));
            return Vec::new();
        };

        if let (Some(expected), Some(current)) = (expected, self.calibration.expected_face())
            && expected != current
        {
            warn!("Service expects {expected} but calibration is at {current}");
        }

        match self.calibration.record_detection(color) {
            Ok(face) => {
                let nearest = self.calibration.profile().classify(&color);
                self.status = StatusLine::info(text.unwrap_or_else(|| {
                    format!(
                        "Detected {color} for {} (closest to {}). Confirm or pick manually.",
                        face.name(),
                        nearest.name()
                    )
                }));
            }
            Err(e) => debug!("{e}"),
        }
        Vec::new()
    }

    fn on_solution(
        &mut self,
        moves: Vec<String>,
        current_move: usize,
        text: Option<String>,
    ) -> Vec<Effect> {
        if !self.connection_open {
            debug!("Solution received while disconnected; ignored");
            return Vec::new();
        }

        let resumed = self.workflow == SessionPhase::Solved;
        self.solve.begin(moves, current_move);
        self.workflow = SessionPhase::Solving;

        let default = match self.solve.current_move() {
            Some(next) => format!("{} moves. Next: {next}", self.solve.moves().len()),
            None => "Solution received".to_string(),
        };
        self.status = StatusLine::info(text.unwrap_or(default));

        if resumed {
            vec![Effect::StartFrames]
        } else {
            Vec::new()
        }
    }

    fn on_wrong_move(&mut self, text: Option<String>) -> Vec<Effect> {
        if self.workflow != SessionPhase::Solving {
            self.status =
                StatusLine::warning(text.unwrap_or_else(|| "Service reported an error".into()));
            return Vec::new();
        }

        let count = self.solve.record_wrong_move();

        if self.solve.limit_reached() {
            warn!("{WRONG_MOVE_LIMIT} wrong moves; abandoning solution");
            self.solve.reset();
            self.registry.reset();
            self.workflow = SessionPhase::AwaitingCube;
            self.status = StatusLine::warning(
                "Too many wrong moves. Show the cube again to rescan it.",
            );
            return Vec::new();
        }

        self.status = StatusLine::warning(text.unwrap_or_else(|| {
            format!("Wrong move ({count}/{WRONG_MOVE_LIMIT})")
        }));
        Vec::new()
    }

    fn confirmed_status(&self, face: FaceId) -> StatusLine {
        StatusLine::info(format!(
            "{} face confirmed ({}/{FACE_COUNT})",
            capitalize(face.name()),
            self.registry.confirmed_count()
        ))
    }
}

fn status_text(message: &InboundMessage, default: &str) -> String {
    message.message().unwrap_or(default).to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
