//! Frame cadence with drop-latest backpressure.
//!
//! The ticker only proposes a frame; [`FrameStreamer::begin_frame`] decides
//! against live gating state whether one is actually taken. Capture and encode
//! run on the blocking pool and report back as a [`FrameOutcome`], which the
//! session loop turns into a send and hands to [`FrameStreamer::complete_frame`].

use crate::capture::{CaptureDevice, encode_frame};
use crate::config::FrameConfig;
use crate::error::capture::CaptureError;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Why a tick did not produce a frame. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSkip {
    Stopped,
    ChannelNotOpen,
    DeviceNotReady,
    InFlight,
    TooSoon,
}

/// Live conditions read at the moment a frame is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGate {
    pub channel_open: bool,
    pub device_ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBudget {
    pub interval: Duration,
    pub last_sent_at: Option<Instant>,
    pub in_flight: bool,
}

impl FrameBudget {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent_at: None,
            in_flight: false,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        match self.last_sent_at {
            Some(sent) => now.saturating_duration_since(sent) >= self.interval,
            None => true,
        }
    }
}

#[derive(Debug)]
pub struct FrameOutcome {
    pub epoch: u64,
    pub result: Result<String, CaptureError>,
}

pub struct FrameStreamer {
    config: FrameConfig,
    budget: FrameBudget,
    epoch: u64,
    running: bool,
    ticker: Option<Interval>,
    /// Tick that claimed the in-flight frame; becomes `last_sent_at` once sent.
    claimed_at: Option<Instant>,
}

impl FrameStreamer {
    pub fn new(config: FrameConfig) -> Self {
        Self {
            budget: FrameBudget::new(config.interval()),
            config,
            epoch: 0,
            running: false,
            ticker: None,
            claimed_at: None,
        }
    }

    pub fn budget(&self) -> &FrameBudget {
        &self.budget
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start the cadence. A new epoch makes completions from earlier runs stale.
    pub fn start(&mut self) {
        if self.running {
            return;
        }

        self.running = true;
        self.epoch += 1;
        self.budget.in_flight = false;
        self.claimed_at = None;

        let mut ticker = interval_at(Instant::now() + self.budget.interval, self.budget.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);

        debug!("Frame streaming started (epoch {})", self.epoch);
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }

        self.running = false;
        self.ticker = None;
        self.epoch += 1;
        self.budget.in_flight = false;
        self.claimed_at = None;

        debug!("Frame streaming stopped");
    }

    /// Resolves on the next cadence tick; pending forever while stopped.
    pub async fn tick(&mut self) -> Instant {
        match self.ticker.as_mut() {
            Some(ticker) => ticker.tick().await,
            None => std::future::pending().await,
        }
    }

    /// Claim the frame slot for this tick.
    pub fn begin_frame(&mut self, now: Instant, gate: FrameGate) -> Result<u64, FrameSkip> {
        if !self.running {
            return Err(FrameSkip::Stopped);
        }
        if !gate.channel_open {
            return Err(FrameSkip::ChannelNotOpen);
        }
        if !gate.device_ready {
            return Err(FrameSkip::DeviceNotReady);
        }
        if self.budget.in_flight {
            return Err(FrameSkip::InFlight);
        }
        if !self.budget.is_due(now) {
            return Err(FrameSkip::TooSoon);
        }

        self.budget.in_flight = true;
        self.claimed_at = Some(now);
        Ok(self.epoch)
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.running && epoch == self.epoch
    }

    /// Release the frame slot. Returns false for a stale epoch, which is ignored.
    ///
    /// A sent frame opens its window at the tick that claimed it, so encode
    /// time does not push the next frame back a whole interval.
    pub fn complete_frame(&mut self, epoch: u64, sent: bool) -> bool {
        if !self.is_current(epoch) {
            trace!("Ignoring completion from epoch {epoch} (current {})", self.epoch);
            return false;
        }

        self.budget.in_flight = false;
        let claimed_at = self.claimed_at.take();
        if sent {
            self.budget.last_sent_at = claimed_at;
        }
        true
    }

    /// Capture and encode on the blocking pool; the outcome arrives on `outcomes`.
    pub fn spawn_capture(
        &self,
        device: Arc<dyn CaptureDevice>,
        epoch: u64,
        outcomes: UnboundedSender<FrameOutcome>,
    ) {
        let config = self.config;

        tokio::task::spawn_blocking(move || {
            let result = device
                .capture()
                .and_then(|frame| encode_frame(&frame.image, &config));
            // Closed only after teardown, when the outcome no longer matters.
            let _ = outcomes.send(FrameOutcome { epoch, result });
        });
    }
}
