use crate::config::FrameConfig;
use crate::streamer::{FrameGate, FrameSkip, FrameStreamer};

use std::time::Duration;

use tokio::time::Instant;

const OPEN_AND_READY: FrameGate = FrameGate {
    channel_open: true,
    device_ready: true,
};

fn running_streamer() -> FrameStreamer {
    let mut streamer = FrameStreamer::new(FrameConfig::default());
    streamer.start();
    streamer
}

/// **VALUE**: Verifies at most one frame per 250 ms window with an always-ready device.
///
/// **WHY THIS MATTERS**: The service processes frames serially. Sending faster than the
/// cadence only grows its backlog and the latency of every detection.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The interval check is skipped when no frame is in flight
/// - Skipped ticks are queued and sent in a burst
#[tokio::test]
async fn given_ticks_every_50ms_when_frames_complete_immediately_then_sends_are_250ms_apart() {
    // GIVEN
    let mut streamer = running_streamer();
    let start = Instant::now();
    let mut sent_at = Vec::new();

    // WHEN: One second of 50 ms ticks, each frame completing on the same tick
    for step in 0..=20u64 {
        let now = start + Duration::from_millis(step * 50);
        if let Ok(epoch) = streamer.begin_frame(now, OPEN_AND_READY) {
            assert!(streamer.complete_frame(epoch, true));
            sent_at.push(now);
        }
    }

    // THEN
    assert_eq!(sent_at.len(), 5);
    for pair in sent_at.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(250));
    }
}

/// **VALUE**: Verifies encode time does not eat into the next window.
///
/// **WHY THIS MATTERS**: Frames finish a few milliseconds after their tick. If the window
/// opened at completion, the next 250 ms tick would be too soon and the effective rate
/// would halve.
///
/// **BUG THIS CATCHES**: Would catch if `last_sent_at` is taken from the completion time
/// rather than from the tick that claimed the frame.
#[tokio::test]
async fn given_frames_completing_after_their_tick_when_ticked_every_250ms_then_every_tick_sends() {
    // GIVEN
    let mut streamer = running_streamer();
    let start = Instant::now();
    let mut sent = 0;

    // WHEN: Two seconds of 250 ms ticks, each frame finishing 1 ms after its tick
    for step in 0..8u64 {
        let tick = start + Duration::from_millis(step * 250);
        let epoch = streamer
            .begin_frame(tick, OPEN_AND_READY)
            .expect("every 250 ms tick should claim a frame");
        let finished = tick + Duration::from_millis(1);
        assert_eq!(
            streamer.begin_frame(finished, OPEN_AND_READY),
            Err(FrameSkip::InFlight)
        );
        assert!(streamer.complete_frame(epoch, true));
        sent += 1;
        assert_eq!(streamer.budget().last_sent_at, Some(tick));
    }

    // THEN
    assert_eq!(sent, 8);
}

/// **VALUE**: Verifies no new frame starts while one is being encoded or sent.
///
/// **BUG THIS CATCHES**: Would catch if `in_flight` is not checked, which lets slow
/// encodes pile up on the blocking pool.
#[tokio::test]
async fn given_frame_in_flight_when_next_tick_arrives_then_skipped() {
    // GIVEN
    let mut streamer = running_streamer();
    let start = Instant::now();
    let epoch = streamer.begin_frame(start, OPEN_AND_READY).unwrap();

    // WHEN: Well past the interval but still in flight
    let later = start + Duration::from_millis(600);
    let result = streamer.begin_frame(later, OPEN_AND_READY);

    // THEN
    assert_eq!(result, Err(FrameSkip::InFlight));

    // AND: completion without a send frees the slot without consuming the window
    assert!(streamer.complete_frame(epoch, false));
    assert!(streamer.budget().last_sent_at.is_none());
    assert!(streamer.begin_frame(later, OPEN_AND_READY).is_ok());
}

#[tokio::test]
async fn given_channel_closed_or_device_not_ready_when_ticked_then_no_frame() {
    let mut streamer = running_streamer();
    let now = Instant::now();

    let closed = FrameGate {
        channel_open: false,
        device_ready: true,
    };
    let not_ready = FrameGate {
        channel_open: true,
        device_ready: false,
    };

    assert_eq!(streamer.begin_frame(now, closed), Err(FrameSkip::ChannelNotOpen));
    assert_eq!(streamer.begin_frame(now, not_ready), Err(FrameSkip::DeviceNotReady));
    assert!(!streamer.budget().in_flight);
}

/// **VALUE**: Verifies a completion from before `stop()` is discarded.
///
/// **WHY THIS MATTERS**: Capture runs on the blocking pool and may finish after the
/// session stopped streaming. Its frame must not be sent.
///
/// **BUG THIS CATCHES**: Would catch if stop/start does not bump the epoch.
#[tokio::test]
async fn given_stopped_streamer_when_old_frame_completes_then_ignored() {
    // GIVEN
    let mut streamer = running_streamer();
    let now = Instant::now();
    let epoch = streamer.begin_frame(now, OPEN_AND_READY).unwrap();

    // WHEN
    streamer.stop();
    streamer.start();

    // THEN
    assert!(!streamer.is_current(epoch));
    assert!(!streamer.complete_frame(epoch, true));
    assert!(streamer.budget().last_sent_at.is_none());
}

#[test]
fn given_stopped_streamer_when_begin_frame_called_then_stopped() {
    let mut streamer = FrameStreamer::new(FrameConfig::default());

    assert_eq!(
        streamer.begin_frame(Instant::now(), OPEN_AND_READY),
        Err(FrameSkip::Stopped)
    );
}
