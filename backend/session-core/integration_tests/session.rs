use crate::support::{TestService, WAIT, fast_config, next_command, next_message, send_status};

use session_core::capture::{CaptureDevice, StillFrameDevice};
use session_core::machine::UserAction;
use session_core::session::{SessionHandle, spawn_session};

use models::{ColorTriple, FaceCells, FaceId, SessionPhase, StatusSeverity};

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::StreamExt;
use image::GenericImageView;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

fn camera(id: &str) -> Arc<dyn CaptureDevice> {
    Arc::new(StillFrameDevice::solid(id, 640, 480, ColorTriple::new(200, 30, 30)))
}

async fn wait_for_phase(handle: &mut SessionHandle, phase: SessionPhase) {
    timeout(WAIT, handle.wait_for(|s| s.phase == phase))
        .await
        .unwrap_or_else(|_| panic!("session never reached {phase}"))
        .unwrap();
}

/// **VALUE**: Drives a whole scan and solve against a live WebSocket.
///
/// **WHY THIS MATTERS**: Unit tests cover each piece. This checks the pieces are
/// wired together: liveness, connect, frames on the wire, inbound dispatch, user
/// commands going out, and snapshots reflecting all of it.
///
/// **BUG THIS CATCHES**: Would catch frames never starting after connect, confirms
/// that never reach the service, or the wrong-move abort not showing in snapshots.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_live_service_when_cube_scanned_and_solved_then_snapshots_follow() {
    // GIVEN
    let mut service = TestService::start().await;
    let mut handle =
        spawn_session(fast_config(&service.base_url), vec![camera("cam-1")]).unwrap();

    // WHEN: Connecting
    handle.connect().unwrap();
    let mut socket = service.accept().await;
    wait_for_phase(&mut handle, SessionPhase::AwaitingCube).await;

    // THEN: Frames arrive downsampled and JPEG encoded
    let frame = next_message(&mut socket).await;
    assert_eq!(frame["type"], "frame");
    let bytes = STANDARD.decode(frame["data"].as_str().unwrap()).unwrap();
    let image = image::load_from_memory(&bytes).unwrap();
    assert_eq!(image.dimensions(), (320, 240));

    // WHEN: The service sees the cube and each face
    send_status(&mut socket, r#"{"status":"cube_detected"}"#).await;
    wait_for_phase(&mut handle, SessionPhase::FaceDetecting).await;

    for face in FaceId::ALL {
        let colors = FaceCells::uniform(face);
        send_status(
            &mut socket,
            &format!(r#"{{"status":"face_detected","colors":"{colors}"}}"#),
        )
        .await;
        timeout(
            WAIT,
            handle.wait_for(|s| s.face(face).is_some_and(|r| r.is_detected())),
        )
        .await
        .unwrap()
        .unwrap();

        handle.act(UserAction::ConfirmFace(face)).unwrap();
        let confirm = next_command(&mut socket).await;
        assert_eq!(confirm["type"], "confirm_face");
        assert_eq!(confirm["face"], face.to_string());
    }

    // THEN: The solution can be requested
    handle.act(UserAction::GetSolution).unwrap();
    assert_eq!(next_command(&mut socket).await["type"], "get_solution");

    // WHEN: A solution arrives and three moves go wrong
    send_status(
        &mut socket,
        r#"{"status":"solution_ready","moves":["R","U","R'","U'"]}"#,
    )
    .await;
    let solving = timeout(WAIT, handle.wait_for(|s| s.phase == SessionPhase::Solving))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(solving.current_move(), Some("R"));

    for _ in 0..3 {
        send_status(&mut socket, r#"{"status":"error"}"#).await;
    }

    // THEN
    let aborted = timeout(
        WAIT,
        handle.wait_for(|s| s.phase == SessionPhase::AwaitingCube),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(aborted.moves.is_empty());
    assert_eq!(aborted.current_move_index, 0);
    assert!(aborted.faces.iter().all(|r| !r.is_detected()));

    handle.shutdown().unwrap();
}

/// **VALUE**: Verifies the session reconnects on its own after the service drops it.
///
/// **BUG THIS CATCHES**: Would catch a retry timer that is scheduled but never polled
/// by the session loop, or an attempt counter that is not reset on reopen.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_open_session_when_service_drops_socket_then_reconnects() {
    // GIVEN
    let mut service = TestService::start().await;
    let mut handle =
        spawn_session(fast_config(&service.base_url), vec![camera("cam-1")]).unwrap();
    handle.connect().unwrap();
    let socket = service.accept().await;
    wait_for_phase(&mut handle, SessionPhase::AwaitingCube).await;

    // WHEN
    drop(socket);

    // THEN
    let _second = service.accept().await;
    let reopened = timeout(
        WAIT,
        handle.wait_for(|s| s.phase == SessionPhase::AwaitingCube && s.streaming),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(reopened.connection.attempt, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_open_session_when_user_disconnects_then_idle_and_socket_closes() {
    // GIVEN
    let mut service = TestService::start().await;
    let mut handle =
        spawn_session(fast_config(&service.base_url), vec![camera("cam-1")]).unwrap();
    handle.connect().unwrap();
    let mut socket = service.accept().await;
    wait_for_phase(&mut handle, SessionPhase::AwaitingCube).await;

    // WHEN
    handle.disconnect().unwrap();

    // THEN
    let idle = timeout(WAIT, handle.wait_for(|s| s.phase == SessionPhase::Idle))
        .await
        .unwrap()
        .unwrap();
    assert!(!idle.streaming);

    let ended = timeout(WAIT, async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "socket stayed open after disconnect");
}

/// **VALUE**: Verifies an unreachable service ends in the fatal phase.
///
/// **WHY THIS MATTERS**: The user needs a clear "restart" prompt instead of a spinner
/// that never resolves.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_no_service_when_connecting_then_fatal_after_liveness_checks() {
    // GIVEN: A port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = fast_config(&format!("http://{addr}"));
    config.liveness.max_attempts = 2;
    let mut handle = spawn_session(config, vec![camera("cam-1")]).unwrap();

    // WHEN
    handle.connect().unwrap();

    // THEN
    wait_for_phase(&mut handle, SessionPhase::ErrorFatal).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.status.severity, StatusSeverity::Fatal);
    assert!(!snapshot.streaming);
}

#[tokio::test]
async fn given_two_cameras_when_device_selected_then_snapshot_follows() {
    // GIVEN
    let mut handle = spawn_session(
        fast_config("http://127.0.0.1:9"),
        vec![camera("cam-1"), camera("cam-2")],
    )
    .unwrap();
    assert_eq!(handle.snapshot().active_device.as_deref(), Some("cam-1"));
    assert_eq!(handle.snapshot().devices.len(), 2);

    // WHEN
    handle.select_device("missing").unwrap();
    handle.select_device("cam-2").unwrap();

    // THEN
    let snapshot = timeout(
        WAIT,
        handle.wait_for(|s| s.active_device.as_deref() == Some("cam-2")),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(snapshot.devices[1].label, "Camera cam-2");
}

#[tokio::test]
async fn given_running_session_when_shut_down_then_loop_exits() {
    let handle = spawn_session(fast_config("http://127.0.0.1:9"), Vec::new()).unwrap();

    handle.shutdown().unwrap();

    timeout(WAIT, handle.closed()).await.unwrap();
    assert!(handle.connect().is_err());
}
