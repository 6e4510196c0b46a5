//! Stand-in recognition service: answers `/health` and accepts WebSockets on one port.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

use session_core::config::SessionConfig;

pub type ServiceSocket = WebSocketStream<TcpStream>;

pub const WAIT: Duration = Duration::from_secs(10);

const HEALTH_REQUEST: &[u8] = b"GET /health";
const HEALTH_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok";

pub struct TestService {
    pub base_url: String,
    pub sockets: mpsc::UnboundedReceiver<ServiceSocket>,
    task: JoinHandle<()>,
}

impl TestService {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, sockets) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut head = [0u8; HEALTH_REQUEST.len()];
                    let read = stream.peek(&mut head).await.unwrap_or(0);
                    if head[..read].starts_with(HEALTH_REQUEST) {
                        answer_health(stream).await;
                    } else if let Ok(socket) = accept_async(stream).await {
                        let _ = tx.send(socket);
                    }
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            sockets,
            task,
        }
    }

    /// Next WebSocket the session opened.
    pub async fn accept(&mut self) -> ServiceSocket {
        timeout(WAIT, self.sockets.recv())
            .await
            .expect("session never connected")
            .expect("service stopped")
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn answer_health(mut stream: TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 512];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let _ = stream.write_all(HEALTH_RESPONSE).await;
    let _ = stream.shutdown().await;
}

/// Config with short timings, pointed at `base_url`.
pub fn fast_config(base_url: &str) -> SessionConfig {
    let mut config = SessionConfig::default();
    config.service.base_url = base_url.to_string();
    config.reconnect.base_delay_ms = 50;
    config.reconnect.cap_delay_ms = 200;
    config.liveness.interval_ms = 20;
    config.liveness.timeout_ms = 500;
    config.frames.interval_ms = 50;
    config
}

pub async fn send_status(socket: &mut ServiceSocket, json: &str) {
    socket.send(Message::text(json)).await.unwrap();
}

/// Next outbound message from the session, decoded as JSON.
pub async fn next_message(socket: &mut ServiceSocket) -> Value {
    loop {
        let message = timeout(WAIT, socket.next())
            .await
            .expect("no message from session")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Next outbound message that is not a frame.
pub async fn next_command(socket: &mut ServiceSocket) -> Value {
    loop {
        let message = next_message(socket).await;
        if message["type"] != "frame" {
            return message;
        }
    }
}
