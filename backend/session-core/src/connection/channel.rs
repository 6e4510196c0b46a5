use crate::error::connection::ConnectionError;

use common::ErrorLocation;

use std::panic::Location;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEventKind {
    Opened,
    Message(String),
    Closed,
    Failed(String),
}

/// Report from a connection task. `generation` identifies the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub generation: u64,
    pub kind: ChannelEventKind,
}

/// Drives one WebSocket until it closes, fails, or its writer is dropped.
///
/// Emits `Opened` at most once and exactly one terminal event (`Closed` or
/// `Failed`) unless the manager abandoned the channel first.
pub(crate) async fn run_channel(
    url: Url,
    generation: u64,
    events: UnboundedSender<ChannelEvent>,
    mut outbound: UnboundedReceiver<String>,
) {
    let emit = |kind: ChannelEventKind| {
        // The receiver only goes away when the session is torn down.
        let _ = events.send(ChannelEvent { generation, kind });
    };

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            let error = ConnectionError::Handshake {
                message: format!("WebSocket connect to {url} failed: {e}"),
                location: ErrorLocation::from(Location::caller()),
            };
            warn!("{error}");
            emit(ChannelEventKind::Failed(error.to_string()));
            return;
        }
    };

    info!("Channel {generation} open at {url}");
    emit(ChannelEventKind::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    emit(ChannelEventKind::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    warn!("Ignoring {} byte binary frame", data.len());
                }
                Some(Ok(Message::Close(frame))) => {
                    info!("Channel {generation} closed by peer: {frame:?}");
                    emit(ChannelEventKind::Closed);
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let error = ConnectionError::Read {
                        message: e.to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    };
                    warn!("{error}");
                    emit(ChannelEventKind::Failed(error.to_string()));
                    return;
                }
                None => {
                    info!("Channel {generation} stream ended");
                    emit(ChannelEventKind::Closed);
                    return;
                }
            },
            outgoing = outbound.recv() => match outgoing {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        let error = ConnectionError::Send {
                            message: e.to_string(),
                            location: ErrorLocation::from(Location::caller()),
                        };
                        warn!("{error}");
                        emit(ChannelEventKind::Failed(error.to_string()));
                        return;
                    }
                }
                None => {
                    debug!("Channel {generation} writer dropped, closing");
                    let _ = write.close().await;
                    return;
                }
            },
        }
    }
}
