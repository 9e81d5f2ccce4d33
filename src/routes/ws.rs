// WebSocket event relay

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, timeout};

use super::{AppState, shutdown_requested};
use crate::docker_repo::DockerRepo;
use crate::relay::{EventSink, RelayEnd, relay_events};

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Write half of the socket; every write is bounded by `WS_SEND_TIMEOUT`.
struct WsSink(SplitSink<WebSocket, Message>);

impl EventSink for WsSink {
    async fn send(&mut self, frame: String) -> anyhow::Result<()> {
        timeout(WS_SEND_TIMEOUT, self.0.send(Message::Text(frame.into()))).await??;
        Ok(())
    }

    async fn heartbeat(&mut self) -> anyhow::Result<()> {
        timeout(WS_SEND_TIMEOUT, self.0.send(Message::Ping(Bytes::new()))).await??;
        Ok(())
    }
}

/// GET /ws: every daemon event as one JSON text frame.
pub(super) async fn ws_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let docker = state.docker.clone();
    let shutdown = state.shutdown.clone();
    ws.on_upgrade(move |socket| stream_events(socket, docker, shutdown))
}

async fn stream_events(
    socket: WebSocket,
    docker: Arc<DockerRepo>,
    shutdown: watch::Receiver<bool>,
) {
    tracing::info!("Client connected to event stream");
    let (tx, mut rx) = socket.split();
    let mut sink = WsSink(tx);

    // Inbound frames are ignored; the stream ending or a Close frame means the client left.
    let client_gone = async move {
        while let Some(msg) = rx.next().await {
            if matches!(msg, Ok(Message::Close(_)) | Err(_)) {
                break;
            }
        }
    };
    let cancel = async move {
        tokio::select! {
            _ = client_gone => {}
            _ = shutdown_requested(shutdown) => {}
        }
    };

    let events = docker.events(None, None);
    match relay_events(events, &mut sink, cancel, Some(WS_PING_INTERVAL)).await {
        RelayEnd::Cancelled => tracing::info!("Event stream closed by client or shutdown"),
        RelayEnd::DaemonError(e) => tracing::warn!("Docker events error: {}", e),
        RelayEnd::SinkFailed(e) => tracing::info!("WebSocket write error: {}", e),
        RelayEnd::StreamEnded => tracing::info!("Docker event stream ended"),
    }
    let _ = sink.0.close().await;
}
