// Docker and host handlers

use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;

use super::{AppState, shutdown_requested};
use crate::error::ApiError;
use crate::models::ActionStatus;
use crate::relay::{ChannelSink, RelayEnd, relay_events};
use crate::version::{NAME, VERSION};

/// Buffered NDJSON lines between the relay task and the response body.
const EVENT_BODY_BUFFER: usize = 64;

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/info: daemon info, version, every list and disk usage in one document.
pub(super) async fn info(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(state.docker.info().await?).into_response())
}

pub(super) async fn list_containers(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(state.docker.list_containers().await?).into_response())
}

pub(super) async fn container_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(Json(state.docker.container_detail(&id).await?).into_response())
}

pub(super) async fn start_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionStatus>, ApiError> {
    state.docker.start_container(&id).await?;
    Ok(Json(ActionStatus::container("started")))
}

pub(super) async fn stop_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionStatus>, ApiError> {
    state.docker.stop_container(&id).await?;
    Ok(Json(ActionStatus::container("stopped")))
}

pub(super) async fn restart_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionStatus>, ApiError> {
    state.docker.restart_container(&id).await?;
    Ok(Json(ActionStatus::container("restarted")))
}

#[derive(Debug, Deserialize)]
pub(super) struct LogsQuery {
    tail: Option<String>,
}

/// GET /api/containers/{id}/logs?tail=N: plain text.
pub(super) async fn container_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<LogsQuery>,
) -> Result<String, ApiError> {
    Ok(state.docker.container_logs(&id, q.tail.as_deref()).await?)
}

pub(super) async fn list_images(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(state.docker.list_images().await?).into_response())
}

pub(super) async fn list_networks(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(state.docker.list_networks().await?).into_response())
}

pub(super) async fn list_volumes(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(state.docker.list_volumes().await?).into_response())
}

pub(super) async fn system_stats(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(state.docker.system_stats().await?).into_response())
}

pub(super) async fn host_snapshot(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(state.host.snapshot().await?).into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct EventsQuery {
    since: Option<String>,
    until: Option<String>,
}

/// GET /api/system/events: one JSON event per line until the client goes away, the daemon
/// reports an error, `until` is reached or the server shuts down. Headers are already sent by then, so a daemon
/// error just ends the body.
pub(super) async fn events(
    State(state): State<AppState>,
    Query(q): Query<EventsQuery>,
) -> Response {
    let (tx, rx) = mpsc::channel::<Bytes>(EVENT_BODY_BUFFER);
    let docker = state.docker.clone();
    let shutdown = state.shutdown.clone();

    tokio::spawn(async move {
        let watch = tx.clone();
        let mut sink = ChannelSink(tx);
        let cancel = async move {
            tokio::select! {
                _ = watch.closed() => {}
                _ = shutdown_requested(shutdown) => {}
            }
        };
        let stream = docker.events(q.since, q.until);
        match relay_events(stream, &mut sink, cancel, None).await {
            RelayEnd::Cancelled | RelayEnd::SinkFailed(_) => {
                tracing::debug!("Event stream closed by client or shutdown")
            }
            RelayEnd::DaemonError(e) => tracing::warn!("Event stream daemon error: {}", e),
            RelayEnd::StreamEnded => tracing::debug!("Event stream ended by daemon"),
        }
    });

    let body = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|chunk| (Ok::<_, std::convert::Infallible>(chunk), rx))
    });
    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(body),
    )
        .into_response()
}
