// HTTP + WebSocket routes

mod http;
mod services;
mod static_files;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

use crate::docker_repo::DockerRepo;
use crate::host_repo::HostRepo;
use crate::systemd_repo::SystemdRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) docker: Arc<DockerRepo>,
    pub(crate) host: Arc<HostRepo>,
    pub(crate) systemd: Arc<SystemdRepo>,
    /// Flips to `true` once the server starts shutting down; ends open event relays.
    pub(crate) shutdown: watch::Receiver<bool>,
}

/// Router without a shutdown signal: event relays end only on their own.
pub fn app(docker: Arc<DockerRepo>, host: Arc<HostRepo>, systemd: Arc<SystemdRepo>) -> Router {
    let (_, shutdown) = watch::channel(false);
    app_with_shutdown(docker, host, systemd, shutdown)
}

/// Router whose long-lived event streams end when `shutdown` becomes `true`, so a graceful
/// shutdown does not wait on connected event clients.
pub fn app_with_shutdown(
    docker: Arc<DockerRepo>,
    host: Arc<HostRepo>,
    systemd: Arc<SystemdRepo>,
    shutdown: watch::Receiver<bool>,
) -> Router {
    let state = AppState {
        docker,
        host,
        systemd,
        shutdown,
    };
    Router::new()
        .route("/", get(static_files::index)) // GET /
        .route("/static/{*path}", get(static_files::asset)) // GET /static/*
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/info", get(http::info)) // GET /api/info
        .route("/api/containers", get(http::list_containers))
        .route("/api/containers/{id}", get(http::container_detail))
        .route("/api/containers/{id}/start", post(http::start_container))
        .route("/api/containers/{id}/stop", post(http::stop_container))
        .route("/api/containers/{id}/restart", post(http::restart_container))
        .route("/api/containers/{id}/logs", get(http::container_logs))
        .route("/api/images", get(http::list_images))
        .route("/api/networks", get(http::list_networks))
        .route("/api/volumes", get(http::list_volumes))
        .route("/api/system/stats", get(http::system_stats))
        .route("/api/system/host", get(http::host_snapshot))
        .route("/api/system/events", get(http::events)) // chunked NDJSON
        .route("/api/services", get(services::list))
        .route("/api/services/{name}", get(services::detail))
        .route("/api/services/{name}/logs", get(services::logs))
        .route("/api/services/{name}/{action}", post(services::control))
        .route("/ws", get(ws::ws_events)) // WS /ws
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Resolves once `true` is published. A dropped sender means no shutdown will ever be
/// signalled, so this then never resolves.
pub(crate) async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_resolves_after_signal() {
        let (tx, rx) = watch::channel(false);
        let wait = tokio::spawn(shutdown_requested(rx));
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), wait)
            .await
            .expect("shutdown not observed")
            .unwrap();
    }

    #[tokio::test]
    async fn shutdown_already_signalled_resolves_immediately() {
        let (_tx, rx) = watch::channel(true);
        tokio::time::timeout(Duration::from_secs(1), shutdown_requested(rx))
            .await
            .expect("shutdown not observed");
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_never_resolves() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let waited = tokio::time::timeout(Duration::from_secs(60), shutdown_requested(rx)).await;
        assert!(waited.is_err());
    }
}
