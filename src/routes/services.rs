// systemd service handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::error::ApiError;
use crate::models::{ActionStatus, ServiceAction, ServiceDetail, ServiceRecord};

pub(super) async fn list(State(state): State<AppState>) -> Result<Json<Vec<ServiceRecord>>, ApiError> {
    let services = state
        .systemd
        .list_services()
        .await
        .map_err(|e| ApiError::service("list services", e))?;
    Ok(Json(services))
}

pub(super) async fn detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceDetail>, ApiError> {
    let detail = state
        .systemd
        .service_detail(&name)
        .await
        .map_err(|e| ApiError::service("get service status", e))?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub(super) struct LogsQuery {
    lines: Option<String>,
    follow: Option<String>,
}

/// GET /api/services/{name}/logs?lines=N&follow=true: plain text.
pub(super) async fn logs(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(q): Query<LogsQuery>,
) -> Result<String, ApiError> {
    let follow = q.follow.as_deref() == Some("true");
    state
        .systemd
        .service_logs(&name, q.lines.as_deref(), follow)
        .await
        .map_err(|e| ApiError::service("get service logs", e))
}

/// POST /api/services/{name}/{start|stop|restart|enable|disable}
pub(super) async fn control(
    State(state): State<AppState>,
    Path((name, action)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let action: ServiceAction = match action.parse() {
        Ok(a) => a,
        Err(msg) => return Ok((StatusCode::NOT_FOUND, msg).into_response()),
    };
    state
        .systemd
        .control(&name, action)
        .await
        .map_err(|e| ApiError::service(format!("{} service", action.verb()), e))?;
    Ok(Json(ActionStatus::service(action)).into_response())
}
