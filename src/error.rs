// Error types shared by the repos and the HTTP layer

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Docker Engine failure, classified by what went wrong. Display is the daemon's raw text.
#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error(transparent)]
    DaemonUnreachable(bollard::errors::Error),
    #[error(transparent)]
    NotFound(bollard::errors::Error),
    #[error(transparent)]
    InvalidState(bollard::errors::Error),
    #[error(transparent)]
    Api(bollard::errors::Error),
}

impl From<bollard::errors::Error> for DockerError {
    fn from(e: bollard::errors::Error) -> Self {
        use bollard::errors::Error as E;
        match &e {
            E::DockerResponseServerError {
                status_code: 404, ..
            } => DockerError::NotFound(e),
            E::DockerResponseServerError {
                status_code: 304 | 409,
                ..
            } => DockerError::InvalidState(e),
            E::IOError { .. } | E::SocketNotFoundError(_) | E::RequestTimeoutError => {
                DockerError::DaemonUnreachable(e)
            }
            _ => DockerError::Api(e),
        }
    }
}

/// Subprocess failure from the systemctl / journalctl shim.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("invalid unit name: {0:?}")]
    InvalidName(String),
}

/// Error returned by handlers; always rendered as 500 with the error text as body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Docker(#[from] DockerError),
    #[error("Failed to {context}: {source}")]
    Service {
        context: String,
        #[source]
        source: ServiceError,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn service(context: impl Into<String>, source: ServiceError) -> Self {
        ApiError::Service {
            context: context.into(),
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.to_string();
        tracing::warn!(error = %body, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
