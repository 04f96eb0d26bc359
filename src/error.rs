use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upstream rate limited")]
    UpstreamRateLimited,

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the upstream call that produced this error is worth retrying.
    ///
    /// Rate limits, 5xx responses and network-level failures are retried;
    /// everything else fails immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::UpstreamRateLimited | AppError::UpstreamUnavailable(_) => true,
            AppError::Reqwest(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().map(|s| s.is_server_error() || s.as_u16() == 429).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Map an upstream HTTP status and body excerpt to an error.
    pub fn from_upstream_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = body.chars().take(200).collect::<String>();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            AppError::UpstreamRateLimited
        } else if status.is_server_error() {
            AppError::UpstreamUnavailable(format!("{}: {}", status, message))
        } else {
            AppError::UpstreamStatus {
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::UpstreamRateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::UpstreamUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::UpstreamStatus { status: 404, message } => {
                (StatusCode::NOT_FOUND, message.clone())
            }
            AppError::UpstreamStatus { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidParameter(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Cancelled => (StatusCode::REQUEST_TIMEOUT, self.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Reqwest(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AppError::SerdeJson(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
