use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures raised by the pure computation core. Everything else the
/// core can be handed (empty history, empty pools) is a normal result.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Admission denial. Not a failure, but a terminal state for the
    /// day; the message carries the next eligible instant.
    pub fn rate_limited(next_check_in: DateTime<Utc>) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: format!(
                "daily check-in limit reached, come back at {}",
                next_check_in.to_rfc3339()
            ),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(message) => Self::bad_request(message),
            CoreError::RemoteUnavailable(message) => Self::bad_gateway(message),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
