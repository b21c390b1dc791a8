use crate::upstream::UpstreamError;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown identity: {0}")]
    Credential(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("upstream returned malformed data: {0}")]
    UpstreamMalformed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Credential(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) | AppError::UpstreamMalformed(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unavailable(message) => AppError::UpstreamUnavailable(message),
            UpstreamError::Malformed(message) => AppError::UpstreamMalformed(message),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (self.status(), self.to_string()).into_response()
    }
}
