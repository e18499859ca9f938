use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for the Keys Pay platform
#[derive(Debug, thiserror::Error)]
pub enum KeysPayError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Wire shape for platform error responses: `{"code": ..., "message": ...}`.
#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl KeysPayError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) | Self::Anyhow(_) => "INTERNAL",
        }
    }

    /// Returns the message exposed to clients.
    ///
    /// Client errors (4xx) carry their actual message — the caller needs it
    /// to correct the request. Server errors (5xx) return a generic message;
    /// details stay in the server logs.
    fn client_message(&self) -> String {
        match self {
            Self::Unauthenticated(msg) | Self::Forbidden(msg) | Self::BadRequest(msg) => {
                msg.clone()
            }
            Self::Internal(_) | Self::Anyhow(_) => "internal error".to_string(),
        }
    }
}

impl IntoResponse for KeysPayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(ErrorBody {
            code: self.code(),
            message: self.client_message(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for Keys Pay handlers
pub type Result<T> = std::result::Result<T, KeysPayError>;

impl From<serde_json::Error> for KeysPayError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            KeysPayError::BadRequest(format!("JSON error: {}", err))
        } else {
            KeysPayError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}
