use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Error taxonomy surfaced to API clients.
///
/// Every variant maps to a stable machine-readable kind and an HTTP status;
/// the rendered body is `{"error": <kind>, "message": <human text>}`.
/// `Internal` deliberately hides its cause from the client; the full chain
/// only goes to the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Missing Authorization header")]
    MissingCredential,

    #[error("Authorization header must use the Bearer scheme")]
    MalformedCredential,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Farmer profile already exists")]
    ProfileExists,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    UpstreamTimeout(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Stable kind identifier, part of the response contract.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::DuplicateEmail => "duplicate_email",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::MissingCredential => "missing_credential",
            ApiError::MalformedCredential => "malformed_credential",
            ApiError::InvalidToken => "invalid_token",
            ApiError::UserNotFound => "user_not_found",
            ApiError::ProfileExists => "profile_exists",
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Upstream { .. } => "upstream_error",
            ApiError::UpstreamTimeout(_) => "upstream_timeout",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateEmail | ApiError::ProfileExists | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials
            | ApiError::MissingCredential
            | ApiError::MalformedCredential
            | ApiError::InvalidToken
            | ApiError::UserNotFound => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Internal(source) => error!(error = ?source, "request failed"),
                other => error!(error = %other, kind = other.kind(), "request failed"),
            }
        } else {
            debug!(error = %self, kind = self.kind(), "request rejected");
        }

        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
