use af_auth_core::AuthError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) status: &'static str,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) retry_after_seconds: Option<u64>,
}

/// HTTP-facing error. Auth failures map to stable client-visible messages;
/// backend faults are logged with detail and surfaced as an opaque 500.
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
    retry_after_seconds: Option<u64>,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after_seconds: None,
        }
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidWalletAddress => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid wallet address format")
            }
            AuthError::RateLimitExceeded { retry_after_secs } => Self {
                status: StatusCode::TOO_MANY_REQUESTS,
                message: "Too many login attempts, please try again later".to_owned(),
                retry_after_seconds: Some(retry_after_secs),
            },
            AuthError::InvalidCredentials => Self::unauthorized("Invalid signature or nonce"),
            AuthError::PrincipalNotFound => {
                Self::new(StatusCode::NOT_FOUND, "Account not found")
            }
            AuthError::AccountNotApproved => {
                Self::new(StatusCode::FORBIDDEN, "Account is not approved")
            }
            AuthError::AccountInactive => {
                Self::new(StatusCode::FORBIDDEN, "Account is deactivated")
            }
            AuthError::Store(err) => {
                error!("store error during auth: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AuthError::Repository(err) => {
                error!("repository error during auth: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AuthError::Token(err) => {
                error!("token error during auth: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: "error",
            message: self.message,
            retry_after_seconds: self.retry_after_seconds,
        };
        (self.status, Json(body)).into_response()
    }
}
