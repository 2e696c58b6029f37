//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers that fail outside the page
//! (broken markup, unknown routes) return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use vitrina_core::UnknownViewError;

use crate::api::ApiError;
use crate::controller::ControllerError;
use crate::surface::SurfaceError;

/// Application-level error type for the storefront shell.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store backend operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    /// Template rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// The page lacks an element the controller needs.
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UnknownViewError> for AppError {
    fn from(err: UnknownViewError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<ControllerError> for AppError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Api(e) => Self::Backend(e),
            ControllerError::Surface(e) => Self::Surface(e),
            ControllerError::Render(e) => Self::Render(e),
            ControllerError::UnknownView(e) => e.into(),
            ControllerError::InvalidForm(e) => Self::BadRequest(e.to_string()),
            ControllerError::Checkout(e) => Self::Internal(e.to_string()),
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Render(_) | Self::Surface(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Render(_)
                | Self::Surface(_)
                | Self::Session(_)
                | Self::Internal(_)
                | Self::Backend(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Render(_) | Self::Surface(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Backend(_) => "External service error".to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_view_is_not_found() {
        let err = AppError::from(UnknownViewError("ofertas".to_string()));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("ofertas"));
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let err = AppError::from(ControllerError::Surface(SurfaceError::MissingElement(
            "cart-badge",
        )));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");

        let err = AppError::Backend(ApiError::Rejected("secret detail".to_string()));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.contains("secret"));
    }
}
