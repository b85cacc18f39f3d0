//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Handlers that cannot turn a failure into a
//! status banner return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store API call failed.
    #[error("Store API error: {0}")]
    Api(#[from] ApiError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // An undecodable API answer is a bug on one side or the other
        if matches!(self, Self::Api(ApiError::Decode(_))) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Api(ApiError::Server { status, .. }) if status.as_u16() == 404 => {
                StatusCode::NOT_FOUND
            }
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        // Don't expose decode details to clients
        let message = match &self {
            Self::Api(err) => err.user_message(),
            Self::NotFound(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        let decode = serde_json::from_str::<u8>("x").err().map(ApiError::Decode);
        assert_eq!(
            decode.map(|e| get_status(AppError::Api(e))),
            Some(StatusCode::BAD_GATEWAY)
        );
    }

    #[test]
    fn test_api_errors_map_to_gateway_statuses() {
        let missing = AppError::Api(ApiError::Server {
            status: reqwest::StatusCode::NOT_FOUND,
            message: Some("Produto não encontrado".to_string()),
        });
        assert_eq!(get_status(missing), StatusCode::NOT_FOUND);

        let failing = AppError::Api(ApiError::Server {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        });
        assert_eq!(get_status(failing), StatusCode::BAD_GATEWAY);
    }
}
