//! Unified error handling for the admin app.
//!
//! Every error renders as the same JSON envelope the admin page reads:
//! `{"success": false, "error": ..., "message": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bulk_discount_core::{DiscountError, SelectionError};
use serde::Serialize;
use thiserror::Error;

/// Application-level error type for the admin app.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed validation. Nothing was sent to Shopify.
    #[error("{0}")]
    Validation(String),

    /// Session token missing or invalid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DiscountError> for AppError {
    fn from(err: DiscountError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// JSON body of error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let (error, message) = match self {
            Self::Validation(text) => (text.clone(), text),
            Self::Unauthorized(reason) => ("Unauthorized".to_string(), reason),
            Self::Internal(_) => {
                let text = "Internal server error".to_string();
                (text.clone(), text)
            }
        };

        let body = ErrorBody {
            success: false,
            error,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from the shop and staff user of a session.
pub fn set_sentry_user(shop: &str, user_id: Option<&str>) {
    let shop = shop.to_string();
    let id = user_id.map(String::from);
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id,
            username: Some(shop),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Validation("Name cant be empty".to_string());
        assert_eq!(err.to_string(), "Name cant be empty");

        let err = AppError::Unauthorized("missing token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: missing token");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_error_envelope() {
        let response = AppError::from(DiscountError::OutOfRange).into_response();
        let body = body_json(response).await;

        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Discount must be between 0 and 100");
        assert_eq!(body["message"], "Discount must be between 0 and 100");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = AppError::Internal("pool exhausted".to_string()).into_response();
        let body = body_json(response).await;

        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_unauthorized_envelope() {
        let response = AppError::Unauthorized("Session token expired".to_string()).into_response();
        let body = body_json(response).await;

        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "Session token expired");
    }

    #[test]
    fn test_selection_error_maps_to_validation() {
        let err = AppError::from(SelectionError::NoTags);
        assert!(matches!(err, AppError::Validation(ref m) if m == "Please enter at least one tag"));
    }
}
