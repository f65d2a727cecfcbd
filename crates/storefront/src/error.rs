//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures unexpected errors to Sentry
//! before responding to the client. Services and route handlers return
//! `Result<T, AppError>`; the error becomes a failure envelope with a stable
//! `error` code and a matching HTTP status.

use std::fmt;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use mercato_core::{ProductId, TransitionError};

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::models::order::ReservationError;
use crate::response::ApiResponse;
use crate::services::assets::AssetError;

/// Kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Store,
    Product,
    CartEntry,
    Order,
    Review,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "User",
            Self::Store => "Store",
            Self::Product => "Product",
            Self::CartEntry => "Cart item",
            Self::Order => "Order",
            Self::Review => "Review",
        })
    }
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// No authenticated caller.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(Entity),

    /// Caller's role or store doesn't permit the operation.
    #[error("Access denied")]
    AccessDenied,

    /// A required request field was absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A request field was malformed.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Order status can no longer change.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// A checkout referenced products that don't all exist.
    #[error("Product not found")]
    ProductNotFound,

    /// A checkout asked for more units than are in stock.
    #[error("Product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The request conflicts with stored state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Asset host operation failed.
    #[error("Asset host error: {0}")]
    Asset(#[from] AssetError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(RepositoryError::Database(err))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(field) => Self::MissingField(field),
            ValidationError::InvalidField { field, reason } => Self::InvalidField { field, reason },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidField {
            field: "body",
            reason: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidField {
            field: "path",
            reason: rejection.body_text(),
        }
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::ProductNotFound => Self::ProductNotFound,
            ReservationError::OutOfStock(id) => Self::OutOfStock(id),
        }
    }
}

impl AppError {
    /// Stable machine-readable code for the response envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::NotFound(_) => "not_found",
            Self::AccessDenied => "access_denied",
            Self::MissingField(_) => "missing_field",
            Self::InvalidField { .. } => "invalid_field",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::ProductNotFound => "product_not_found",
            Self::OutOfStock(_) => "out_of_stock",
            Self::Conflict(_) => "conflict",
            Self::Database(_) | Self::Asset(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) | Self::ProductNotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::MissingField(_) | Self::InvalidField { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidTransition(_) | Self::OutOfStock(_) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Asset(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is an unexpected failure rather than a domain outcome.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Asset(_) | Self::Internal(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture unexpected failures to Sentry
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ApiResponse::<()>::failure(self.code(), message);
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this once the caller's session identity is known so errors are
/// associated with the user.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        assert_eq!(AppError::NotFound(Entity::Order).to_string(), "Order not found");
        assert_eq!(
            AppError::InvalidTransition(TransitionError::AlreadyCancelled).to_string(),
            "Order already cancelled"
        );
        assert_eq!(
            AppError::MissingField("amount").to_string(),
            "Missing required field: amount"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::NotAuthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::AccessDenied), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::NotFound(Entity::Review)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::MissingField("item")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::OutOfStock(ProductId::new(1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_keep_their_field() {
        let err: AppError = ValidationError::MissingField("shippingAddress").into();
        assert_eq!(err.code(), "missing_field");
        assert!(err.to_string().contains("shippingAddress"));
    }

    #[test]
    fn test_reservation_errors_map_to_codes() {
        let err: AppError = ReservationError::ProductNotFound.into();
        assert_eq!(err.code(), "product_not_found");

        let err: AppError = ReservationError::OutOfStock(ProductId::new(4)).into();
        assert_eq!(err.code(), "out_of_stock");
    }

    #[test]
    fn test_repository_conflict_is_not_internal() {
        let err: AppError = RepositoryError::Conflict("product has been ordered".to_string()).into();
        assert!(!err.is_internal());
        assert_eq!(err.code(), "conflict");

        let err: AppError = RepositoryError::NotFound.into();
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let response = AppError::Internal("pool exhausted at 10.0.0.3".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "Internal server error");
    }
}
