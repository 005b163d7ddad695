//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crispy_core::QuestError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Wrong QR code. Find the exhibit for the current riddle.")]
    QuestOrder {
        expected_order: i32,
        scanned_order: i32,
    },

    #[error("Score too low for any promo")]
    PromoIneligible,

    #[error("No promo codes available. Please try again later.")]
    PromoExhausted,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::QuestOrder { .. } => StatusCode::BAD_REQUEST,
            ApiError::PromoIneligible => StatusCode::BAD_REQUEST,
            // Exhaustion is transient: the operator can top the pool up.
            ApiError::PromoExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // The ordering rejection carries both positions so the client can
        // redirect the player to the expected exhibit.
        if let ApiError::QuestOrder {
            expected_order,
            scanned_order,
        } = &self
        {
            let body = Json(json!({
                "error": self.to_string(),
                "is_correct": false,
                "expected_order": expected_order,
                "scanned_order": scanned_order,
            }));
            return (status, body).into_response();
        }

        let error_type = match &self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::RateLimited => "rate_limited",
            ApiError::QuestOrder { .. } => unreachable!(),
            ApiError::PromoIneligible => "promo_ineligible",
            ApiError::PromoExhausted => "promo_exhausted",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<QuestError> for ApiError {
    fn from(err: QuestError) -> Self {
        match err {
            QuestError::UnknownPage => ApiError::BadRequest("Invalid QR code".to_string()),
            QuestError::AlreadyAnswered { slug } => {
                ApiError::Conflict(format!("Page {} already scanned", slug))
            }
            QuestError::QuestComplete => {
                ApiError::Conflict("Quest already completed".to_string())
            }
            QuestError::OutOfOrder {
                expected_order,
                scanned_order,
            } => ApiError::QuestOrder {
                expected_order,
                scanned_order,
            },
        }
    }
}

/// True when the error is a unique-constraint violation, so a concurrent
/// duplicate insert can be surfaced as a conflict instead of a 500.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
