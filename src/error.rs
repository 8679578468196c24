use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::providers::ProviderError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("quota exceeded: {used}/{limit} used")]
    QuotaExceeded {
        used: i32,
        limit: i32,
        remaining: i32,
    },
    #[error("no active subscription")]
    NoSubscription,
    #[error("subscription expired")]
    SubscriptionExpired,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("upstream provider failure: {0}")]
    Upstream(#[from] ProviderError),
    #[error("write conflict")]
    Conflict,
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::Conflict,
            StoreError::Db(e) => AppError::Db(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(?self);
        match self {
            AppError::Validation(field) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "validation_failed", "detail": field })),
            )
                .into_response(),
            AppError::QuotaExceeded {
                used,
                limit,
                remaining,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "quota_exceeded",
                    "used": used,
                    "limit": limit,
                    "remaining": remaining,
                })),
            )
                .into_response(),
            AppError::NoSubscription => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "no_subscription" })),
            )
                .into_response(),
            AppError::SubscriptionExpired => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "subscription_expired" })),
            )
                .into_response(),
            // Provider error text stays in the logs.
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "generation_failed" })),
            )
                .into_response(),
            AppError::Conflict => (StatusCode::CONFLICT, "write conflict").into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not found").into_response(),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized").into_response(),
            AppError::Configuration(_) | AppError::Db(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
