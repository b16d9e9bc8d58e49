//! Error handling module
//!
//! Centralized HTTP response conversion. The ledger and store taxonomies
//! stay transport-agnostic; this is the only place that knows about
//! status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::config::ConfigError;
use crate::domain::{AmountError, CurrencyError};
use crate::ledger::LedgerError;
use crate::password::PasswordError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Core taxonomies
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl From<AmountError> for AppError {
    fn from(err: AmountError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            AppError::Ledger(ledger_err) => match ledger_err {
                LedgerError::InvalidArgument(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_argument", Some(msg.clone()))
                }
                LedgerError::InsufficientFunds { .. } => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_funds",
                    Some(ledger_err.to_string()),
                ),

                // 404 Not Found
                LedgerError::AccountNotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    "account_not_found",
                    Some(ledger_err.to_string()),
                ),
                LedgerError::NotFound => (StatusCode::NOT_FOUND, "not_found", None),

                // 409 Conflict
                LedgerError::AlreadyExists => (StatusCode::CONFLICT, "already_exists", None),
                LedgerError::RetriesExhausted { .. } => (
                    StatusCode::CONFLICT,
                    "retries_exhausted",
                    Some(ledger_err.to_string()),
                ),
                LedgerError::TransientConflict => (StatusCode::CONFLICT, "conflict", None),

                // 500 Internal Server Error
                LedgerError::Storage(e) => {
                    tracing::error!("Storage error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
                }
            },

            AppError::Store(store_err) => match store_err {
                StoreError::NotFound => (StatusCode::NOT_FOUND, "not_found", None),
                StoreError::AlreadyExists => (StatusCode::CONFLICT, "already_exists", None),
                StoreError::TransientConflict => (StatusCode::CONFLICT, "conflict", None),
                StoreError::Storage(e) => {
                    tracing::error!("Storage error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
                }
            },

            // 500 Internal Server Error
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
