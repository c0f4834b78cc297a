//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Request contract failures become 422 responses listing every
//! [`ValidationErrorRecord`]; everything on the server side of the contract
//! (response breaches, missing fragments, unreadable schemas) is a 500 whose
//! details go to the log, not to the client.

use apispec_contract::ContractError;
use apispec_core::ValidationErrorRecord;
use apispec_schema::SchemaError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Validation records, present only for request validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request breaks the action's contract (422).
    #[error("Request validation failed: {}", join(.0))]
    RequestValidation(Vec<ValidationErrorRecord>),

    /// The handler's response breaks the action's contract (500).
    #[error("response contract violation: {0}")]
    ResponseContract(String),

    /// A permitted-parameters lookup found no fragment (500).
    #[error("{0}")]
    MissingSchema(String),

    /// The request body could not be read or decoded (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::RequestValidation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::ResponseContract(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RESPONSE_CONTRACT_VIOLATION"),
            Self::MissingSchema(_) => (StatusCode::INTERNAL_SERVER_ERROR, "MISSING_SCHEMA"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "contract enforcement failed");
        }

        let (message, details) = match &self {
            Self::RequestValidation(errors) => (
                self.to_string(),
                serde_json::to_value(errors).ok(),
            ),
            Self::BadRequest(_) => (self.to_string(), None),
            Self::ResponseContract(_) => ("The response did not match its contract".to_string(), None),
            Self::MissingSchema(_) | Self::Internal(_) => ("An internal error occurred".to_string(), None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

fn join(errors: &[ValidationErrorRecord]) -> String {
    errors
        .iter()
        .map(|e| e.error.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<ContractError> for AppError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::RequestValidation { errors } => Self::RequestValidation(errors),
            ContractError::ResponseValidation { .. } => Self::ResponseContract(err.to_string()),
            ContractError::MissingSchema { .. } => Self::MissingSchema(err.to_string()),
            ContractError::Body(e) => Self::BadRequest(e.to_string()),
            ContractError::Schema(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        Self::Internal(err.to_string())
    }
}
