// --- File: crates/fantasma_common/src/error.rs ---
use axum::http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The error taxonomy shared by the availability and booking endpoints.
///
/// Every variant is terminal for the current request; nothing is retried
/// inside this layer.
#[derive(Error, Debug)]
pub enum FantasmaError {
    /// Malformed or missing client input, detected before any external call
    #[error("{0}")]
    InvalidInput(String),

    /// Syntactically valid input that falls outside the configured business hours
    #[error("{0}")]
    Validation(String),

    /// The slot was free when offered but is no longer free at commit time
    #[error("{0}")]
    Conflict(String),

    /// The external calendar fetch or write failed or timed out.
    /// Displays the client-facing message only; `service_name` is for logs.
    #[error("{message}")]
    ExternalService {
        service_name: String,
        message: String,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for FantasmaError {
    fn status_code(&self) -> u16 {
        match self {
            FantasmaError::InvalidInput(_) => 400,
            FantasmaError::Validation(_) => 400,
            FantasmaError::Conflict(_) => 409,
            FantasmaError::ExternalService { .. } => 502,
            FantasmaError::Internal(_) => 500,
        }
    }
}

/// Converts a `FantasmaError` into the `(StatusCode, String)` pair axum
/// handlers return on failure.
pub fn error_response(err: FantasmaError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

// Utility constructors
pub fn invalid_input<T: fmt::Display>(message: T) -> FantasmaError {
    FantasmaError::InvalidInput(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> FantasmaError {
    FantasmaError::Validation(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> FantasmaError {
    FantasmaError::Conflict(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> FantasmaError {
    FantasmaError::ExternalService {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> FantasmaError {
    FantasmaError::Internal(message.to_string())
}
