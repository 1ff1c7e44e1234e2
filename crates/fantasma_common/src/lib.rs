// --- File: crates/fantasma_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // Shared HTTP client
pub mod logging; // Logging utilities
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    conflict, error_response, external_service_error, internal_error, invalid_input,
    validation_error, FantasmaError, HttpStatusCode,
};

// Re-export the shared HTTP client
pub use http::{create_client, HTTP_CLIENT};

// Re-export feature flag handling utilities
pub use features::{is_feature_enabled, is_gcal_enabled, is_notify_enabled};
