//! Error types for the hubshell core.
//!
//! This module defines the centralized error type [`HubError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.
//!
//! Most failures inside the orchestration core are *not* errors in this sense:
//! stale responses, unknown views and unmeasurable cards are handled locally as
//! no-ops. `HubError` is reserved for configuration and I/O problems and for
//! events that reference things the application never registered.
//!
//! [`ServiceError`] is different: it is the structured failure returned by the
//! external data service and travels back to the core inside a response event.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for hubshell operations.
///
/// # Examples
///
/// ```
/// use hubshell::HubError;
///
/// fn validate_delay(ms: u64) -> Result<(), HubError> {
///     if ms == 0 {
///         return Err(HubError::Config("debounce_ms must be positive".to_string()));
///     }
///     Ok(())
/// }
/// # assert!(validate_delay(0).is_err());
/// ```
#[derive(Debug, Error)]
pub enum HubError {
    /// Configuration is invalid or missing.
    ///
    /// The string describes the specific configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Automatically converts from `std::io::Error` using the `#[from]` attribute.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A specialized `Result` type for hubshell operations.
pub type Result<T> = std::result::Result<T, HubError>;

/// Structured failure reported by the data service.
///
/// The core never retries; every variant ends up as a single transient toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceError {
    /// The request never produced a response (offline, timeout, DNS).
    #[error("network failure: {message}")]
    Network {
        /// Transport-level description.
        message: String,
    },

    /// The server rejected the payload.
    #[error("validation failed: {message}")]
    Validation {
        /// Server-provided description.
        message: String,
        /// Per-field details, if the server sent any.
        #[serde(default)]
        details: Vec<String>,
    },

    /// The server answered with `ok: false` or an unexpected body.
    #[error("rejected by server: {message}")]
    Rejected {
        /// Server-provided description.
        message: String,
    },
}
