//! Error types for alert dispatch

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    /// Transport is not available or not configured
    #[error("Alert transport not available: {0}")]
    TransportNotAvailable(String),

    /// Dispatch to one or more recipients failed
    #[error("Alert dispatch failed: {0}")]
    DispatchFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for alert operations
pub type AlertResult<T> = Result<T, AlertError>;
