// SPDX-License-Identifier: MIT

//! Application error types.
//!
//! Trigger handlers translate these into HTTP status codes themselves:
//! delivery-path failures are logged and swallowed, primary data-path
//! failures surface as 500 so the platform redelivers the event.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
