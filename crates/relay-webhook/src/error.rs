//! Webhook transport error types.

use thiserror::Error;

/// Webhook transport error type.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Network or transport-level HTTP error from reqwest.
    ///
    /// Includes connection failures, timeouts, and TLS errors. No HTTP
    /// response was received from the remote service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;
