//! Error types for relay configuration.

use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No webhook URL was provided.
    #[error("webhook URL is required (set --webhook-url or PM2_RELAY_WEBHOOK_URL)")]
    MissingWebhookUrl,

    /// The webhook URL could not be parsed.
    #[error("invalid webhook URL: {0}")]
    InvalidWebhookUrl(#[from] url::ParseError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
