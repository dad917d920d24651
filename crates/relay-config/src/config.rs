//! Relay configuration.
//!
//! All settings are resolved once at startup and never re-read. The dedupe
//! window and message length cap are fixed constants of the delivery
//! pipeline, not configuration.

use crate::{ConfigError, ConfigResult};
use std::time::Duration;
use url::Url;

/// App filter value meaning "forward logs from every application".
pub const DEFAULT_APP_FILTER: &str = "*";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main relay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Webhook URL messages are posted to.
    pub webhook_url: Url,
    /// pm2 application name to follow, or `"*"` for all.
    pub app: String,
    /// Seconds a delivered message lives before deletion; 0 disables deletion.
    pub message_ttl_secs: u64,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Config {
    /// Validates and builds a configuration.
    ///
    /// Fails fast when the webhook URL is missing or unparseable.
    pub fn new(
        webhook_url: &str,
        app: impl Into<String>,
        message_ttl_secs: u64,
        log_level: impl Into<String>,
    ) -> ConfigResult<Self> {
        let webhook_url = webhook_url.trim();
        if webhook_url.is_empty() {
            return Err(ConfigError::MissingWebhookUrl);
        }
        let webhook_url = Url::parse(webhook_url)?;

        Ok(Self {
            webhook_url,
            app: app.into(),
            message_ttl_secs,
            log_level: log_level.into(),
        })
    }

    /// Whether the app filter matches every application.
    pub fn forwards_all_apps(&self) -> bool {
        self.app == DEFAULT_APP_FILTER || self.app.eq_ignore_ascii_case("all")
    }

    /// The message TTL as a duration, or None when deletion is disabled.
    pub fn message_ttl(&self) -> Option<Duration> {
        (self.message_ttl_secs > 0).then(|| Duration::from_secs(self.message_ttl_secs))
    }
}
