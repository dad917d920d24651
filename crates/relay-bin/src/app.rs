//! Wires the log source to the delivery pipeline.

use anyhow::Result;
use pm2_log_source::{LogEvent, LogSource, LogSourceConfig};
use relay_config::Config;
use relay_queue::{DeleteQueue, DeleteSink, DeletionSchedule, QueueConfig, SendConfig, SendQueue};
use relay_webhook::WebhookClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the relay until the pm2 process exits.
///
/// Returns the exit code to propagate; a pm2 exit without a code (killed
/// by signal) maps to 1. Pending queue items are dropped on shutdown.
pub async fn run(config: Config) -> Result<i32> {
    let transport = Arc::new(WebhookClient::new(config.webhook_url.as_str()));

    let deletion = config.message_ttl().map(|ttl| {
        let deletes = DeleteQueue::start(QueueConfig::default(), Arc::clone(&transport));
        info!(ttl_secs = ttl.as_secs(), "message deletion enabled");
        let sink: Arc<dyn DeleteSink> = deletes;
        DeletionSchedule { sink, ttl }
    });
    let sends = SendQueue::start(SendConfig::default(), Arc::clone(&transport), deletion);

    let source_config = if config.forwards_all_apps() {
        LogSourceConfig::all()
    } else {
        LogSourceConfig::new(config.app.clone())
    };
    let mut source = LogSource::spawn(&source_config)?;

    info!(app = %config.app, "relay started");

    while let Some(event) = source.recv().await {
        match event {
            LogEvent::Line(line) => sends.submit(&line),
            LogEvent::Exited { code } => {
                let code = code.unwrap_or(1);
                warn!(code, "pm2 exited, shutting down");
                return Ok(code);
            }
        }
    }

    // The channel closed without an exit event; treat it as a failure.
    warn!("log stream ended unexpectedly");
    Ok(1)
}
