//! Suppression of identical lines bursting from the source.

use tokio::time::{Duration, Instant};

/// Tracks the most recently delivered body for duplicate suppression.
///
/// Only the single last successfully sent message is retained; two
/// identical lines separated by a different one are both sent.
#[derive(Debug, Default)]
pub struct DedupeState {
    last_text: Option<String>,
    last_sent_at: Option<Instant>,
}

impl DedupeState {
    /// Create an empty state; nothing is suppressed until a delivery is
    /// recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `text` matches the last sent body and the delivery was
    /// less than `window` ago.
    pub fn is_duplicate(&self, text: &str, now: Instant, window: Duration) -> bool {
        match (&self.last_text, self.last_sent_at) {
            (Some(last), Some(sent_at)) => {
                last == text && now.duration_since(sent_at) < window
            }
            _ => false,
        }
    }

    /// Record a successfully delivered body.
    pub fn record(&mut self, text: &str, now: Instant) {
        self.last_text = Some(text.to_string());
        self.last_sent_at = Some(now);
    }
}
