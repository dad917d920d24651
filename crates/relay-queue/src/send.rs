//! Outbound log-line queue.
//!
//! Lines are filtered and shaped at submission time (empty lines dropped,
//! duplicate bursts suppressed, oversized bodies truncated) and then
//! delivered one at a time through the shared dispatch core. A delivered
//! message whose response carried an id can be scheduled for deletion
//! after a configured TTL.

use crate::dedupe::DedupeState;
use crate::delete::DeleteSink;
use crate::dispatch::{DispatchOutcome, DispatchQueue, Dispatcher, QueueConfig};
use crate::transport::WebhookTransport;
use relay_webhook::PostOutcome;
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, warn};

/// How long an identical line suppresses re-sends.
pub const DEDUPE_WINDOW: Duration = Duration::from_millis(2_000);

/// Maximum body length in characters before truncation.
pub const MAX_BODY_LEN: usize = 1_900;

/// Appended to a truncated body.
pub const TRUNCATION_MARKER: &str = "…";

/// A log line accepted for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub body: String,
}

/// Tuning for the send queue.
#[derive(Debug, Clone)]
pub struct SendConfig {
    pub queue: QueueConfig,
    /// Window within which an identical line is suppressed.
    pub dedupe_window: Duration,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            dedupe_window: DEDUPE_WINDOW,
        }
    }
}

/// Where and when delivered messages get deleted.
#[derive(Clone)]
pub struct DeletionSchedule {
    pub sink: Arc<dyn DeleteSink>,
    /// Delay between successful delivery and the deletion request.
    pub ttl: Duration,
}

/// Ordered queue of log lines headed for the webhook.
pub struct SendQueue {
    inner: Arc<DispatchQueue<OutboundMessage>>,
    dedupe: Arc<Mutex<DedupeState>>,
    dedupe_window: Duration,
}

impl SendQueue {
    /// Build the queue and spawn its worker.
    ///
    /// With a [`DeletionSchedule`], every delivery whose response carried a
    /// message id is queued for deletion once the TTL elapses.
    pub fn start<T: WebhookTransport>(
        config: SendConfig,
        transport: Arc<T>,
        deletion: Option<DeletionSchedule>,
    ) -> Arc<Self> {
        let inner = DispatchQueue::new(config.queue);
        let dedupe = Arc::new(Mutex::new(DedupeState::new()));
        inner.start(SendDispatcher {
            transport,
            dedupe: Arc::clone(&dedupe),
            deletion,
        });
        Arc::new(Self {
            inner,
            dedupe,
            dedupe_window: config.dedupe_window,
        })
    }

    /// Accept a raw log line.
    ///
    /// Whitespace-only lines are dropped. A line identical to the last
    /// successfully delivered body is dropped while the dedupe window is
    /// open. Oversized lines are truncated to [`MAX_BODY_LEN`] characters
    /// plus the marker.
    pub fn submit(&self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        let body = truncate_body(trimmed);
        {
            let dedupe = self.dedupe.lock().expect("lock poisoned");
            if dedupe.is_duplicate(&body, Instant::now(), self.dedupe_window) {
                debug!("suppressing duplicate line");
                return;
            }
        }
        self.inner.submit(OutboundMessage { body });
    }

    /// Number of lines waiting for an attempt.
    pub fn pending_count(&self) -> usize {
        self.inner.pending_count()
    }

    /// Whether a delivery attempt is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.inner.is_in_flight()
    }
}

/// Truncates to [`MAX_BODY_LEN`] characters and appends the marker.
/// Character-based so a multi-byte boundary can never split.
fn truncate_body(text: &str) -> String {
    if text.chars().count() <= MAX_BODY_LEN {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_BODY_LEN).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

struct SendDispatcher<T> {
    transport: Arc<T>,
    dedupe: Arc<Mutex<DedupeState>>,
    deletion: Option<DeletionSchedule>,
}

impl<T: WebhookTransport> Dispatcher<OutboundMessage> for SendDispatcher<T> {
    async fn dispatch(&self, message: &OutboundMessage) -> DispatchOutcome {
        match self.transport.post(&message.body).await {
            Ok(PostOutcome::Delivered { message_id }) => {
                self.dedupe
                    .lock()
                    .expect("lock poisoned")
                    .record(&message.body, Instant::now());
                if let (Some(schedule), Some(id)) = (&self.deletion, message_id) {
                    schedule_deletion(schedule.clone(), id);
                }
                DispatchOutcome::Completed
            }
            Ok(PostOutcome::RateLimited { retry_after }) => {
                debug!(
                    delay_ms = retry_after.as_millis() as u64,
                    "send rate limited, pausing queue"
                );
                DispatchOutcome::RateLimited { retry_after }
            }
            Ok(PostOutcome::Rejected { status }) => {
                warn!(status, "message rejected, dropping");
                DispatchOutcome::Dropped
            }
            Err(err) => {
                warn!(error = %err, "post failed, will retry");
                DispatchOutcome::Retry
            }
        }
    }
}

/// Spawns the TTL timer for one delivered message.
fn schedule_deletion(schedule: DeletionSchedule, message_id: String) {
    tokio::spawn(async move {
        sleep(schedule.ttl).await;
        schedule.sink.submit_delete(message_id);
    });
}
