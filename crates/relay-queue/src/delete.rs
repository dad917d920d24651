//! Time-delayed deletion queue.

use crate::dispatch::{DispatchOutcome, DispatchQueue, Dispatcher, QueueConfig};
use crate::transport::WebhookTransport;
use relay_webhook::DeleteOutcome;
use std::sync::Arc;
use tracing::{debug, warn};

/// A queued deletion of a previously delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteJob {
    /// Opaque identifier returned by the creation response.
    pub message_id: String,
}

/// Accepts deletion jobs.
///
/// Object-safe so the send side can hold the delete queue without caring
/// about its transport type.
pub trait DeleteSink: Send + Sync {
    /// Queue a message id for deletion.
    fn submit_delete(&self, message_id: String);
}

/// Queue of message ids awaiting deletion.
///
/// Same in-flight/pause discipline as the send queue. A 404 counts as
/// success (the message is already gone); any other failure status is
/// logged and dropped rather than retried forever.
pub struct DeleteQueue {
    inner: Arc<DispatchQueue<DeleteJob>>,
}

impl DeleteQueue {
    /// Build the queue and spawn its worker.
    pub fn start<T: WebhookTransport>(config: QueueConfig, transport: Arc<T>) -> Arc<Self> {
        let inner = DispatchQueue::new(config);
        inner.start(DeleteDispatcher { transport });
        Arc::new(Self { inner })
    }

    /// Queue a message id for deletion.
    pub fn submit(&self, message_id: impl Into<String>) {
        let message_id = message_id.into();
        debug!(message_id = %message_id, "queueing message deletion");
        self.inner.submit(DeleteJob { message_id });
    }

    /// Number of deletions waiting for an attempt.
    pub fn pending_count(&self) -> usize {
        self.inner.pending_count()
    }

    /// Whether a deletion attempt is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.inner.is_in_flight()
    }
}

impl DeleteSink for DeleteQueue {
    fn submit_delete(&self, message_id: String) {
        self.submit(message_id);
    }
}

struct DeleteDispatcher<T> {
    transport: Arc<T>,
}

impl<T: WebhookTransport> Dispatcher<DeleteJob> for DeleteDispatcher<T> {
    async fn dispatch(&self, job: &DeleteJob) -> DispatchOutcome {
        match self.transport.delete(&job.message_id).await {
            Ok(DeleteOutcome::Deleted) | Ok(DeleteOutcome::NotFound) => DispatchOutcome::Completed,
            Ok(DeleteOutcome::RateLimited { retry_after }) => {
                debug!(
                    message_id = %job.message_id,
                    delay_ms = retry_after.as_millis() as u64,
                    "delete rate limited, pausing queue"
                );
                DispatchOutcome::RateLimited { retry_after }
            }
            Ok(DeleteOutcome::Rejected { status }) => {
                warn!(message_id = %job.message_id, status, "delete rejected, dropping");
                DispatchOutcome::Dropped
            }
            Err(err) => {
                warn!(message_id = %job.message_id, error = %err, "delete failed, will retry");
                DispatchOutcome::Retry
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{settle, FakeTransport, ScriptedDelete};
    use tokio::time::{advance, Duration};

    #[tokio::test(start_paused = true)]
    async fn successful_delete_completes_job() {
        let transport = Arc::new(FakeTransport::new());
        transport.script_delete(ScriptedDelete::Ok(DeleteOutcome::Deleted));
        let queue = DeleteQueue::start(QueueConfig::default(), Arc::clone(&transport));

        queue.submit("42");
        settle().await;

        assert_eq!(transport.deletes(), vec!["42"]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_is_treated_as_success() {
        let transport = Arc::new(FakeTransport::new());
        transport.script_delete(ScriptedDelete::Ok(DeleteOutcome::NotFound));
        transport.script_delete(ScriptedDelete::Ok(DeleteOutcome::Deleted));
        let queue = DeleteQueue::start(QueueConfig::default(), Arc::clone(&transport));

        queue.submit("gone");
        queue.submit("present");
        settle().await;

        // The 404 job is discarded without a retry and the queue moves on.
        assert_eq!(transport.deletes(), vec!["gone", "present"]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_delete_is_retried_after_pause() {
        let transport = Arc::new(FakeTransport::new());
        transport.script_delete(ScriptedDelete::Ok(DeleteOutcome::RateLimited {
            retry_after: Duration::from_millis(300),
        }));
        transport.script_delete(ScriptedDelete::Ok(DeleteOutcome::Deleted));
        let queue = DeleteQueue::start(QueueConfig::default(), Arc::clone(&transport));

        queue.submit("42");
        settle().await;
        assert_eq!(transport.deletes(), vec!["42"]);

        advance(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(transport.deletes(), vec!["42"]);

        advance(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(transport.deletes(), vec!["42", "42"]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_delete_is_dropped() {
        let transport = Arc::new(FakeTransport::new());
        transport.script_delete(ScriptedDelete::Ok(DeleteOutcome::Rejected { status: 500 }));
        transport.script_delete(ScriptedDelete::Ok(DeleteOutcome::Deleted));
        let queue = DeleteQueue::start(QueueConfig::default(), Arc::clone(&transport));

        queue.submit("bad");
        queue.submit("good");
        settle().await;

        assert_eq!(transport.deletes(), vec!["bad", "good"]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn network_failure_requeues_at_front() {
        let transport = Arc::new(FakeTransport::new());
        transport.script_delete(ScriptedDelete::NetworkError);
        transport.script_delete(ScriptedDelete::Ok(DeleteOutcome::Deleted));
        let queue = DeleteQueue::start(QueueConfig::default(), Arc::clone(&transport));

        queue.submit("42");
        settle().await;
        assert_eq!(transport.deletes(), vec!["42"]);
        assert_eq!(queue.pending_count(), 1);

        advance(Duration::from_millis(1_100)).await;
        settle().await;
        assert_eq!(transport.deletes(), vec!["42", "42"]);
        assert_eq!(queue.pending_count(), 0);
    }
}
