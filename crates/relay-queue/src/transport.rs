//! Seam between the queues and the HTTP layer.

use relay_webhook::{DeleteOutcome, PostOutcome, WebhookClient, WebhookResult};
use std::future::Future;

/// Webhook operations used by the delivery pipeline.
///
/// Implemented by [`WebhookClient`]; tests substitute recording fakes.
pub trait WebhookTransport: Send + Sync + 'static {
    /// Post a message body.
    fn post(&self, body: &str) -> impl Future<Output = WebhookResult<PostOutcome>> + Send;

    /// Delete a previously posted message by id.
    fn delete(&self, message_id: &str)
        -> impl Future<Output = WebhookResult<DeleteOutcome>> + Send;
}

impl WebhookTransport for WebhookClient {
    fn post(&self, body: &str) -> impl Future<Output = WebhookResult<PostOutcome>> + Send {
        WebhookClient::post(self, body)
    }

    fn delete(
        &self,
        message_id: &str,
    ) -> impl Future<Output = WebhookResult<DeleteOutcome>> + Send {
        WebhookClient::delete(self, message_id)
    }
}
