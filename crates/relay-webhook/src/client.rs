//! Webhook client for posting and deleting messages.

use crate::WebhookResult;
use reqwest::{header, Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Fallback pause when a 429 response carries no usable retry delay.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_millis(1_000);

/// JSON payload for message creation.
#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    content: &'a str,
}

/// Classified result of a message post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// 2xx. The response body may carry an `id` usable for later deletion.
    Delivered { message_id: Option<String> },
    /// 429. The remote asked us to pause before retrying.
    RateLimited { retry_after: Duration },
    /// Any other status. The message should not be retried.
    Rejected { status: u16 },
}

/// Classified result of a message deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 2xx.
    Deleted,
    /// 404. The message is already gone.
    NotFound,
    /// 429. The remote asked us to pause before retrying.
    RateLimited { retry_after: Duration },
    /// Any other status. The deletion should not be retried.
    Rejected { status: u16 },
}

/// HTTP client bound to a single webhook endpoint.
///
/// Cheap to clone; both queues may call it concurrently.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    webhook_url: String,
}

impl WebhookClient {
    /// Create a client for the given webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        let webhook_url = webhook_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    /// Post a message body, wrapped in a fenced code block.
    pub async fn post(&self, body: &str) -> WebhookResult<PostOutcome> {
        let content = code_block(body);
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&MessagePayload { content: &content })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let message_id = response
                .json::<Value>()
                .await
                .ok()
                .as_ref()
                .and_then(message_id_from);
            debug!(message_id = ?message_id, "message posted");
            return Ok(PostOutcome::Delivered { message_id });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = rate_limit_delay(response).await;
            return Ok(PostOutcome::RateLimited { retry_after });
        }
        Ok(PostOutcome::Rejected {
            status: status.as_u16(),
        })
    }

    /// Delete a previously posted message by id.
    pub async fn delete(&self, message_id: &str) -> WebhookResult<DeleteOutcome> {
        let url = format!("{}/messages/{}", self.webhook_url, message_id);
        let response = self.client.delete(&url).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(message_id, "message deleted");
            return Ok(DeleteOutcome::Deleted);
        }
        match status {
            StatusCode::NOT_FOUND => Ok(DeleteOutcome::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Ok(DeleteOutcome::RateLimited {
                retry_after: rate_limit_delay(response).await,
            }),
            _ => Ok(DeleteOutcome::Rejected {
                status: status.as_u16(),
            }),
        }
    }
}

/// Wraps a body in the fixed ```log fenced code block.
fn code_block(body: &str) -> String {
    format!("```log\n{body}\n```")
}

/// Extracts the message id from a creation response body.
///
/// The remote returns `id` as either a string or a number.
fn message_id_from(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts the retry delay from a 429 response.
async fn rate_limit_delay(response: Response) -> Duration {
    let header_secs = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.json::<Value>().await.ok();
    retry_after_delay(body.as_ref(), header_secs)
}

/// Computes the pause requested by a 429 response.
///
/// The JSON `retry_after` field is applied as milliseconds while the
/// `Retry-After` header is seconds. Malformed bodies fall through to the
/// header, then to [`DEFAULT_RETRY_AFTER`].
fn retry_after_delay(body: Option<&Value>, header_secs: Option<u64>) -> Duration {
    let body_value = body
        .and_then(|v| v.get("retry_after"))
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)));
    if let Some(ms) = body_value {
        return Duration::from_millis(ms);
    }
    if let Some(secs) = header_secs {
        return Duration::from_secs(secs);
    }
    DEFAULT_RETRY_AFTER
}
