//! Stateless webhook transport.
//!
//! Provides `post message` and `delete message` against a single
//! Discord-compatible webhook endpoint and classifies every response into
//! one of: delivered, rate-limited (with a retry delay), not-found
//! (delete only), or rejected. Network-level failures where no response
//! was received surface as [`WebhookError::Http`].

mod client;
mod error;

pub use client::{
    DeleteOutcome, PostOutcome, WebhookClient, DEFAULT_RETRY_AFTER,
};
pub use error::{WebhookError, WebhookResult};
