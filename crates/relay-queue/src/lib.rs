//! Delivery pipeline for the pm2 relay.
//!
//! Two independent in-memory queues share one retrying-dispatch core:
//!
//! ```text
//! submit(line) ──▶ SendQueue ──▶ webhook POST ──▶ (on success, after TTL)
//!                                                      │
//!                              DeleteQueue ◀───────────┘
//!                                   │
//!                                   └──▶ webhook DELETE
//! ```
//!
//! Each queue is drained by a single worker task, so at most one delivery
//! attempt per queue is ever outstanding. A 429 response pauses the queue
//! for the delay the remote requested and puts the item back at the front;
//! a transport-level failure does the same with a fixed backoff. Queues are
//! best-effort: state is never persisted, and a restart drops whatever was
//! pending.

mod dedupe;
mod delete;
mod dispatch;
mod send;
mod transport;

pub use dedupe::DedupeState;
pub use delete::{DeleteJob, DeleteQueue, DeleteSink};
pub use dispatch::{DispatchOutcome, DispatchQueue, Dispatcher, QueueConfig};
pub use send::{
    DeletionSchedule, OutboundMessage, SendConfig, SendQueue, DEDUPE_WINDOW, MAX_BODY_LEN,
    TRUNCATION_MARKER,
};
pub use transport::WebhookTransport;

#[cfg(test)]
pub(crate) mod testutil;
