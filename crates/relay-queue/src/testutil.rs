//! Shared fakes for queue tests.

use crate::transport::WebhookTransport;
use crate::DeleteSink;
use relay_webhook::{DeleteOutcome, PostOutcome, WebhookError, WebhookResult};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// Drives every ready task to completion without advancing the paused
/// clock. Each queued item costs a handful of worker suspension points,
/// so the yield budget sits well above what the largest burst test needs.
pub(crate) async fn settle() {
    for _ in 0..256 {
        tokio::task::yield_now().await;
    }
}

/// Produces a real transport-level error without touching the network;
/// a scheme-only URL fails inside the client before any connection.
pub(crate) async fn network_error() -> WebhookError {
    reqwest::Client::new()
        .get("http://")
        .send()
        .await
        .expect_err("scheme-only URL must not resolve")
        .into()
}

pub(crate) enum ScriptedPost {
    Ok(PostOutcome),
    NetworkError,
}

pub(crate) enum ScriptedDelete {
    Ok(DeleteOutcome),
    NetworkError,
}

/// Transport fake that replays scripted outcomes and records every call.
///
/// An exhausted script answers with plain success so tests only spell out
/// the interesting prefix.
pub(crate) struct FakeTransport {
    post_script: Mutex<VecDeque<ScriptedPost>>,
    delete_script: Mutex<VecDeque<ScriptedDelete>>,
    post_log: Mutex<Vec<(String, Instant)>>,
    delete_log: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            post_script: Mutex::new(VecDeque::new()),
            delete_script: Mutex::new(VecDeque::new()),
            post_log: Mutex::new(Vec::new()),
            delete_log: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn script_post(&self, outcome: ScriptedPost) {
        self.post_script
            .lock()
            .expect("lock poisoned")
            .push_back(outcome);
    }

    pub(crate) fn script_delete(&self, outcome: ScriptedDelete) {
        self.delete_script
            .lock()
            .expect("lock poisoned")
            .push_back(outcome);
    }

    /// Bodies of every post attempt, in order.
    pub(crate) fn posts(&self) -> Vec<String> {
        self.post_log
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|(body, _)| body.clone())
            .collect()
    }

    /// Paused-clock timestamps of every post attempt.
    pub(crate) fn post_times(&self) -> Vec<Instant> {
        self.post_log
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    /// Message ids of every delete attempt, in order.
    pub(crate) fn deletes(&self) -> Vec<String> {
        self.delete_log.lock().expect("lock poisoned").clone()
    }
}

impl WebhookTransport for FakeTransport {
    async fn post(&self, body: &str) -> WebhookResult<PostOutcome> {
        self.post_log
            .lock()
            .expect("lock poisoned")
            .push((body.to_string(), Instant::now()));
        let scripted = self.post_script.lock().expect("lock poisoned").pop_front();
        match scripted {
            Some(ScriptedPost::Ok(outcome)) => Ok(outcome),
            Some(ScriptedPost::NetworkError) => Err(network_error().await),
            None => Ok(PostOutcome::Delivered { message_id: None }),
        }
    }

    async fn delete(&self, message_id: &str) -> WebhookResult<DeleteOutcome> {
        self.delete_log
            .lock()
            .expect("lock poisoned")
            .push(message_id.to_string());
        let scripted = self
            .delete_script
            .lock()
            .expect("lock poisoned")
            .pop_front();
        match scripted {
            Some(ScriptedDelete::Ok(outcome)) => Ok(outcome),
            Some(ScriptedDelete::NetworkError) => Err(network_error().await),
            None => Ok(DeleteOutcome::Deleted),
        }
    }
}

/// Delete sink that records submissions with their paused-clock time.
#[derive(Default)]
pub(crate) struct RecordingSink {
    submitted: Mutex<Vec<(String, Instant)>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn submitted(&self) -> Vec<(String, Instant)> {
        self.submitted.lock().expect("lock poisoned").clone()
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.submitted()
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }
}

impl DeleteSink for RecordingSink {
    fn submit_delete(&self, message_id: String) {
        self.submitted
            .lock()
            .expect("lock poisoned")
            .push((message_id, Instant::now()));
    }
}
