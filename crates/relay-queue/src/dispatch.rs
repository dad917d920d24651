//! Shared retrying-queue core.
//!
//! [`DispatchQueue`] owns the ordered item list, the in-flight flag, and
//! the pause deadline; a [`Dispatcher`] performs one delivery attempt and
//! classifies its result. Both the send and delete queues are instances of
//! this machinery.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

/// Fixed pause after a transport-level failure.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(1_000);

/// Minimum slack added when sleeping out a pause, so the deadline has
/// passed when the worker re-checks.
pub const DEFAULT_PAUSE_SLACK: Duration = Duration::from_millis(50);

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The item was delivered (or counts as delivered); discard it.
    Completed,
    /// The remote asked for a pause; requeue the item at the front and do
    /// not start another attempt until the delay elapses.
    RateLimited { retry_after: Duration },
    /// Permanent failure; discard the item rather than block the queue.
    Dropped,
    /// Transport-level failure with no response; requeue at the front and
    /// retry after the fixed backoff.
    Retry,
}

/// One delivery attempt against the remote service.
///
/// The trait seam that lets tests drive a queue with a recording fake.
pub trait Dispatcher<T>: Send + Sync + 'static {
    /// Attempts delivery of `item` and classifies the result.
    fn dispatch(&self, item: &T) -> impl Future<Output = DispatchOutcome> + Send;
}

/// Timing knobs for a dispatch queue.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Pause applied after a transport-level failure.
    pub retry_backoff: Duration,
    /// Slack added when sleeping until a pause deadline.
    pub pause_slack: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            pause_slack: DEFAULT_PAUSE_SLACK,
        }
    }
}

struct QueueState<T> {
    items: VecDeque<T>,
    /// True while a delivery attempt is outstanding.
    sending: bool,
    /// No attempt may start before this deadline.
    paused_until: Option<Instant>,
}

enum NextStep<T> {
    Dispatch(T),
    PausedUntil(Instant),
    Idle,
}

/// Ordered in-memory queue with at-most-one-in-flight delivery.
///
/// Items are delivered in submission order, except that an item whose
/// attempt failed recoverably returns to the front and is retried before
/// anything submitted after it.
pub struct DispatchQueue<T> {
    state: Mutex<QueueState<T>>,
    notify: Notify,
    config: QueueConfig,
}

impl<T: Send + 'static> DispatchQueue<T> {
    /// Create an empty queue.
    pub fn new(config: QueueConfig) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                sending: false,
                paused_until: None,
            }),
            notify: Notify::new(),
            config,
        })
    }

    /// Append an item to the tail and wake the worker.
    pub fn submit(&self, item: T) {
        {
            let mut state = self.state.lock().expect("lock poisoned");
            state.items.push_back(item);
        }
        self.notify.notify_one();
    }

    /// Number of items waiting for an attempt.
    pub fn pending_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").items.len()
    }

    /// Whether a delivery attempt is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.state.lock().expect("lock poisoned").sending
    }

    /// Spawn the worker task that drains this queue.
    pub fn start<D: Dispatcher<T>>(self: &Arc<Self>, dispatcher: D) -> JoinHandle<()> {
        let queue = Arc::clone(self);
        tokio::spawn(queue.run(dispatcher))
    }

    async fn run<D: Dispatcher<T>>(self: Arc<Self>, dispatcher: D) {
        loop {
            let item = match self.next_step() {
                NextStep::Dispatch(item) => item,
                NextStep::PausedUntil(until) => {
                    sleep_until(until + self.config.pause_slack).await;
                    continue;
                }
                NextStep::Idle => {
                    self.notify.notified().await;
                    continue;
                }
            };

            let outcome = dispatcher.dispatch(&item).await;
            self.settle(item, outcome);

            // Yield between iterations so timers and other tasks run even
            // under sustained submit volume.
            tokio::task::yield_now().await;
        }
    }

    /// Decides what the worker does next. The in-flight flag is set here,
    /// before any suspension point, so attempts can never overlap.
    fn next_step(&self) -> NextStep<T> {
        let mut state = self.state.lock().expect("lock poisoned");
        if state.sending || state.items.is_empty() {
            return NextStep::Idle;
        }
        if let Some(until) = state.paused_until {
            if until > Instant::now() {
                return NextStep::PausedUntil(until);
            }
            state.paused_until = None;
        }
        match state.items.pop_front() {
            Some(item) => {
                state.sending = true;
                NextStep::Dispatch(item)
            }
            None => NextStep::Idle,
        }
    }

    fn settle(&self, item: T, outcome: DispatchOutcome) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.sending = false;
        match outcome {
            DispatchOutcome::Completed | DispatchOutcome::Dropped => {}
            DispatchOutcome::RateLimited { retry_after } => {
                state.items.push_front(item);
                state.paused_until = Some(Instant::now() + retry_after);
            }
            DispatchOutcome::Retry => {
                state.items.push_front(item);
                state.paused_until = Some(Instant::now() + self.config.retry_backoff);
            }
        }
    }
}
