//! Events emitted by the pm2 log stream.

/// An event from the pm2 log process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A sanitized, non-empty log line.
    Line(String),

    /// The pm2 process has exited.
    Exited {
        /// Exit code if available; signals yield `None`.
        code: Option<i32>,
    },
}

impl LogEvent {
    /// True when no further events will follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited { .. })
    }
}
