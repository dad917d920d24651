//! Spawning and pumping the pm2 log process.

use crate::config::LogSourceConfig;
use crate::error::{LogSourceError, LogSourceResult};
use crate::event::LogEvent;
use crate::sanitize::sanitize_line;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const EVENT_BUFFER: usize = 1_024;

/// A running pm2 log stream.
///
/// Owns the channel fed by the reader tasks. Dropping the source kills
/// the pm2 process.
pub struct LogSource {
    events: mpsc::Receiver<LogEvent>,
}

impl LogSource {
    /// Spawn `pm2 logs --raw` and start streaming.
    ///
    /// When pm2 is not on the PATH the spawn is retried through
    /// `npx pm2`, matching how pm2 is commonly installed per-project.
    pub fn spawn(config: &LogSourceConfig) -> LogSourceResult<Self> {
        let args = config.args();
        let program = config.pm2_bin.as_deref().unwrap_or("pm2");
        let child = match spawn_command(program, &args) {
            Ok(child) => {
                info!(app = %config.app, "following pm2 logs");
                child
            }
            Err(err) if err.kind() == ErrorKind::NotFound && config.pm2_bin.is_none() => {
                warn!("pm2 not found on PATH, retrying through npx");
                let mut npx_args = vec!["pm2".to_string()];
                npx_args.extend(args);
                spawn_command("npx", &npx_args)?
            }
            Err(err) => return Err(LogSourceError::SpawnFailed(err)),
        };
        Self::from_child(child)
    }

    /// Wire an already spawned process into the event channel.
    fn from_child(mut child: Child) -> LogSourceResult<Self> {
        let stdout = child.stdout.take().ok_or(LogSourceError::NoStdout)?;
        let stderr = child.stderr.take().ok_or(LogSourceError::NoStderr)?;

        let (tx, events) = mpsc::channel(EVENT_BUFFER);

        let stdout_task = tokio::spawn(forward_lines(stdout, tx.clone()));
        let stderr_task = tokio::spawn(forward_lines(stderr, tx.clone()));
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(err) => {
                    warn!(error = %err, "failed to reap pm2 process");
                    None
                }
            };
            // Drain both streams before announcing the exit so no line is
            // reordered past it.
            let _ = stdout_task.await;
            let _ = stderr_task.await;
            debug!(code = ?code, "pm2 process exited");
            let _ = tx.send(LogEvent::Exited { code }).await;
        });

        Ok(Self { events })
    }

    /// Next event, or `None` once the stream is fully drained.
    pub async fn recv(&mut self) -> Option<LogEvent> {
        self.events.recv().await
    }
}

fn spawn_command(program: &str, args: &[String]) -> std::io::Result<Child> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
}

/// Reads lines from one process stream, sanitizes them, and forwards
/// everything non-empty. Ends when the stream closes or the receiver is
/// dropped.
async fn forward_lines<R: AsyncRead + Unpin>(reader: R, tx: mpsc::Sender<LogEvent>) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(raw)) => {
                let line = sanitize_line(&raw);
                if line.is_empty() {
                    continue;
                }
                if tx.send(LogEvent::Line(line)).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "error reading pm2 output");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forward_lines_sanitizes_and_skips_empties() {
        let input: &[u8] = b"0|app | first\n\n\x1b[32msecond\x1b[0m\n   \n";
        let (tx, mut rx) = mpsc::channel(16);

        forward_lines(input, tx).await;

        assert_eq!(rx.recv().await, Some(LogEvent::Line("first".to_string())));
        assert_eq!(rx.recv().await, Some(LogEvent::Line("second".to_string())));
        assert_eq!(rx.recv().await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_lines_and_exit_code_are_forwarded() {
        let child = spawn_command(
            "sh",
            &[
                "-c".to_string(),
                "printf 'one\\ntwo\\n'; exit 3".to_string(),
            ],
        )
        .expect("sh is available");
        let mut source = LogSource::from_child(child).expect("piped handles");

        let mut lines = Vec::new();
        let mut code = None;
        while let Some(event) = source.recv().await {
            match event {
                LogEvent::Line(line) => lines.push(line),
                LogEvent::Exited { code: c } => {
                    code = Some(c);
                    break;
                }
            }
        }

        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(code, Some(Some(3)));
    }
}
