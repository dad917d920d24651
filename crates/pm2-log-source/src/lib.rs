//! Streams pm2 log output as line events.
//!
//! Spawns `pm2 logs --raw` (falling back to `npx pm2` when pm2 is not on
//! the PATH), strips ANSI escapes and pm2 line headers, and forwards each
//! non-empty line over a channel until the process exits.

mod config;
mod error;
mod event;
mod sanitize;
mod source;

pub use config::{LogSourceConfig, ALL_APPS};
pub use error::{LogSourceError, LogSourceResult};
pub use event::LogEvent;
pub use sanitize::sanitize_line;
pub use source::LogSource;
