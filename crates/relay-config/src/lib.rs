//! Configuration and logging initialization for the pm2 relay.

mod config;
mod error;
mod logging;

pub use config::{Config, DEFAULT_APP_FILTER, DEFAULT_LOG_LEVEL};
pub use error::{ConfigError, ConfigResult};
pub use logging::init_logging;
