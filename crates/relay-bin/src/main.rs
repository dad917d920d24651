//! pm2-relay - forwards pm2 log output to a webhook.

mod app;

use clap::Parser;
use relay_config::{init_logging, Config, DEFAULT_APP_FILTER, DEFAULT_LOG_LEVEL};

/// pm2-relay command-line interface.
#[derive(Parser)]
#[command(name = "pm2-relay")]
#[command(about = "Forwards pm2 log output to a webhook")]
#[command(version)]
struct Cli {
    /// Webhook URL messages are posted to
    #[arg(long, env = "PM2_RELAY_WEBHOOK_URL")]
    webhook_url: String,

    /// pm2 app to follow ("*" or "all" follows everything)
    #[arg(long, env = "PM2_RELAY_APP", default_value = DEFAULT_APP_FILTER)]
    app: String,

    /// Seconds a delivered message lives before deletion; 0 keeps messages forever
    #[arg(long, env = "PM2_RELAY_MESSAGE_TTL", default_value_t = 0)]
    message_ttl: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::new(&cli.webhook_url, cli.app, cli.message_ttl, cli.log_level)?;
    init_logging(&config.log_level);

    let exit_code = app::run(config).await?;
    std::process::exit(exit_code);
}
