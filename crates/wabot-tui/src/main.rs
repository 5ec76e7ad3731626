//! WhatsApp bot admin console entry point.
//!
//! # Usage
//!
//! ```bash
//! # Local backend on the default port
//! wabot-admin
//!
//! # Remote backend, faster status polling
//! wabot-admin --api-url https://bot.example.com/whatsapp/ --poll-interval-ms 1500
//! ```
//!
//! Logs go to a file because the terminal belongs to the UI.

use std::{
    fs::File,
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wabot_api::{ApiConfig, HttpClient};
use wabot_app::{App, Runtime};
use wabot_tui::TerminalDriver;

/// Spinner frame period.
const TICK: Duration = Duration::from_millis(100);

/// WhatsApp bot admin console
#[derive(Parser, Debug)]
#[command(name = "wabot-admin")]
#[command(about = "Terminal admin console for the WhatsApp bot backend")]
#[command(version)]
struct Args {
    /// Base URL of the bot's WhatsApp API
    #[arg(long, env = "WABOT_API_URL", default_value = "http://localhost:3000/whatsapp/")]
    api_url: String,

    /// Status poll period while a QR code is displayed
    #[arg(
        long,
        env = "WABOT_POLL_INTERVAL_MS",
        default_value = "3000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval_ms: u64,

    /// Per-request timeout
    #[arg(
        long,
        env = "WABOT_TIMEOUT_SECS",
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// File to write logs to
    #[arg(long, default_value = "wabot-admin.log")]
    log_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log = File::create(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log)).with_ansi(false))
        .with(filter)
        .init();

    let config =
        ApiConfig::new(&args.api_url)?.with_timeout(Duration::from_secs(args.timeout_secs));
    tracing::info!(api = %config.base_url(), "WhatsApp bot admin starting");

    let api = Arc::new(HttpClient::new(config.clone())?);
    let app = App::new(config.base_url().as_str(), Duration::from_millis(args.poll_interval_ms));
    let driver = TerminalDriver::new(api, TICK)?;

    Runtime::new(driver, app).run().await?;

    tracing::info!("WhatsApp bot admin stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_periods_are_rejected() {
        assert!(Args::try_parse_from(["wabot-admin", "--poll-interval-ms", "0"]).is_err());
        assert!(Args::try_parse_from(["wabot-admin", "--timeout-secs", "0"]).is_err());
    }

    #[test]
    fn explicit_flags_are_parsed() {
        let args =
            Args::try_parse_from(["wabot-admin", "--poll-interval-ms", "1500", "--timeout-secs", "5"])
                .unwrap();
        assert_eq!(args.poll_interval_ms, 1500);
        assert_eq!(args.timeout_secs, 5);
    }
}
