use anyhow::{Context, Result};
use clap::Parser;
use homework_bot::config::{Config, Credentials};
use homework_bot::practicum::PracticumClient;
use homework_bot::relay::{CycleOutcome, Relay};
use homework_bot::telegram::TelegramBot;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "homework-bot",
    about = "Relay homework review status changes to a Telegram chat",
    version
)]
struct Cli {
    /// Path to the TOML config file (built-in defaults when absent)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

/// Log to stderr and append the same lines to `log_file`.
fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("homework_bot=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config.logging.file)?;

    // Load saved keys from .env (real env vars take precedence)
    Config::load_env_file();
    let credentials = Credentials::from_env();

    let source = PracticumClient::new(&config.practicum, credentials.practicum_token.clone())?;
    let bot = TelegramBot::new(
        &config.telegram,
        credentials.telegram_token.clone(),
        credentials.telegram_chat_id.clone(),
    )?;

    let mut relay = Relay::new(
        source,
        bot,
        credentials,
        config.polling.retry_period(),
        config.polling.initial_cursor(),
    );
    tracing::info!(
        endpoint = %config.practicum.endpoint,
        from_date = relay.cursor(),
        retry_period_s = config.polling.retry_period_s,
        "homework bot starting"
    );

    if cli.once {
        relay.check_credentials()?;
        match relay.poll_once().await {
            CycleOutcome::Notified(message) => tracing::info!(%message, "status sent"),
            CycleOutcome::Unchanged => tracing::info!("status unchanged"),
            CycleOutcome::Failed { error, reported } => {
                tracing::warn!(error = %error, reported, "poll cycle failed")
            }
        }
        return Ok(());
    }

    tokio::select! {
        result = relay.run() => match result {
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => tracing::error!(error = %e, "relay loop stopped"),
            Ok(()) => {}
        },
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, shutting down"),
    }
    Ok(())
}
