use anyhow::Result;
use clap::Parser;
use recruit_sync::cli::{handle_command, Cli, Command};
use recruit_sync::config::AppConfig;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("recruit_sync=info,rocket::server=off")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let code = handle_command(cli.command.unwrap_or(Command::Serve), config).await?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
