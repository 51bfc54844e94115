//! Toolchat CLI entry point.

use anyhow::Result;
use clap::Parser;
use toolchat::cli::{commands, Cli, Commands};
use toolchat::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let file_settings = Settings::load_from(Some(&config_path))?;

    let log_level = match cli.verbose {
        0 => file_settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("toolchat={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match &cli.command {
        None | Some(Commands::Chat) => {
            let settings = file_settings.with_env_keys();
            commands::run_chat(&settings, cli.verbose > 0).await?;
        }

        Some(Commands::Doctor) => {
            let settings = file_settings.with_env_keys();
            commands::run_doctor(&settings, &config_path)?;
        }

        Some(Commands::Config { action }) => {
            commands::run_config(action, &file_settings, &config_path)?;
        }
    }

    Ok(())
}
