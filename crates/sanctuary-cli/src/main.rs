//! # sanctuary
//!
//! Command-line front end for a local sanctuary profile: unlock it, then
//! list, add and delete memories, awesome highlights and photos.

mod commands;
mod config;

use clap::Parser;
use sanctuary_store::{DataDir, SqliteContentStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "sanctuary", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sanctuary_cli=info,sanctuary_store=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = CliConfig::from_env();
    tracing::debug!(?config, "loaded configuration");

    let data_dir = match &config.data_dir {
        Some(path) => DataDir::at(path),
        None => DataDir::platform_default()?,
    };
    info!(path = %data_dir.root().display(), "using profile");

    let store = SqliteContentStore::open_dir(&data_dir, config.flat_quota).await?;
    commands::run(cli.command, &store, &config).await
}
