//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod countries;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, Settings};

#[derive(Parser)]
#[command(name = "advisories")]
#[command(about = "Travel advisory mirror serving normalized country JSON")]
#[command(version)]
pub struct Cli {
    /// Settings file path (overrides ./settings.json and auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the settings file)
    #[arg(long, global = true, env = "ADVISORIES_PORT")]
    port: Option<i64>,

    /// Base URL of the advisory site (overrides the settings file)
    #[arg(long, global = true, env = "ADVISORIES_BASE_URL")]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address: "port", "host" or "host:port"
        bind: Option<String>,
    },

    /// Fetch the country list and print it as JSON
    Countries,

    /// Fetch one country's advisory and print it as JSON
    Country {
        /// Country identifier, e.g. new_zealand or "new zealand"
        identifier: String,
    },
}

/// Load the settings file, apply command-line overrides and validate.
async fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut config = match &cli.config {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            Config::load_from_path(&PathBuf::from(expanded)).await?
        }
        None => Config::load().await?,
    };

    if let Some(port) = cli.port {
        config.port = Some(port);
    }
    if let Some(ref base_url) = cli.base_url {
        config.base_url = Some(base_url.clone());
    }

    if let Some(ref path) = config.source_path {
        tracing::info!("Loaded settings from {}", path.display());
    }

    Ok(Settings::from_config(&config)?)
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli).await?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Countries => countries::cmd_countries(&settings).await,
        Commands::Country { identifier } => countries::cmd_country(&settings, &identifier).await,
    }
}
