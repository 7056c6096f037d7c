use std::fs;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use weathergrid_core::{Config, ForecastClient, GeocodingClient};

use crate::app;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathergrid", version, about = "Multi-day weather forecast widget")]
pub struct Cli {
    /// API key for the geocoding service; falls back to the config file.
    #[arg(long, env = "NINJAS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the geocoding API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            None => {
                init_logging()?;
                let api_key = resolve_api_key(self.api_key)?;
                let geocoder = GeocodingClient::new(api_key);
                let forecast = ForecastClient::new();
                app::run(geocoder, forecast).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("Geocoding API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.geocoding_api_key = Some(api_key);
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn resolve_api_key(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(key) = flag {
        return Ok(key);
    }

    let config = Config::load()?;
    config.geocoding_api_key.ok_or_else(|| {
        anyhow!(
            "No API key configured for the geocoding service.\n\
             Hint: run `weathergrid-tui configure` and enter your API key, or set NINJAS_API_KEY."
        )
    })
}

/// Logs go to a file: stdout and stderr belong to the widget.
fn init_logging() -> anyhow::Result<()> {
    let dirs = ProjectDirs::from("dev", "weathergrid", "weathergrid")
        .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

    let dir = dirs.data_dir();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let file = fs::File::create(dir.join("weathergrid.log")).context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
