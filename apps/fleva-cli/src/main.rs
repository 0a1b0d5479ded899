//! # fleva
//!
//! Command-line front end for the FLEVA campus posts API. Works offline:
//! when the API cannot be reached, posts are kept in a local mirror file.

use clap::Parser;

mod args;
mod commands;
mod config;
mod state;
mod telemetry;

use args::Cli;
use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env().with_cli(&cli);
    let state = AppState::new(&config)?;

    commands::run(&state, cli.command, cli.json).await
}
