//! Kozukai CLI - Pocket-money expense reports
//!
//! Usage:
//!   kozukai overview                         Data summary
//!   kozukai monthly --last 3                 Spending per closing month
//!   kozukai compare --a-from 202311 --a-to 202311 --b-from 202312 --b-to 202312
//!   kozukai shell                            Interactive session
//!   kozukai serve --port 3000                Start the JSON API

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(
        cli.config.as_deref(),
        cli.csv.as_deref(),
        cli.sheet.as_deref(),
        cli.worksheet.as_deref(),
    )?;

    match cli.command {
        Commands::Report(report) => {
            let source = commands::open_source(&config)?;
            let records = commands::fetch_records(source).await?;
            commands::run_report(&report, &records, cli.json)
        }
        Commands::Shell => {
            let source = commands::open_source(&config)?;
            let ttl = config.cache_ttl;
            let json = cli.json;
            tokio::task::spawn_blocking(move || commands::cmd_shell(source.as_ref(), ttl, json))
                .await
                .context("Shell task failed")?
        }
        Commands::Serve { port, host } => commands::cmd_serve(&config, &host, port).await,
    }
}
