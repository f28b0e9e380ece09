//! Interactive shell
//!
//! Reads one report command per line and answers it from a cached snapshot.
//! The snapshot is refetched when it goes stale or on `refresh`.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use kozukai_core::{DataSource, SnapshotCache};
use tracing::debug;

use super::run_report;
use crate::cli::{ShellCommand, ShellLine};

const PROMPT: &str = "kozukai> ";

pub fn cmd_shell(source: &dyn DataSource, ttl: Duration, json: bool) -> Result<()> {
    println!("💴 kozukai shell ({})", source.name());
    println!("   Type `help` for commands, `quit` to leave.");
    let stdin = io::stdin();
    run_shell(source, ttl, stdin.lock(), json)
}

/// Drive the shell from `input` until it ends or `quit` is read
pub fn run_shell<R: BufRead>(
    source: &dyn DataSource,
    ttl: Duration,
    input: R,
    json: bool,
) -> Result<()> {
    let mut cache = SnapshotCache::new(ttl);

    prompt()?;
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            prompt()?;
            continue;
        }

        match ShellLine::try_parse_from(words) {
            Ok(ShellLine { command }) => match command {
                ShellCommand::Quit => break,
                ShellCommand::Refresh => {
                    cache.invalidate();
                    let snapshot = cache.get_or_load(source, Utc::now());
                    println!("Loaded {} records.", snapshot.records.len());
                }
                ShellCommand::Report(report) => {
                    let snapshot = cache.get_or_load(source, Utc::now());
                    debug!(fetched_at = %snapshot.fetched_at, "Answering from snapshot");
                    if let Err(e) = run_report(&report, &snapshot.records, json) {
                        println!("Error: {:#}", e);
                    }
                }
            },
            // Covers `help` and `--help` too
            Err(e) => e.print().context("Failed to print usage")?,
        }
        prompt()?;
    }
    println!();
    Ok(())
}

fn prompt() -> Result<()> {
    print!("{}", PROMPT);
    io::stdout().flush().context("Failed to flush stdout")
}
