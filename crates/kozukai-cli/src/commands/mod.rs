//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `reports` - Report commands (overview, periods, monthly, categories, search, trends, compare)
//! - `shell` - Interactive session over a cached snapshot
//! - `serve` - Web server command
//!
//! Shared utilities for loading config and data live here.

pub mod reports;
pub mod serve;
pub mod shell;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use kozukai_core::period::index_of;
use kozukai_core::{
    distinct_periods, load_records, Config, DataSource, ExpenseRecord, Filtered, IndexRange,
    PeriodFilter, PeriodKey, SourceConfig,
};

use crate::cli::FilterArgs;

// Re-export command functions for main.rs
pub use reports::*;
pub use serve::*;
pub use shell::*;

/// Message shown when the source produced no usable records
pub const NO_DATA: &str = "No data available. Check the data source and try again.";

/// Load config and apply command-line source overrides
pub fn load_config(
    config_path: Option<&Path>,
    csv: Option<&Path>,
    sheet: Option<&str>,
    worksheet: Option<&str>,
) -> Result<Config> {
    let mut config = Config::load(config_path).context("Failed to load config")?;

    if let Some(path) = csv {
        config.source = SourceConfig::csv(path);
    }
    if let Some(url) = sheet {
        config.set_sheet(url, |key| std::env::var(key).ok());
    }
    if let Some(name) = worksheet {
        config.set_worksheet(name);
    }
    Ok(config)
}

/// Construct the configured data source
pub fn open_source(config: &Config) -> Result<Box<dyn DataSource>> {
    config
        .build_source()
        .context("Failed to set up the data source")
}

/// Fetch records on a blocking thread (the sheet source uses blocking HTTP)
pub async fn fetch_records(source: Box<dyn DataSource>) -> Result<Vec<ExpenseRecord>> {
    tokio::task::spawn_blocking(move || load_records(source.as_ref()))
        .await
        .context("Data loading task failed")
}

/// Turn filter flags into a [`PeriodFilter`] for `records`
pub fn resolve_filter(args: &FilterArgs, records: &[ExpenseRecord]) -> Result<PeriodFilter> {
    if let Some(n) = args.last {
        return Ok(PeriodFilter::LastPeriods(n));
    }

    if let (Some(from), Some(to)) = (&args.from_date, &args.to_date) {
        let start = parse_date(from).context("Invalid --from-date (use YYYY-MM-DD)")?;
        let end = parse_date(to).context("Invalid --to-date (use YYYY-MM-DD)")?;
        return Ok(PeriodFilter::DateRange { start, end });
    }

    if let (Some(from), Some(to)) = (&args.from_period, &args.to_period) {
        let range = resolve_period_range(records, from, to)?;
        return Ok(PeriodFilter::PeriodRange {
            start: range.start,
            end: range.end,
        });
    }

    Ok(PeriodFilter::All)
}

/// Map two `YYYYMM` keys to indices into the record set's distinct periods
pub fn resolve_period_range(records: &[ExpenseRecord], from: &str, to: &str) -> Result<IndexRange> {
    let keys = distinct_periods(records);
    let index = |raw: &str| -> Result<usize> {
        let key = PeriodKey::parse(raw).with_context(|| format!("Invalid period {:?}", raw))?;
        Ok(index_of(&keys, &key)?)
    };
    Ok(IndexRange::new(index(from)?, index(to)?))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
}

/// Apply `filter`, reporting a rejected filter without failing
pub fn apply_filter<'a>(
    filter: PeriodFilter,
    records: &'a [ExpenseRecord],
    json: bool,
) -> Filtered<'a> {
    let filtered = filter.apply(records);
    if let Some(reason) = &filtered.rejected {
        if json {
            eprintln!("warning: {} (showing all data)", reason);
        } else {
            println!("   ⚠️  {} (showing all data)", reason);
        }
    }
    filtered
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize report")?
    );
    Ok(())
}

/// Format an amount as yen with thousands separators, e.g. `¥12,345`
pub fn format_yen(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print the no-data message if `records` is empty; returns whether it was
pub fn no_data(records: &[ExpenseRecord], json: bool) -> bool {
    if !records.is_empty() {
        return false;
    }
    notice(NO_DATA, json);
    true
}

/// Print a message for the user; on stderr in JSON mode so stdout stays parseable
pub fn notice(message: &str, json: bool) {
    let _ = write_notice(&mut io::stdout(), &mut io::stderr(), message, json);
}

pub fn write_notice<O: Write, E: Write>(
    out: &mut O,
    err: &mut E,
    message: &str,
    json: bool,
) -> io::Result<()> {
    if json {
        writeln!(err, "{}", message)
    } else {
        writeln!(out, "{}", message)
    }
}
