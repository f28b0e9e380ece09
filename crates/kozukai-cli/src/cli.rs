//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Kozukai - Pocket-money expense reports
#[derive(Parser)]
#[command(name = "kozukai")]
#[command(about = "Expense reports over a pocket-money spreadsheet", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.config/kozukai/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read this CSV export instead of the configured source
    #[arg(long, global = true, conflicts_with = "sheet")]
    pub csv: Option<PathBuf>,

    /// Read this spreadsheet (URL or id) instead of the configured source
    ///
    /// Private sheets need KOZUKAI_SHEET_TOKEN set to an OAuth access token.
    #[arg(long, global = true)]
    pub sheet: Option<String>,

    /// Worksheet to read from the spreadsheet
    #[arg(long, global = true)]
    pub worksheet: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Report(ReportCommand),

    /// Interactive session over a cached snapshot
    Shell,

    /// Start the JSON API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

/// Report commands, shared by the command line and the interactive shell
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReportCommand {
    /// Record count, total and covered periods
    Overview,

    /// List closing months with their index
    Periods,

    /// Spending per closing month
    Monthly {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Spending per category, largest first
    Categories {
        /// Number of categories to show (all when omitted)
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Search categories (case-insensitive substring)
    Search {
        /// Text to look for in the category (several words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Daily and weekday spending
    Trends {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Compare two ranges of closing months
    Compare {
        /// First month of range A (YYYYMM)
        #[arg(long)]
        a_from: String,

        /// Last month of range A (YYYYMM)
        #[arg(long)]
        a_to: String,

        /// First month of range B (YYYYMM)
        #[arg(long)]
        b_from: String,

        /// Last month of range B (YYYYMM)
        #[arg(long)]
        b_to: String,
    },
}

/// Record filter flags (at most one kind of filter per command)
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long, requires = "to_date", conflicts_with_all = ["from_period", "to_period"])]
    pub from_date: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long, requires = "from_date")]
    pub to_date: Option<String>,

    /// First closing month (YYYYMM)
    #[arg(long, requires = "to_period")]
    pub from_period: Option<String>,

    /// Last closing month (YYYYMM)
    #[arg(long, requires = "from_period")]
    pub to_period: Option<String>,

    /// Only the N most recent closing months
    #[arg(long, conflicts_with_all = ["from_date", "to_date", "from_period", "to_period"])]
    pub last: Option<usize>,
}

/// One line typed into the interactive shell
#[derive(Parser, Debug)]
#[command(name = "kozukai", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShellCommand {
    #[command(flatten)]
    Report(ReportCommand),

    /// Fetch the data again, discarding the cached snapshot
    Refresh,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}
