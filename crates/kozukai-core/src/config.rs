//! Configuration for data source selection and caching
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), else the override file in the user
//!    config dir (`~/.config/kozukai/config.toml`) if it exists
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top of whichever file was used.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::{CsvFileSource, DataSource, SheetSource, DEFAULT_WORKSHEET};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/kozukai.toml");

pub const CSV_ENV: &str = "KOZUKAI_CSV";
pub const SHEET_URL_ENV: &str = "KOZUKAI_SHEET_URL";
pub const WORKSHEET_ENV: &str = "KOZUKAI_WORKSHEET";
pub const SHEET_TOKEN_ENV: &str = "KOZUKAI_SHEET_TOKEN";
pub const CACHE_TTL_ENV: &str = "KOZUKAI_CACHE_TTL_SECS";

const DEFAULT_CSV_PATH: &str = "kozukai.csv";
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Where expense rows come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// A local CSV export
    Csv { path: PathBuf },
    /// The hosted spreadsheet
    Sheet {
        url_or_id: String,
        worksheet: String,
        access_token: Option<String>,
    },
}

impl SourceConfig {
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self::Csv { path: path.into() }
    }

    /// Hosted sheet with the default worksheet and no token
    pub fn sheet(url_or_id: impl Into<String>) -> Self {
        Self::Sheet {
            url_or_id: url_or_id.into(),
            worksheet: DEFAULT_WORKSHEET.to_string(),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: SourceConfig,
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::csv(DEFAULT_CSV_PATH),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl Config {
    /// Load config from `override_path` or the default locations, then
    /// apply environment overrides
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                read_config(path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => read_config(&path)?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        let mut config = Self::parse(&content)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse config from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(source) = raw.source {
            let worksheet = source
                .worksheet
                .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string());
            config.source = match source.kind.as_deref().unwrap_or("csv") {
                "csv" => SourceConfig::Csv {
                    path: source
                        .path
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH)),
                },
                "sheet" => SourceConfig::Sheet {
                    url_or_id: source.url.ok_or_else(|| {
                        Error::Config("source.url is required when kind = \"sheet\"".into())
                    })?,
                    worksheet,
                    access_token: None,
                },
                other => {
                    return Err(Error::Config(format!(
                        "Unknown source kind {:?} (expected \"csv\" or \"sheet\")",
                        other
                    )))
                }
            };
        }

        if let Some(ttl) = raw.cache.and_then(|c| c.ttl_secs) {
            config.cache_ttl = Duration::from_secs(ttl);
        }

        Ok(config)
    }

    /// Apply environment overrides using `var` to look variables up.
    ///
    /// A sheet URL wins over a CSV path when both are set.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = var(CSV_ENV) {
            debug!("Using CSV source from {}", CSV_ENV);
            self.source = SourceConfig::csv(path);
        }
        if let Some(url) = var(SHEET_URL_ENV) {
            debug!("Using sheet source from {}", SHEET_URL_ENV);
            self.switch_to_sheet(url);
        }
        self.apply_sheet_env(&var);
        if let Some(ttl) = var(CACHE_TTL_ENV) {
            let secs: u64 = ttl.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds", CACHE_TTL_ENV))
            })?;
            self.cache_ttl = Duration::from_secs(secs);
        }
        Ok(())
    }

    /// Read from the hosted sheet at `url_or_id` instead.
    ///
    /// A sheet source keeps its worksheet and token. A CSV source becomes a
    /// sheet with the default worksheet, then takes the worksheet and token
    /// overrides from `var`.
    pub fn set_sheet<F>(&mut self, url_or_id: impl Into<String>, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let was_sheet = matches!(self.source, SourceConfig::Sheet { .. });
        self.switch_to_sheet(url_or_id.into());
        if !was_sheet {
            self.apply_sheet_env(|key| var(key).filter(|v| !v.trim().is_empty()));
        }
    }

    fn switch_to_sheet(&mut self, url: String) {
        match &mut self.source {
            SourceConfig::Sheet { url_or_id, .. } => *url_or_id = url,
            SourceConfig::Csv { .. } => self.source = SourceConfig::sheet(url),
        }
    }

    fn apply_sheet_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let SourceConfig::Sheet {
            worksheet,
            access_token,
            ..
        } = &mut self.source
        {
            if let Some(name) = var(WORKSHEET_ENV) {
                *worksheet = name;
            }
            if let Some(token) = var(SHEET_TOKEN_ENV) {
                *access_token = Some(token);
            }
        }
    }

    /// Override the worksheet name (only meaningful for sheet sources)
    pub fn set_worksheet(&mut self, name: impl Into<String>) {
        if let SourceConfig::Sheet { worksheet, .. } = &mut self.source {
            *worksheet = name.into();
        }
    }

    /// Construct the configured data source
    pub fn build_source(&self) -> Result<Box<dyn DataSource>> {
        Ok(match &self.source {
            SourceConfig::Csv { path } => Box::new(CsvFileSource::new(path.clone())),
            SourceConfig::Sheet {
                url_or_id,
                worksheet,
                access_token,
            } => Box::new(SheetSource::new(url_or_id, worksheet, access_token.clone())?),
        })
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kozukai").join("config.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!("Reading config from {}", path.display());
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    source: Option<RawSource>,
    cache: Option<RawCache>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    kind: Option<String>,
    path: Option<PathBuf>,
    url: Option<String>,
    worksheet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    ttl_secs: Option<u64>,
}
