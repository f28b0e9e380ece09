//! Hosted spreadsheet, downloaded as CSV
//!
//! The sheet is fetched through its CSV export endpoint:
//! `GET {base}/spreadsheets/d/{id}/gviz/tq?tqx=out:csv&sheet={worksheet}`.
//! Public sheets need no credentials; private ones take an OAuth access
//! token sent as a bearer header.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use tracing::debug;

use super::{read_csv, DataSource};
use crate::error::{Error, Result};
use crate::models::RawTable;

/// Worksheet read when none is configured
pub const DEFAULT_WORKSHEET: &str = "kodukai-db";

const SHEETS_BASE_URL: &str = "https://docs.google.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extract the spreadsheet id from a full sheet URL.
///
/// Accepts `https://docs.google.com/spreadsheets/d/{id}/edit#gid=0` style
/// URLs as well as a bare id.
pub fn spreadsheet_id_from_url(url_or_id: &str) -> Result<String> {
    let input = url_or_id.trim();

    let id = match input.split_once("/d/") {
        Some((_, rest)) => rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default(),
        None if !input.contains('/') => input,
        None => "",
    };

    if id.is_empty() {
        return Err(Error::Config(format!(
            "Cannot find a spreadsheet id in {:?}",
            url_or_id
        )));
    }
    Ok(id.to_string())
}

/// Google Sheets CSV export source
///
/// The blocking HTTP client is built per fetch, so a source can be created
/// inside an async runtime as long as `fetch` runs on a blocking thread.
pub struct SheetSource {
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    access_token: Option<String>,
    name: String,
}

impl SheetSource {
    /// Create a source for `url_or_id`, reading `worksheet`
    pub fn new(url_or_id: &str, worksheet: &str, access_token: Option<String>) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id_from_url(url_or_id)?;
        Ok(Self {
            base_url: SHEETS_BASE_URL.to_string(),
            name: format!("sheet:{}/{}", spreadsheet_id, worksheet),
            spreadsheet_id,
            worksheet: worksheet.to_string(),
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    /// Point the source at a different host (self-hosted mirrors, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// The CSV export URL for the configured worksheet
    pub fn export_url(&self) -> Result<Url> {
        let base = format!(
            "{}/spreadsheets/d/{}/gviz/tq",
            self.base_url, self.spreadsheet_id
        );
        Url::parse_with_params(&base, &[("tqx", "out:csv"), ("sheet", self.worksheet.as_str())])
            .map_err(|e| Error::Config(format!("Invalid sheet URL {}: {}", base, e)))
    }
}

impl DataSource for SheetSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<RawTable> {
        let url = self.export_url()?;
        debug!("Fetching {}", url);

        let client = Client::builder()
            .user_agent(concat!("kozukai/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let mut request = client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Source(format!(
                "Sheet request failed with HTTP {}",
                status.as_u16()
            )));
        }

        let body = response.bytes()?;
        read_csv(body.as_ref())
    }
}
