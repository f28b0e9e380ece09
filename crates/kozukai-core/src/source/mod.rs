//! Pluggable data sources
//!
//! A source produces one [`RawTable`] per fetch. Which source is used is a
//! configuration decision (see [`crate::config::Config::build_source`]);
//! report code only ever sees the normalized records.
//!
//! - `CsvFileSource` reads a local CSV export of the sheet
//! - `SheetSource` downloads the hosted spreadsheet as CSV
//! - `MemorySource` serves a fixed table

use std::io::Read;

use csv::ReaderBuilder;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::models::{ExpenseRecord, RawRow, RawTable};
use crate::normalize::normalize_table;

mod csv_file;
mod memory;
mod sheet;

pub use csv_file::CsvFileSource;
pub use memory::MemorySource;
pub use sheet::{spreadsheet_id_from_url, SheetSource, DEFAULT_WORKSHEET};

/// Trait for expense data sources
///
/// Implementations block until the whole table is available.
pub trait DataSource: Send + Sync {
    /// Human-readable name for this source
    fn name(&self) -> &str;

    /// Fetch the current table, header row first
    fn fetch(&self) -> Result<RawTable>;
}

/// Fetch and normalize records from `source`.
///
/// Never fails: an unreachable source or a structurally unusable sheet is
/// logged and yields an empty collection, which presenters render as the
/// "no data" state.
pub fn load_records(source: &dyn DataSource) -> Vec<ExpenseRecord> {
    let table = match source.fetch() {
        Ok(table) => table,
        Err(e) => {
            error!(source = source.name(), "Failed to fetch data: {}", e);
            return Vec::new();
        }
    };

    info!(
        source = source.name(),
        rows = table.rows.len(),
        columns = table.headers.len(),
        "Fetched table"
    );

    if table.is_empty() {
        return Vec::new();
    }

    match normalize_table(&table) {
        Ok(records) => records,
        Err(e) => {
            warn!(source = source.name(), "Discarding fetched data: {}", e);
            Vec::new()
        }
    }
}

/// Read CSV text with a header row into a [`RawTable`].
///
/// Rows may have differing lengths; the column check happens during
/// normalization so one bad row rejects the whole batch there.
pub(crate) fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(RawRow::new(record.iter()));
    }

    Ok(RawTable { headers, rows })
}
