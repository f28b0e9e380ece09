//! Local CSV export of the expense sheet

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{read_csv, DataSource};
use crate::error::{Error, Result};
use crate::models::RawTable;

/// Reads a CSV file exported from the sheet (header row required)
pub struct CsvFileSource {
    path: PathBuf,
    name: String,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("csv:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<RawTable> {
        if !self.path.exists() {
            return Err(Error::Source(format!(
                "CSV file not found: {}",
                self.path.display()
            )));
        }
        debug!("Reading {}", self.path.display());
        let file = File::open(&self.path)?;
        read_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_fetch_csv_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "項目,金額,日時,年月").unwrap();
        writeln!(file, "food,1000,2023-11-01 08:00:00,202311").unwrap();
        writeln!(file, "\"rent, monthly\",\"80,000\",2023-11-25 09:00:00,202311").unwrap();

        let source = CsvFileSource::new(file.path());
        let table = source.fetch().unwrap();
        assert_eq!(table.headers[1], "金額");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get(0), Some("rent, monthly"));
        assert_eq!(table.rows[1].get(1), Some("80,000"));
        assert!(source.name().starts_with("csv:"));
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let source = CsvFileSource::new("/nonexistent/kozukai.csv");
        assert!(matches!(source.fetch(), Err(Error::Source(_))));
    }
}
