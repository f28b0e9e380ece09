//! Fixed in-memory table

use super::DataSource;
use crate::error::Result;
use crate::models::RawTable;

/// Serves the same table on every fetch
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    table: RawTable,
}

impl MemorySource {
    pub fn new(table: RawTable) -> Self {
        Self { table }
    }
}

impl DataSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self) -> Result<RawTable> {
        Ok(self.table.clone())
    }
}
