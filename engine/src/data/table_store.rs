// Uploaded tables, keyed by file name. Owned by the caller; nothing here is global.
use chrono::NaiveDate;
use shared::models::TimeSeriesTable;
use std::collections::HashMap;

use crate::error::EngineError;

pub struct TableStore {
    tables: HashMap<String, TimeSeriesTable>,
    // Upload order, for listing.
    order: Vec<String>,
}

impl TableStore {
    pub fn new() -> Self {
        TableStore {
            tables: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Stores `table` under its name. Returns `false` and keeps the existing
    /// table when that name is already loaded.
    pub fn insert(&mut self, table: TimeSeriesTable) -> bool {
        if self.tables.contains_key(&table.name) {
            tracing::debug!(table = %table.name, "Table already loaded, keeping existing copy");
            return false;
        }
        self.order.push(table.name.clone());
        self.tables.insert(table.name.clone(), table);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TimeSeriesTable> {
        self.tables.get(name)
    }

    pub fn file_names(&self) -> &[String] {
        &self.order
    }

    /// Tables in upload order.
    pub fn tables(&self) -> impl Iterator<Item = &TimeSeriesTable> {
        self.order.iter().filter_map(|name| self.tables.get(name))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<TimeSeriesTable> {
        self.order.retain(|n| n != name);
        self.tables.remove(name)
    }

    /// Drops every loaded table.
    pub fn clear(&mut self) {
        tracing::info!(tables = self.tables.len(), "Clearing all loaded tables");
        self.tables.clear();
        self.order.clear();
    }

    /// Rows of `name` whose calendar date lies within `[from, to]`; open ends are unbounded.
    pub fn rows_in_range(&self, name: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<TimeSeriesTable, EngineError> {
        if let (Some(start), Some(end)) = (from, to) {
            if start > end {
                return Err(EngineError::TableStoreError(format!("Date range starts after it ends: {} > {}", start, end)));
            }
        }
        self.tables
            .get(name)
            .map(|table| table.filter_dates(from, to))
            .ok_or_else(|| EngineError::TableStoreError(format!("Table '{}' not found", name)))
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}
