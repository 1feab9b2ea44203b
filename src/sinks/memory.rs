//! In-memory sink for inspection and tests

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded `init` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCall {
    pub table: String,
    pub columns: Vec<String>,
    pub type_names: Vec<String>,
}

/// One recorded `update` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCall {
    pub table: String,
    pub row: Vec<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Default)]
struct Recorded {
    inits: Vec<InitCall>,
    rows: Vec<RowCall>,
}

/// Sink that keeps every call in memory
///
/// Take a [`MemoryHandle`] before handing the sink to a table to read what
/// it received afterwards.
///
/// # Example
///
/// ```
/// use rust_tick_logger::prelude::*;
///
/// let sink = MemorySink::new();
/// let handle = sink.handle();
///
/// let mut table = Table::builder("Drive")
///     .sink(shared_sink(sink))
///     .column_with("Speed", types::decimal(), Loggable::new(|| 1.25))
///     .build()
///     .unwrap();
/// table.log(0);
///
/// assert_eq!(handle.init_count(), 1);
/// assert_eq!(handle.rows()[0].row[2], "1.25");
/// ```
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    #[must_use]
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            recorded: Arc::clone(&self.recorded),
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MemorySink {
    fn init(&mut self, table: &str, columns: &[String], type_names: &[String]) -> Result<()> {
        self.recorded.lock().inits.push(InitCall {
            table: table.to_string(),
            columns: columns.to_vec(),
            type_names: type_names.to_vec(),
        });
        Ok(())
    }

    fn update(&mut self, table: &str, row: &[String], columns: &[String]) -> Result<()> {
        self.recorded.lock().rows.push(RowCall {
            table: table.to_string(),
            row: row.to_vec(),
            columns: columns.to_vec(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Read access to what a [`MemorySink`] received
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    recorded: Arc<Mutex<Recorded>>,
}

impl MemoryHandle {
    pub fn inits(&self) -> Vec<InitCall> {
        self.recorded.lock().inits.clone()
    }

    pub fn init_count(&self) -> usize {
        self.recorded.lock().inits.len()
    }

    pub fn rows(&self) -> Vec<RowCall> {
        self.recorded.lock().rows.clone()
    }

    pub fn rows_for(&self, table: &str) -> Vec<RowCall> {
        self.recorded
            .lock()
            .rows
            .iter()
            .filter(|r| r.table == table)
            .cloned()
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.recorded.lock().rows.len()
    }

    pub fn clear(&self) {
        let mut recorded = self.recorded.lock();
        recorded.inits.clear();
        recorded.rows.clear();
    }
}
