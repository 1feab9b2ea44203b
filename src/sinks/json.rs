//! JSON Lines sink for structured row output

use crate::core::{LoggerError, Result, Sink};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// One row as written to disk
#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    table: &'a str,
    fields: serde_json::Map<String, serde_json::Value>,
}

/// Writes each table to `<root>/<table>.jsonl`, one JSON object per row
///
/// Objects map column names to the formatted literals the table produced.
pub struct JsonSink {
    root: PathBuf,
    pretty: bool,
    writers: HashMap<String, BufWriter<File>>,
}

impl JsonSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pretty: false,
            writers: HashMap::new(),
        }
    }

    /// Pretty-print each object (multi-line; not strict JSON Lines)
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.jsonl", table))
    }
}

impl Sink for JsonSink {
    fn init(&mut self, table: &str, _columns: &[String], _type_names: &[String]) -> Result<()> {
        if self.writers.contains_key(table) {
            return Ok(());
        }

        fs::create_dir_all(&self.root)?;
        let path = self.table_path(table);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening table file", path.display().to_string(), e)
            })?;
        self.writers.insert(table.to_string(), BufWriter::new(file));
        Ok(())
    }

    fn update(&mut self, table: &str, row: &[String], columns: &[String]) -> Result<()> {
        let writer = self.writers.get_mut(table).ok_or_else(|| {
            LoggerError::other(format!("JSON sink has no open file for table '{}'", table))
        })?;

        let fields = columns
            .iter()
            .zip(row)
            .map(|(column, value)| (column.clone(), serde_json::Value::String(value.clone())))
            .collect();
        let record = JsonRow { table, fields };

        let json = if self.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}

impl Drop for JsonSink {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
