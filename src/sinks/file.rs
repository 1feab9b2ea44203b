//! Flat-file sink: one append-only file per table

use crate::core::{LoggerError, Result, Sink};
#[cfg(feature = "file")]
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Default field delimiter
pub const DEFAULT_DELIMITER: u8 = b',';

/// Default file extension
pub const DEFAULT_EXTENSION: &str = "csv";

type TableWriter = csv::Writer<BufWriter<File>>;

/// Writes each table to `<root>/<table>.<extension>`
///
/// The root directory is created on the first `init`. A header of column
/// names is written once, when the file is new or empty; every row is then
/// appended as one CSV record with fields in column order. Fields holding
/// the delimiter, quotes, or line breaks are quoted, so each record parses
/// back to exactly one row. With the `file` feature each file is held under
/// an exclusive advisory lock.
///
/// # Examples
///
/// ```no_run
/// use rust_tick_logger::prelude::*;
///
/// let sink = FileSink::new("/var/log/robot").with_delimiter(b'\t');
/// let logger = Logger::new(shared_sink(sink));
/// ```
pub struct FileSink {
    root: PathBuf,
    delimiter: u8,
    extension: String,
    writers: HashMap<String, TableWriter>,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: DEFAULT_DELIMITER,
            extension: DEFAULT_EXTENSION.to_string(),
            writers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `table`
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.{}", table, self.extension))
    }

    fn open(&self, table: &str) -> Result<(File, bool)> {
        fs::create_dir_all(&self.root).map_err(|e| {
            LoggerError::io_operation(
                "creating log directory",
                self.root.display().to_string(),
                e,
            )
        })?;

        let path = self.table_path(table);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening table file", path.display().to_string(), e)
            })?;

        #[cfg(feature = "file")]
        file.try_lock_exclusive().map_err(|e| {
            LoggerError::io_operation(
                "locking table file",
                format!("{} is held by another writer", path.display()),
                e,
            )
        })?;

        let is_empty = file.metadata()?.len() == 0;
        Ok((file, is_empty))
    }
}

impl Sink for FileSink {
    fn init(&mut self, table: &str, columns: &[String], _type_names: &[String]) -> Result<()> {
        if self.writers.contains_key(table) {
            return Ok(());
        }

        let (file, is_empty) = self.open(table)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        if is_empty {
            writer.write_record(columns)?;
            writer.flush()?;
        }
        self.writers.insert(table.to_string(), writer);
        Ok(())
    }

    fn update(&mut self, table: &str, row: &[String], _columns: &[String]) -> Result<()> {
        let writer = self.writers.get_mut(table).ok_or_else(|| {
            LoggerError::other(format!("File sink has no open file for table '{}'", table))
        })?;
        writer.write_record(row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered rows reach disk
        let _ = self.flush();
    }
}
