//! Fan-out of finished rows to a table's sinks
//!
//! The output manager owns a table's finalized schema and its sinks. Every
//! sink is initialized with the schema exactly once, before its first row.

use super::{
    error::{panic_message, LoggerError, Result},
    metrics::LoggerMetrics,
    sink::SharedSink,
    sql_type::ColumnType,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub struct OutputManager {
    table_name: String,
    columns: Vec<String>,
    types: Vec<ColumnType>,
    type_names: Vec<String>,
    sinks: Vec<SharedSink>,
    metrics: Arc<LoggerMetrics>,
}

impl OutputManager {
    /// Create a manager and initialize its first sink
    ///
    /// Fails with a sink error if that sink rejects `init`.
    pub fn new(
        sink: SharedSink,
        table_name: impl Into<String>,
        columns: Vec<String>,
        types: Vec<ColumnType>,
    ) -> Result<Self> {
        Self::with_metrics(sink, table_name, columns, types, Arc::new(LoggerMetrics::new()))
    }

    pub(crate) fn with_metrics(
        sink: SharedSink,
        table_name: impl Into<String>,
        columns: Vec<String>,
        types: Vec<ColumnType>,
        metrics: Arc<LoggerMetrics>,
    ) -> Result<Self> {
        if columns.len() != types.len() {
            return Err(LoggerError::schema(format!(
                "{} columns declared with {} types",
                columns.len(),
                types.len()
            )));
        }

        let type_names = types.iter().map(|t| t.name().to_string()).collect();
        let mut manager = Self {
            table_name: table_name.into(),
            columns,
            types,
            type_names,
            sinks: Vec::new(),
            metrics,
        };
        manager.add_output_method(sink)?;
        Ok(manager)
    }

    /// Best-effort escaping of `\`, `"`, and `--`
    ///
    /// This is not protection against injection. Sinks that splice values
    /// into a query language must parameterize on their own.
    #[must_use]
    pub fn sanitize(value: &str) -> String {
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace("--", "\\--")
    }

    /// Send a formatted row to every sink in registration order
    ///
    /// Each sink is isolated: a failing or panicking sink does not keep the
    /// row from later sinks. When at least one sink accepted the row, the
    /// failures of the others are returned for reporting. When every sink
    /// failed, the first failure is returned as the error.
    pub fn log(&self, row: &[String]) -> Result<Vec<LoggerError>> {
        if row.len() != self.columns.len() {
            return Err(LoggerError::schema(format!(
                "row has {} values but table '{}' has {} columns",
                row.len(),
                self.table_name,
                self.columns.len()
            )));
        }

        let mut failures = Vec::new();
        for sink in &self.sinks {
            let result = catch_unwind(AssertUnwindSafe(|| {
                let mut guard = sink.lock();
                let name = guard.name().to_string();
                (name, guard.update(&self.table_name, row, &self.columns))
            }));

            let failure = match result {
                Ok((_, Ok(()))) => None,
                Ok((name, Err(e))) => Some(LoggerError::sink(
                    name,
                    &self.table_name,
                    "update failed",
                    Some(e),
                )),
                Err(payload) => Some(LoggerError::sink(
                    "<panicked>",
                    &self.table_name,
                    format!("update panicked: {}", panic_message(payload.as_ref())),
                    None,
                )),
            };

            if let Some(err) = failure {
                self.metrics.record_sink_failure();
                failures.push(err);
            }
        }

        if failures.len() < self.sinks.len() {
            return Ok(failures);
        }

        let mut failures = failures.into_iter();
        match failures.next() {
            Some(first) => {
                for err in failures {
                    eprintln!("[LOGGER ERROR] {}", err.chain());
                }
                Err(first)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Initialize a sink with the finalized schema, then attach it
    ///
    /// Rows written before this call are not replayed to the new sink.
    pub fn add_output_method(&mut self, sink: SharedSink) -> Result<()> {
        {
            let mut guard = sink.lock();
            if let Err(e) = guard.init(&self.table_name, &self.columns, &self.type_names) {
                self.metrics.record_sink_failure();
                return Err(LoggerError::sink(
                    guard.name(),
                    &self.table_name,
                    "init failed",
                    Some(e),
                ));
            }
        }
        self.sinks.push(sink);
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        for sink in &self.sinks {
            sink.lock().flush()?;
        }
        Ok(())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn data_type(&self, index: usize) -> Option<&ColumnType> {
        self.types.get(index)
    }

    /// Position of a column, `None` when no column has that name
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}
