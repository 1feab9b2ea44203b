//! Tick driver and table registry

use super::{
    error::{report, ErrorCallback, LoggerError, Result},
    loggable::Loggable,
    logging_mode::LoggingMode,
    metrics::LoggerMetrics,
    sink::{shared_sink, SharedSink},
    sql_type::ColumnType,
    table::{validate_column_name, validate_table_name, Table},
    value::Value,
};
use crate::sinks::FileSink;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Root directory of the file sink used when no default sink is given
pub const DEFAULT_LOG_DIR: &str = "./logs";

/// Tick value before the first call to [`Logger::tick`]
pub const UNSTARTED_TICK: i64 = -1;

struct PendingColumn {
    name: String,
    column_type: ColumnType,
    loggable: Loggable,
}

/// Columns accumulated through [`Logger::add_column`] before the first tick
#[derive(Default)]
struct PendingTable {
    columns: Vec<PendingColumn>,
}

impl PendingTable {
    fn upsert(&mut self, name: &str, column_type: ColumnType, loggable: Loggable) {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => {
                column.column_type = column_type;
                column.loggable = loggable;
            }
            None => self.columns.push(PendingColumn {
                name: name.to_string(),
                column_type,
                loggable,
            }),
        }
    }
}

pub struct Logger {
    tick: i64,
    tables: BTreeMap<String, Table>,
    pending: BTreeMap<String, PendingTable>,
    pending_outputs: HashMap<String, SharedSink>,
    default_sink: SharedSink,
    implicit_mode: LoggingMode,
    on_error: Option<ErrorCallback>,
    /// Tick count; row counters live on each table
    metrics: LoggerMetrics,
}

impl Logger {
    /// Create a logger whose implicit tables write to `default_sink`
    #[must_use]
    pub fn new(default_sink: SharedSink) -> Self {
        Self {
            tick: UNSTARTED_TICK,
            tables: BTreeMap::new(),
            pending: BTreeMap::new(),
            pending_outputs: HashMap::new(),
            default_sink,
            implicit_mode: LoggingMode::Manual,
            on_error: None,
            metrics: LoggerMetrics::new(),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_tick_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .default_sink(shared_sink(MemorySink::new()))
    ///     .implicit_mode(LoggingMode::Automatic)
    ///     .build();
    ///
    /// assert_eq!(logger.get_tick(), -1);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Current tick; `-1` until the first call to [`tick`](Self::tick)
    pub fn get_tick(&self) -> i64 {
        self.tick
    }

    pub fn is_started(&self) -> bool {
        self.tick != UNSTARTED_TICK
    }

    /// Add a column to an implicit table, creating the table if needed
    ///
    /// Only valid before the first tick. Re-adding an existing column
    /// replaces its type and loggable but keeps its position. Tables built
    /// through [`Table::new`] cannot be extended this way.
    pub fn add_column(
        &mut self,
        table: &str,
        column: &str,
        column_type: ColumnType,
        loggable: Loggable,
    ) -> Result<()> {
        if self.is_started() {
            return Err(LoggerError::schema(format!(
                "Cannot add column '{}' to table '{}' after logging has begun",
                column, table
            )));
        }
        validate_table_name(table)?;
        validate_column_name(column)?;

        self.pending
            .entry(table.to_string())
            .or_default()
            .upsert(column, column_type, loggable);
        Ok(())
    }

    /// Choose the sink of an implicit table instead of the default sink
    ///
    /// Only valid before the first tick; tables added with
    /// [`add_table`](Self::add_table) are unaffected.
    pub fn set_table_output(&mut self, table: &str, sink: SharedSink) -> Result<()> {
        if self.is_started() {
            return Err(LoggerError::schema(format!(
                "Cannot set output of table '{}' after logging has begun",
                table
            )));
        }
        validate_table_name(table)?;
        self.pending_outputs.insert(table.to_string(), sink);
        Ok(())
    }

    /// Register a table, replacing any table with the same name
    pub fn add_table(&mut self, mut table: Table) {
        if let (Some(callback), false) = (&self.on_error, table.has_error_callback()) {
            table.set_error_callback(Arc::clone(callback));
        }
        self.tables.insert(table.name().to_string(), table);
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Names of the registered tables, in the order ticks visit them
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Advance one tick and write a row for every table that should log
    ///
    /// The first call freezes implicit tables into concrete tables. Call
    /// this once per control-loop period; the logger keeps no clock.
    pub fn tick(&mut self) -> i64 {
        if !self.is_started() {
            self.materialize_pending();
        }

        self.tick += 1;
        self.metrics.record_tick();

        let tick = self.tick;
        for table in self.tables.values_mut() {
            if table.should_autolog() {
                table.log(tick);
            }
        }
        tick
    }

    /// Write a row for one table at the current tick
    ///
    /// With no values the table samples its loggables. Intended for tables
    /// in manual mode.
    pub fn log_table(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        let tick = self.tick;
        let table = self
            .tables
            .get_mut(name)
            .ok_or_else(|| LoggerError::other(format!("No table named '{}'", name)))?;
        table.log_values(tick, values)
    }

    /// Snapshot of the tick count plus every table's row counters
    pub fn metrics(&self) -> LoggerMetrics {
        let snapshot = self.metrics.clone();
        for table in self.tables.values() {
            snapshot.absorb(table.metrics());
        }
        snapshot
    }

    pub fn flush(&self) -> Result<()> {
        for table in self.tables.values() {
            table.flush()?;
        }
        Ok(())
    }

    fn materialize_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let mut outputs = std::mem::take(&mut self.pending_outputs);

        for (name, definition) in pending {
            let sink = outputs
                .remove(&name)
                .unwrap_or_else(|| Arc::clone(&self.default_sink));

            let mut names = Vec::with_capacity(definition.columns.len());
            let mut types = Vec::with_capacity(definition.columns.len());
            let mut loggables = Vec::with_capacity(definition.columns.len());
            for column in definition.columns {
                names.push(column.name);
                types.push(column.column_type);
                loggables.push(column.loggable);
            }

            let mut table = match Table::new(sink, &name, self.implicit_mode, &names, types) {
                Ok(table) => table,
                Err(err) => {
                    report(self.on_error.as_ref(), &name, &err);
                    continue;
                }
            };
            for (column, loggable) in names.iter().zip(loggables) {
                if let Err(err) = table.set_logger(column, loggable) {
                    report(self.on_error.as_ref(), &name, &err);
                }
            }

            if self.tables.contains_key(&name) {
                eprintln!(
                    "[LOGGER WARNING] Implicit table '{}' replaces a table of the same name",
                    name
                );
            }
            self.add_table(table);
        }
    }
}

impl Default for Logger {
    /// Logger writing implicit tables as files under [`DEFAULT_LOG_DIR`]
    fn default() -> Self {
        Self::new(shared_sink(FileSink::new(DEFAULT_LOG_DIR)))
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_tick_logger::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .default_sink(shared_sink(MemorySink::new()))
///     .on_error(Arc::new(|table, err| {
///         eprintln!("ALERT: {} dropped a row: {}", table, err);
///     }))
///     .build();
/// ```
pub struct LoggerBuilder {
    default_sink: Option<SharedSink>,
    implicit_mode: LoggingMode,
    on_error: Option<ErrorCallback>,
    tables: Vec<Table>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            default_sink: None,
            implicit_mode: LoggingMode::Manual,
            on_error: None,
            tables: Vec::new(),
        }
    }

    /// Sink used by implicit tables without an override
    ///
    /// Defaults to a file sink under [`DEFAULT_LOG_DIR`].
    #[must_use = "builder methods return a new value"]
    pub fn default_sink(mut self, sink: SharedSink) -> Self {
        self.default_sink = Some(sink);
        self
    }

    /// Logging mode given to implicit tables when they are frozen
    ///
    /// Defaults to [`LoggingMode::Manual`].
    #[must_use = "builder methods return a new value"]
    pub fn implicit_mode(mut self, mode: LoggingMode) -> Self {
        self.implicit_mode = mode;
        self
    }

    /// Callback for rows dropped by any table that has none of its own
    #[must_use = "builder methods return a new value"]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Register an explicit table
    #[must_use = "builder methods return a new value"]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let default_sink = self
            .default_sink
            .unwrap_or_else(|| shared_sink(FileSink::new(DEFAULT_LOG_DIR)));

        let mut logger = Logger::new(default_sink);
        logger.implicit_mode = self.implicit_mode;
        logger.on_error = self.on_error;
        for table in self.tables {
            logger.add_table(table);
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sql_type::types;
    use crate::sinks::{MemoryHandle, MemorySink};
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    fn memory_logger(mode: LoggingMode) -> (Logger, MemoryHandle) {
        let sink = MemorySink::new();
        let handle = sink.handle();
        let logger = Logger::builder()
            .default_sink(shared_sink(sink))
            .implicit_mode(mode)
            .build();
        (logger, handle)
    }

    fn explicit_table(name: &str, mode: LoggingMode, sink: SharedSink) -> Table {
        let mut table = Table::new(sink, name, mode, &["Value"], vec![types::int()]).unwrap();
        table.set_loggers(vec![Loggable::new(|| 1)]).unwrap();
        table
    }

    #[test]
    fn test_first_tick_starts_counter() {
        let (mut logger, _) = memory_logger(LoggingMode::Manual);
        assert_eq!(logger.get_tick(), UNSTARTED_TICK);
        assert!(!logger.is_started());

        assert_eq!(logger.tick(), 0);
        assert!(logger.is_started());
        assert_eq!(logger.tick(), 1);
        assert_eq!(logger.metrics().ticks(), 2);
    }

    #[test]
    fn test_add_column_rejected_after_start() {
        let (mut logger, _) = memory_logger(LoggingMode::Manual);
        logger
            .add_column("Drive", "Speed", types::decimal(), Loggable::new(|| 1.0))
            .unwrap();
        logger.tick();

        let err = logger
            .add_column("Drive", "Heading", types::decimal(), Loggable::new(|| 0.0))
            .unwrap_err();
        assert!(err.is_schema());

        let err = logger
            .set_table_output("Drive", shared_sink(MemorySink::new()))
            .unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_add_column_validates_names() {
        let (mut logger, _) = memory_logger(LoggingMode::Manual);
        assert!(logger
            .add_column("Bad Name", "A", types::int(), Loggable::new(|| 1))
            .unwrap_err()
            .is_schema());
        assert!(logger
            .add_column("Good", "Timestamp", types::int(), Loggable::new(|| 1))
            .unwrap_err()
            .is_schema());
    }

    #[test]
    fn test_implicit_tables_materialize_once() {
        let (mut logger, handle) = memory_logger(LoggingMode::Manual);
        logger
            .add_column("Drive", "Speed", types::decimal(), Loggable::new(|| 1.0))
            .unwrap();
        logger
            .add_column("Drive", "Enabled", types::boolean(), Loggable::new(|| true))
            .unwrap();
        logger
            .add_column("Arm", "Angle", types::decimal(), Loggable::new(|| 0.5))
            .unwrap();

        assert!(logger.get_table("Drive").is_none());
        logger.tick();
        logger.tick();
        logger.tick();

        assert_eq!(handle.init_count(), 2);
        let drive = logger.get_table("Drive").unwrap();
        assert_eq!(drive.mode(), LoggingMode::Manual);
        assert_eq!(
            drive.columns(),
            &["Timestamp", "Tick_Number", "Speed", "Enabled"]
        );
        // manual tables never auto-log
        assert_eq!(handle.row_count(), 0);
        assert_eq!(logger.table_names(), vec!["Arm", "Drive"]);
    }

    #[test]
    fn test_implicit_tables_in_automatic_mode_log_every_tick() {
        let (mut logger, handle) = memory_logger(LoggingMode::Automatic);
        logger
            .add_column("Drive", "Speed", types::decimal(), Loggable::new(|| 2.5))
            .unwrap();

        for _ in 0..3 {
            logger.tick();
        }

        let rows = handle.rows_for("Drive");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].row[1], "2");
        assert_eq!(rows[2].row[2], "2.5");
    }

    #[test]
    fn test_re_adding_column_overwrites_in_place() {
        let (mut logger, handle) = memory_logger(LoggingMode::Automatic);
        logger
            .add_column("Drive", "Speed", types::int(), Loggable::new(|| 1))
            .unwrap();
        logger
            .add_column("Drive", "Heading", types::int(), Loggable::new(|| 2))
            .unwrap();
        logger
            .add_column("Drive", "Speed", types::decimal(), Loggable::new(|| 3.5))
            .unwrap();

        logger.tick();

        let inits = handle.inits();
        assert_eq!(inits[0].columns, vec!["Timestamp", "Tick_Number", "Speed", "Heading"]);
        assert_eq!(inits[0].type_names[2], "DECIMAL");
        assert_eq!(&handle.rows()[0].row[2..], &["3.5", "2"]);
    }

    #[test]
    fn test_set_table_output_overrides_default() {
        let (mut logger, default_handle) = memory_logger(LoggingMode::Automatic);
        let special = MemorySink::new();
        let special_handle = special.handle();

        logger
            .add_column("Drive", "Speed", types::int(), Loggable::new(|| 1))
            .unwrap();
        logger
            .add_column("Arm", "Angle", types::int(), Loggable::new(|| 2))
            .unwrap();
        logger
            .set_table_output("Arm", shared_sink(special))
            .unwrap();

        logger.tick();

        assert_eq!(default_handle.rows_for("Drive").len(), 1);
        assert!(default_handle.rows_for("Arm").is_empty());
        assert_eq!(special_handle.rows_for("Arm").len(), 1);
    }

    #[test]
    fn test_add_table_replaces_same_name() {
        let (mut logger, _) = memory_logger(LoggingMode::Manual);
        let first = MemorySink::new();
        let second = MemorySink::new();
        let (h1, h2) = (first.handle(), second.handle());

        logger.add_table(explicit_table("Drive", LoggingMode::Automatic, shared_sink(first)));
        logger.add_table(explicit_table("Drive", LoggingMode::Automatic, shared_sink(second)));
        logger.tick();

        assert_eq!(h1.row_count(), 0);
        assert_eq!(h2.row_count(), 1);
        assert_eq!(logger.table_names(), vec!["Drive"]);
    }

    #[test]
    fn test_criteria_table_gated_by_tick() {
        let (mut logger, _) = memory_logger(LoggingMode::Manual);
        let sink = MemorySink::new();
        let handle = sink.handle();
        let current = Arc::new(AtomicI64::new(UNSTARTED_TICK));

        let mut table = explicit_table("Even", LoggingMode::Criteria, shared_sink(sink));
        let seen = Arc::clone(&current);
        table.add_logging_criteria(move || seen.load(Ordering::Relaxed) % 2 == 0);
        logger.add_table(table);

        for i in 0..10 {
            // criteria observe the tick about to be logged
            current.store(i, Ordering::Relaxed);
            logger.tick();
        }

        let ticks: Vec<String> = handle.rows().iter().map(|r| r.row[1].clone()).collect();
        assert_eq!(ticks, vec!["0", "2", "4", "6", "8"]);
    }

    #[test]
    fn test_failing_table_does_not_block_others() {
        let errors = Arc::new(AtomicUsize::new(0));
        let errors_clone = Arc::clone(&errors);
        let sink = MemorySink::new();
        let handle = sink.handle();
        let shared = shared_sink(sink);

        let mut logger = Logger::builder()
            .default_sink(Arc::clone(&shared))
            .on_error(Arc::new(move |_, _| {
                errors_clone.fetch_add(1, Ordering::Relaxed);
            }))
            .build();

        let mut broken = explicit_table("Broken", LoggingMode::Automatic, Arc::clone(&shared));
        broken
            .set_loggers(vec![Loggable::new(|| -> i32 { panic!("encoder fault") })])
            .unwrap();
        logger.add_table(broken);
        logger.add_table(explicit_table("Healthy", LoggingMode::Automatic, shared));

        logger.tick();
        logger.tick();

        assert_eq!(errors.load(Ordering::Relaxed), 2);
        assert!(handle.rows_for("Broken").is_empty());
        assert_eq!(handle.rows_for("Healthy").len(), 2);

        let metrics = logger.metrics();
        assert_eq!(metrics.total_logged(), 2);
        assert_eq!(metrics.dropped_count(), 2);
    }

    #[test]
    fn test_log_table_manual() {
        let (mut logger, _) = memory_logger(LoggingMode::Manual);
        let sink = MemorySink::new();
        let handle = sink.handle();
        logger.add_table(explicit_table("Events", LoggingMode::Manual, shared_sink(sink)));

        logger.tick();
        logger.tick();
        assert_eq!(handle.row_count(), 0);

        logger.log_table("Events", vec![Value::from(42)]).unwrap();
        logger.log_table("Events", Vec::new()).unwrap();

        let rows = handle.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row[1..], ["1", "42"]);
        assert_eq!(rows[1].row[1..], ["1", "1"]);

        assert!(logger.log_table("Missing", Vec::new()).is_err());
    }

    #[test]
    fn test_set_table_output_ignores_explicit_tables() {
        let (mut logger, _) = memory_logger(LoggingMode::Manual);
        let own = MemorySink::new();
        let other = MemorySink::new();
        let (own_handle, other_handle) = (own.handle(), other.handle());

        logger.add_table(explicit_table("Events", LoggingMode::Automatic, shared_sink(own)));
        logger
            .set_table_output("Events", shared_sink(other))
            .unwrap();

        logger.tick();
        logger.tick();

        assert_eq!(own_handle.row_count(), 2);
        assert_eq!(other_handle.init_count(), 0);
        assert_eq!(other_handle.row_count(), 0);
        assert_eq!(logger.get_table("Events").unwrap().output().sink_count(), 1);
    }

    #[test]
    fn test_get_table_unknown_is_none() {
        let (logger, _) = memory_logger(LoggingMode::Manual);
        assert!(logger.get_table("Nope").is_none());
    }
}
