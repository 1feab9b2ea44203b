//! Logging tables
//!
//! A table owns its schema, its logging mode and criteria, and the loggables
//! bound to its user columns. Every row starts with two synthetic columns,
//! `Timestamp` and `Tick_Number`, followed by the user columns in declared
//! order.

use super::{
    error::{report, report_sink_failure, ErrorCallback, LoggerError, Result},
    loggable::{Criteria, Loggable},
    logging_mode::LoggingMode,
    metrics::LoggerMetrics,
    output_manager::OutputManager,
    sink::SharedSink,
    sql_type::{ColumnType, DateTime, Int, SqlType},
    value::Value,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// Name of the synthetic timestamp column
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Name of the synthetic tick column
pub const TICK_COLUMN: &str = "Tick_Number";

/// Number of synthetic columns ahead of the user columns
pub const SYNTHETIC_COLUMNS: usize = 2;

/// True when `name` is one or more ASCII letters, digits, or underscores
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn validate_table_name(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(LoggerError::schema(format!("Invalid table name '{}'", name)))
    }
}

pub(crate) fn validate_column_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LoggerError::schema("Column names must not be empty"));
    }
    if name == TIMESTAMP_COLUMN || name == TICK_COLUMN {
        return Err(LoggerError::schema(format!(
            "Column '{}' is reserved for the synthetic columns",
            name
        )));
    }
    Ok(())
}

pub struct Table {
    name: String,
    mode: LoggingMode,
    output: OutputManager,
    loggables: Vec<Option<Loggable>>,
    criteria: Vec<Criteria>,
    metrics: Arc<LoggerMetrics>,
    on_error: Option<ErrorCallback>,
}

impl Table {
    /// Create a table and initialize its first sink
    ///
    /// `columns[i]` is typed by `types[i]`. The synthetic columns are added
    /// automatically and must not be listed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_tick_logger::prelude::*;
    ///
    /// let table = Table::new(
    ///     shared_sink(MemorySink::new()),
    ///     "Drive",
    ///     LoggingMode::Automatic,
    ///     &["Speed", "Enabled"],
    ///     vec![types::decimal(), types::boolean()],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.column_count(), 4);
    /// ```
    pub fn new<S: AsRef<str>>(
        sink: SharedSink,
        name: &str,
        mode: LoggingMode,
        columns: &[S],
        types: Vec<ColumnType>,
    ) -> Result<Self> {
        validate_table_name(name)?;
        if columns.len() != types.len() {
            return Err(LoggerError::schema(format!(
                "Table '{}' declares {} columns but {} types",
                name,
                columns.len(),
                types.len()
            )));
        }

        let mut seen = HashSet::new();
        for column in columns {
            let column = column.as_ref();
            validate_column_name(column)?;
            if !seen.insert(column) {
                return Err(LoggerError::schema(format!(
                    "Column '{}' is declared twice in table '{}'",
                    column, name
                )));
            }
        }

        let mut all_columns = Vec::with_capacity(columns.len() + SYNTHETIC_COLUMNS);
        all_columns.push(TIMESTAMP_COLUMN.to_string());
        all_columns.push(TICK_COLUMN.to_string());
        all_columns.extend(columns.iter().map(|c| c.as_ref().to_string()));

        let mut all_types: Vec<ColumnType> = Vec::with_capacity(types.len() + SYNTHETIC_COLUMNS);
        all_types.push(Arc::new(DateTime::new()));
        all_types.push(Arc::new(Int));
        all_types.extend(types);

        let metrics = Arc::new(LoggerMetrics::new());
        let output =
            OutputManager::with_metrics(sink, name, all_columns, all_types, Arc::clone(&metrics))?;

        Ok(Self {
            name: name.to_string(),
            mode,
            output,
            loggables: (0..columns.len()).map(|_| None).collect(),
            criteria: Vec::new(),
            metrics,
            on_error: None,
        })
    }

    /// Create a builder for a table named `name`
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> LoggingMode {
        self.mode
    }

    /// Total column count, synthetic columns included
    pub fn column_count(&self) -> usize {
        self.output.column_count()
    }

    pub fn user_column_count(&self) -> usize {
        self.loggables.len()
    }

    pub fn columns(&self) -> &[String] {
        self.output.columns()
    }

    pub fn output(&self) -> &OutputManager {
        &self.output
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn criteria_count(&self) -> usize {
        self.criteria.len()
    }

    /// Route dropped-row errors to `callback` instead of stderr
    pub fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.on_error = Some(callback);
    }

    pub(crate) fn has_error_callback(&self) -> bool {
        self.on_error.is_some()
    }

    /// Replace every binding; `loggables[i]` feeds user column `i`
    pub fn set_loggers(&mut self, loggables: Vec<Loggable>) -> Result<()> {
        if loggables.len() != self.user_column_count() {
            return Err(LoggerError::schema(format!(
                "Unable to set loggables: table '{}' has {} user columns but {} loggables were given",
                self.name,
                self.user_column_count(),
                loggables.len()
            )));
        }
        self.loggables = loggables.into_iter().map(Some).collect();
        Ok(())
    }

    /// Replace the binding of one user column
    pub fn set_logger(&mut self, column: &str, loggable: Loggable) -> Result<()> {
        match self.output.column_index(column) {
            Some(index) if index >= SYNTHETIC_COLUMNS => {
                self.loggables[index - SYNTHETIC_COLUMNS] = Some(loggable);
                Ok(())
            }
            Some(_) => Err(LoggerError::schema(format!(
                "Tried to set loggable on synthetic column '{}'",
                column
            ))),
            None => Err(LoggerError::schema(format!(
                "Tried to set loggable on unknown column '{}' of table '{}'",
                column, self.name
            ))),
        }
    }

    /// Add a predicate; in criteria mode all predicates must hold to log
    pub fn add_logging_criteria<F>(&mut self, criteria: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.criteria.push(Box::new(criteria));
    }

    /// Whether the logger should write a row for this table on this tick
    ///
    /// In criteria mode every predicate is called on every check, even
    /// after one has returned false.
    pub fn should_autolog(&mut self) -> bool {
        match self.mode {
            LoggingMode::Automatic => true,
            LoggingMode::Criteria => self
                .criteria
                .iter_mut()
                .fold(true, |passed, criteria| criteria() && passed),
            LoggingMode::Manual => false,
        }
    }

    /// Sample every loggable and write the row
    ///
    /// Failures are reported to the error callback (stderr by default) and
    /// drop this row only. Returns whether the row was written.
    pub fn log(&mut self, tick: i64) -> bool {
        match self.log_values(tick, Vec::new()) {
            Ok(()) => true,
            Err(err) => {
                report(self.on_error.as_ref(), &self.name, &err);
                false
            }
        }
    }

    /// Write a row from explicit values
    ///
    /// With no values the loggables are sampled instead. Otherwise exactly
    /// one value per user column is required; the given values are
    /// validated and persisted. Any failure drops the whole row, except a
    /// sink failure while another sink still took the row: that row counts
    /// as logged and the failure is reported on its own.
    pub fn log_values(&mut self, tick: i64, values: Vec<Value>) -> Result<()> {
        let values = if values.is_empty() {
            self.sample_all()
        } else if values.len() != self.user_column_count() {
            Err(LoggerError::schema(format!(
                "Unable to log: table '{}' has {} user columns but {} values were given",
                self.name,
                self.user_column_count(),
                values.len()
            )))
        } else {
            Ok(values)
        };

        let result = values.and_then(|values| self.write_row(tick, &values));
        match result {
            Ok(sink_failures) => {
                self.metrics.record_logged();
                for err in &sink_failures {
                    report_sink_failure(self.on_error.as_ref(), &self.name, err);
                }
                Ok(())
            }
            Err(err) => {
                self.metrics.record_dropped();
                Err(err)
            }
        }
    }

    /// Initialize `sink` with this table's schema and attach it
    pub fn add_output_method(&mut self, sink: SharedSink) -> Result<()> {
        self.output.add_output_method(sink)
    }

    pub fn flush(&self) -> Result<()> {
        self.output.flush()
    }

    fn sample_all(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(self.loggables.len());
        for (i, slot) in self.loggables.iter_mut().enumerate() {
            let column = self
                .output
                .column_name(i + SYNTHETIC_COLUMNS)
                .unwrap_or_default();
            let loggable = slot.as_mut().ok_or_else(|| {
                LoggerError::runtime(&self.name, format!("column '{}' has no loggable bound", column))
            })?;
            let value = loggable.sample(column).map_err(|e| {
                LoggerError::runtime_caused(&self.name, "sampling failed", e)
            })?;
            values.push(value);
        }
        Ok(values)
    }

    fn write_row(&self, tick: i64, values: &[Value]) -> Result<Vec<LoggerError>> {
        let mut row = Vec::with_capacity(self.column_count());
        row.push(DateTime::new().reformat(&Value::Timestamp(Utc::now())));
        row.push(Int.reformat(&Value::Int(tick)));

        for (i, value) in values.iter().enumerate() {
            let index = i + SYNTHETIC_COLUMNS;
            let (Some(column), Some(column_type)) =
                (self.output.column_name(index), self.output.data_type(index))
            else {
                return Err(LoggerError::runtime(&self.name, "value count exceeds schema"));
            };

            if !column_type.validate(value) {
                return Err(LoggerError::runtime(
                    &self.name,
                    format!(
                        "{} value '{}' for column '{}' does not conform to type {}",
                        value.type_name(),
                        value,
                        column,
                        column_type.name()
                    ),
                ));
            }
            row.push(OutputManager::sanitize(&column_type.reformat(value)));
        }

        self.output.log(&row).map_err(|e| {
            LoggerError::runtime_caused(&self.name, "delivery to sinks failed", e)
        })
    }
}

/// Builder for constructing a [`Table`] with a fluent API
///
/// # Example
///
/// ```
/// use rust_tick_logger::prelude::*;
///
/// let mut table = Table::builder("Arm")
///     .mode(LoggingMode::Automatic)
///     .sink(shared_sink(MemorySink::new()))
///     .column_with("Angle", types::decimal(), Loggable::new(|| 42.0))
///     .column_with("Homed", types::boolean(), Loggable::new(|| true))
///     .build()
///     .unwrap();
///
/// assert!(table.should_autolog());
/// assert!(table.log(0));
/// ```
pub struct TableBuilder {
    name: String,
    mode: LoggingMode,
    columns: Vec<(String, ColumnType, Option<Loggable>)>,
    sinks: Vec<SharedSink>,
    criteria: Vec<Criteria>,
    on_error: Option<ErrorCallback>,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: LoggingMode::default(),
            columns: Vec::new(),
            sinks: Vec::new(),
            criteria: Vec::new(),
            on_error: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn mode(mut self, mode: LoggingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a user column without a loggable
    #[must_use = "builder methods return a new value"]
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push((name.into(), column_type, None));
        self
    }

    /// Add a user column bound to `loggable`
    #[must_use = "builder methods return a new value"]
    pub fn column_with(
        mut self,
        name: impl Into<String>,
        column_type: ColumnType,
        loggable: Loggable,
    ) -> Self {
        self.columns.push((name.into(), column_type, Some(loggable)));
        self
    }

    /// Add a sink; the first one is initialized when the table is built
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn criteria<F>(mut self, criteria: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.criteria.push(Box::new(criteria));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Build the table, initializing every sink in order
    pub fn build(self) -> Result<Table> {
        let mut sinks = self.sinks.into_iter();
        let first = sinks.next().ok_or_else(|| {
            LoggerError::schema(format!("Table '{}' needs at least one sink", self.name))
        })?;

        let mut names = Vec::with_capacity(self.columns.len());
        let mut types = Vec::with_capacity(self.columns.len());
        let mut loggables = Vec::with_capacity(self.columns.len());
        for (name, column_type, loggable) in self.columns {
            names.push(name);
            types.push(column_type);
            loggables.push(loggable);
        }

        let mut table = Table::new(first, &self.name, self.mode, &names, types)?;
        for sink in sinks {
            table.add_output_method(sink)?;
        }
        table.loggables = loggables;
        table.criteria = self.criteria;
        table.on_error = self.on_error;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::{shared_sink, Sink};
    use crate::core::sql_type::types;
    use crate::sinks::{MemoryHandle, MemorySink};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct RefusingSink;

    impl Sink for RefusingSink {
        fn init(&mut self, _: &str, _: &[String], _: &[String]) -> Result<()> {
            Ok(())
        }

        fn update(&mut self, _: &str, _: &[String], _: &[String]) -> Result<()> {
            Err(LoggerError::other("disk full"))
        }

        fn name(&self) -> &str {
            "refusing"
        }
    }

    fn test_table(mode: LoggingMode) -> (Table, MemoryHandle) {
        let sink = MemorySink::new();
        let handle = sink.handle();
        let table = Table::new(
            shared_sink(sink),
            "Test",
            mode,
            &["Word", "ABoolean", "AnInt", "ADecimal"],
            vec![
                types::varchar(),
                types::boolean(),
                types::int(),
                types::decimal(),
            ],
        )
        .unwrap();
        (table, handle)
    }

    fn sample_loggers() -> Vec<Loggable> {
        vec![
            Loggable::new(|| "x"),
            Loggable::new(|| true),
            Loggable::new(|| 5),
            Loggable::new(|| 1.5),
        ]
    }

    #[test]
    fn test_schema_has_synthetic_columns() {
        let (table, handle) = test_table(LoggingMode::Manual);

        assert_eq!(table.column_count(), 6);
        assert_eq!(table.user_column_count(), 4);
        assert_eq!(table.columns()[0], TIMESTAMP_COLUMN);
        assert_eq!(table.columns()[1], TICK_COLUMN);
        assert_eq!(table.output().data_type(0).map(|t| t.name()), Some("DATETIME"));
        assert_eq!(table.output().data_type(1).map(|t| t.name()), Some("INT"));
        assert_eq!(handle.init_count(), 1);
    }

    #[test]
    fn test_table_name_validation() {
        for bad in ["", "Bad-Name", "has space", "semi;colon"] {
            let result = Table::new(
                shared_sink(MemorySink::new()),
                bad,
                LoggingMode::Manual,
                &["A"],
                vec![types::int()],
            );
            assert!(result.err().is_some_and(|e| e.is_schema()), "accepted {:?}", bad);
        }

        for good in ["a", "Drive_Train", "table2", "_x_"] {
            let result = Table::new(
                shared_sink(MemorySink::new()),
                good,
                LoggingMode::Manual,
                &["A"],
                vec![types::int()],
            );
            assert!(result.is_ok(), "rejected {:?}", good);
        }
    }

    #[test]
    fn test_column_declaration_errors() {
        let mismatched = Table::new(
            shared_sink(MemorySink::new()),
            "T",
            LoggingMode::Manual,
            &["A", "B"],
            vec![types::int()],
        );
        assert!(mismatched.err().is_some_and(|e| e.is_schema()));

        let duplicate = Table::new(
            shared_sink(MemorySink::new()),
            "T",
            LoggingMode::Manual,
            &["A", "A"],
            vec![types::int(), types::int()],
        );
        assert!(duplicate.err().is_some_and(|e| e.is_schema()));

        let reserved = Table::new(
            shared_sink(MemorySink::new()),
            "T",
            LoggingMode::Manual,
            &[TICK_COLUMN],
            vec![types::int()],
        );
        assert!(reserved.err().is_some_and(|e| e.is_schema()));
    }

    #[test]
    fn test_automatic_always_autologs() {
        let (mut table, _) = test_table(LoggingMode::Automatic);
        for _ in 0..5 {
            assert!(table.should_autolog());
        }
    }

    #[test]
    fn test_manual_never_autologs() {
        let (mut table, _) = test_table(LoggingMode::Manual);
        table.add_logging_criteria(|| true);
        assert!(!table.should_autolog());
    }

    #[test]
    fn test_criteria_are_anded() {
        let (mut table, _) = test_table(LoggingMode::Criteria);
        assert!(table.should_autolog(), "empty criteria is vacuously true");

        let gate = Arc::new(AtomicBool::new(true));
        let gate_clone = Arc::clone(&gate);
        table.add_logging_criteria(|| true);
        table.add_logging_criteria(move || gate_clone.load(Ordering::Relaxed));
        assert_eq!(table.criteria_count(), 2);
        assert!(table.should_autolog());

        gate.store(false, Ordering::Relaxed);
        assert!(!table.should_autolog());
    }

    #[test]
    fn test_every_criteria_called_each_check() {
        let (mut table, _) = test_table(LoggingMode::Criteria);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        table.add_logging_criteria(|| false);
        table.add_logging_criteria(move || {
            calls_clone.fetch_add(1, Ordering::Relaxed);
            true
        });

        assert!(!table.should_autolog());
        assert!(!table.should_autolog());
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_set_loggers_length_checked() {
        let (mut table, _) = test_table(LoggingMode::Automatic);
        let err = table
            .set_loggers(vec![Loggable::new(|| 1)])
            .unwrap_err();
        assert!(err.is_schema());
        assert!(table.set_loggers(sample_loggers()).is_ok());
    }

    #[test]
    fn test_log_formats_row() {
        let (mut table, handle) = test_table(LoggingMode::Automatic);
        table.set_loggers(sample_loggers()).unwrap();

        assert!(table.log(7));

        let rows = handle.rows();
        assert_eq!(rows.len(), 1);
        let row = &rows[0].row;
        assert_eq!(row.len(), 6);
        assert!(row[0].starts_with('\'') && row[0].ends_with('\''));
        assert_eq!(row[1], "7");
        assert_eq!(&row[2..], &["'x'", "true", "5", "1.5"]);
        assert_eq!(table.metrics().total_logged(), 1);
    }

    #[test]
    fn test_set_logger_rejects_synthetic_and_unknown() {
        let (mut table, _) = test_table(LoggingMode::Automatic);
        assert!(table
            .set_logger(TIMESTAMP_COLUMN, Loggable::new(|| 1))
            .unwrap_err()
            .is_schema());
        assert!(table
            .set_logger(TICK_COLUMN, Loggable::new(|| 1))
            .unwrap_err()
            .is_schema());
        assert!(table
            .set_logger("Nope", Loggable::new(|| 1))
            .unwrap_err()
            .is_schema());
    }

    #[test]
    fn test_set_logger_replaces_one_binding() {
        let (mut table, handle) = test_table(LoggingMode::Automatic);
        table.set_loggers(sample_loggers()).unwrap();
        table
            .set_logger("Word", Loggable::new(|| "changed"))
            .unwrap();

        assert!(table.log(0));
        assert_eq!(handle.rows()[0].row[2], "'changed'");
    }

    #[test]
    fn test_unbound_column_drops_row() {
        let (mut table, handle) = test_table(LoggingMode::Automatic);
        let errors = Arc::new(AtomicUsize::new(0));
        let errors_clone = Arc::clone(&errors);
        table.set_error_callback(Arc::new(move |_, _| {
            errors_clone.fetch_add(1, Ordering::Relaxed);
        }));

        assert!(!table.log(0));
        assert_eq!(handle.row_count(), 0);
        assert_eq!(errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_type_mismatch_drops_whole_row() {
        let (mut table, handle) = test_table(LoggingMode::Automatic);
        table
            .set_loggers(vec![
                Loggable::new(|| "x"),
                Loggable::new(|| true),
                Loggable::new(|| "not an int"),
                Loggable::new(|| 1.5),
            ])
            .unwrap();
        table.set_error_callback(Arc::new(|table, err| {
            assert_eq!(table, "Test");
            assert!(err.to_string().contains("AnInt"));
        }));

        assert!(!table.log(0));
        assert_eq!(handle.row_count(), 0);
        assert_eq!(table.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_failing_loggable_recovers_next_tick() {
        let (mut table, handle) = test_table(LoggingMode::Automatic);
        let fail = Arc::new(AtomicBool::new(true));
        let fail_clone = Arc::clone(&fail);
        table
            .set_loggers(vec![
                Loggable::fallible(move || {
                    if fail_clone.load(Ordering::Relaxed) {
                        Err("sensor offline")
                    } else {
                        Ok("ok")
                    }
                }),
                Loggable::new(|| true),
                Loggable::new(|| 5),
                Loggable::new(|| 1.5),
            ])
            .unwrap();
        table.set_error_callback(Arc::new(|_, _| {}));

        assert!(!table.log(0));
        assert_eq!(handle.row_count(), 0);

        fail.store(false, Ordering::Relaxed);
        assert!(table.log(1));
        assert_eq!(handle.row_count(), 1);
        assert_eq!(handle.rows()[0].row[1], "1");
    }

    #[test]
    fn test_log_values_persists_arguments() {
        let (mut table, handle) = test_table(LoggingMode::Manual);
        table.set_loggers(sample_loggers()).unwrap();

        table
            .log_values(
                3,
                vec![
                    Value::from("manual"),
                    Value::from(false),
                    Value::from(9),
                    Value::from(2.25),
                ],
            )
            .unwrap();

        assert_eq!(&handle.rows()[0].row[2..], &["'manual'", "false", "9", "2.25"]);
    }

    #[test]
    fn test_log_values_without_arguments_samples() {
        let (mut table, handle) = test_table(LoggingMode::Manual);
        table.set_loggers(sample_loggers()).unwrap();

        table.log_values(0, Vec::new()).unwrap();
        assert_eq!(&handle.rows()[0].row[2..], &["'x'", "true", "5", "1.5"]);
    }

    #[test]
    fn test_log_values_count_checked() {
        let (mut table, handle) = test_table(LoggingMode::Manual);
        let err = table
            .log_values(0, vec![Value::from("x"), Value::from(true)])
            .unwrap_err();
        assert!(err.is_schema());
        assert_eq!(handle.row_count(), 0);
    }

    #[test]
    fn test_values_are_sanitized() {
        let (mut table, handle) = test_table(LoggingMode::Manual);
        table
            .log_values(
                0,
                vec![
                    Value::from(r#"a "quoted" -- word"#),
                    Value::from(true),
                    Value::from(1),
                    Value::from(1.0),
                ],
            )
            .unwrap();

        assert_eq!(handle.rows()[0].row[2], r#"'a \"quoted\" \-- word'"#);
    }

    #[test]
    fn test_builder() {
        let sink = MemorySink::new();
        let second = MemorySink::new();
        let (h1, h2) = (sink.handle(), second.handle());

        let mut table = Table::builder("Arm")
            .mode(LoggingMode::Criteria)
            .sink(shared_sink(sink))
            .sink(shared_sink(second))
            .column_with("Angle", types::decimal(), Loggable::new(|| 42.0))
            .criteria(|| true)
            .build()
            .unwrap();

        assert_eq!(table.criteria_count(), 1);
        assert!(table.should_autolog());
        assert!(table.log(0));
        assert_eq!(h1.row_count(), 1);
        assert_eq!(h2.init_count(), 1);
        assert_eq!(h2.row_count(), 1);
    }

    #[test]
    fn test_partial_sink_failure_still_logs_row() {
        let healthy = MemorySink::new();
        let handle = healthy.handle();
        let reported = Arc::new(AtomicUsize::new(0));
        let reported_clone = Arc::clone(&reported);

        let mut table = Table::builder("Arm")
            .mode(LoggingMode::Automatic)
            .sink(shared_sink(RefusingSink))
            .sink(shared_sink(healthy))
            .column_with("Angle", types::decimal(), Loggable::new(|| 42.0))
            .on_error(Arc::new(move |_, err| {
                assert!(err.is_sink());
                reported_clone.fetch_add(1, Ordering::Relaxed);
            }))
            .build()
            .unwrap();

        assert!(table.log(0));
        assert_eq!(handle.row_count(), 1);
        assert_eq!(reported.load(Ordering::Relaxed), 1);
        assert_eq!(table.metrics().total_logged(), 1);
        assert_eq!(table.metrics().dropped_count(), 0);
        assert_eq!(table.metrics().sink_failures(), 1);
    }

    #[test]
    fn test_only_sink_failing_drops_row() {
        let mut table = Table::builder("Arm")
            .mode(LoggingMode::Automatic)
            .sink(shared_sink(RefusingSink))
            .column_with("Angle", types::decimal(), Loggable::new(|| 42.0))
            .on_error(Arc::new(|_, err| {
                assert!(matches!(err, LoggerError::RuntimeLog { .. }));
            }))
            .build()
            .unwrap();

        assert!(!table.log(0));
        assert_eq!(table.metrics().dropped_count(), 1);
        assert_eq!(table.metrics().total_logged(), 0);
    }

    #[test]
    fn test_builder_requires_sink() {
        let result = Table::builder("Arm").column("Angle", types::decimal()).build();
        assert!(result.err().is_some_and(|e| e.is_schema()));
    }
}
