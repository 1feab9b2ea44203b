//! Error types for the tick logger

use std::sync::Arc;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Callback invoked when a table drops a row or one of its sinks fails
///
/// Receives the table name and the error. A dropped row arrives as the
/// error that aborted it; a sink failure on a row other sinks accepted
/// arrives as a [`LoggerError::Sink`].
pub type ErrorCallback = Arc<dyn Fn(&str, &LoggerError) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Setup-time schema violation (bad names, mismatched counts, frozen schema)
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// A row could not be assembled during a tick
    #[error("Unable to log table '{table}': {message}")]
    RuntimeLog {
        table: String,
        message: String,
        #[source]
        source: Option<Box<LoggerError>>,
    },

    /// A loggable reported a failure or panicked while sampling
    #[error("Loggable for column '{column}' failed: {message}")]
    LoggableFailed { column: String, message: String },

    /// A sink rejected an `init` or `update` call
    #[error("Sink '{sink}' failed for table '{table}': {message}")]
    Sink {
        sink: String,
        table: String,
        message: String,
        #[source]
        source: Option<Box<LoggerError>>,
    },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Delimited-file encoding error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        LoggerError::Schema {
            message: message.into(),
        }
    }

    /// Create a runtime logging error without an underlying cause
    pub fn runtime(table: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::RuntimeLog {
            table: table.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a runtime logging error wrapping its cause
    pub fn runtime_caused(
        table: impl Into<String>,
        message: impl Into<String>,
        cause: LoggerError,
    ) -> Self {
        LoggerError::RuntimeLog {
            table: table.into(),
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create a loggable failure
    pub fn loggable(column: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::LoggableFailed {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a sink error, optionally wrapping the sink's own error
    pub fn sink(
        sink: impl Into<String>,
        table: impl Into<String>,
        message: impl Into<String>,
        cause: Option<LoggerError>,
    ) -> Self {
        LoggerError::Sink {
            sink: sink.into(),
            table: table.into(),
            message: message.into(),
            source: cause.map(Box::new),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for setup-time schema errors
    pub fn is_schema(&self) -> bool {
        matches!(self, LoggerError::Schema { .. })
    }

    /// True for errors raised while a sink handled a call
    pub fn is_sink(&self) -> bool {
        matches!(self, LoggerError::Sink { .. })
    }

    /// Render the error followed by its cause chain, `a: b: c`
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

/// Route a dropped-row error to the callback, or to stderr when none is set
pub(crate) fn report(callback: Option<&ErrorCallback>, table: &str, err: &LoggerError) {
    match callback {
        Some(callback) => callback(table, err),
        None => eprintln!("[LOGGER ERROR] Table '{}' dropped a row: {}", table, err.chain()),
    }
}

/// Route a failure of one sink whose row still reached other sinks
pub(crate) fn report_sink_failure(
    callback: Option<&ErrorCallback>,
    table: &str,
    err: &LoggerError,
) {
    match callback {
        Some(callback) => callback(table, err),
        None => eprintln!("[LOGGER ERROR] Table '{}' sink failure: {}", table, err.chain()),
    }
}

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
