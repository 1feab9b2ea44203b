//! # Rust Tick Logger
//!
//! Periodic telemetry logging for control-loop applications such as robot
//! controllers. On every tick of an external scheduler, each registered
//! table decides whether to log, samples its bound values, validates and
//! formats them against the column types, and sends the row to its sinks.
//!
//! ## Features
//!
//! - **Typed Tables**: `Timestamp` and `Tick_Number` columns plus typed user columns
//! - **Logging Modes**: automatic, criteria-gated, or manual
//! - **Implicit Tables**: build schemas column by column before the first tick
//! - **Multiple Sinks**: file, JSON, console, and custom sinks per table
//!
//! ## Example
//!
//! ```
//! use rust_tick_logger::prelude::*;
//!
//! let sink = MemorySink::new();
//! let rows = sink.handle();
//! let mut logger = Logger::builder()
//!     .default_sink(shared_sink(sink))
//!     .implicit_mode(LoggingMode::Automatic)
//!     .build();
//!
//! logger.add_column("Drive", "Speed", types::decimal(), Loggable::new(|| 1.5)).unwrap();
//! logger.tick();
//!
//! assert_eq!(rows.rows_for("Drive")[0].row[2], "1.5");
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::sinks::ConsoleSink;
    pub use crate::sinks::{FileSink, JsonSink, MemoryHandle, MemorySink};
    pub use crate::core::{
        shared_sink, types, ColumnType, ErrorCallback, Loggable, Logger, LoggerBuilder,
        LoggerError, LoggerMetrics, LoggingMode, Result, SharedSink, Sink, SqlType, Table,
        TableBuilder, TimestampFormat, Value,
    };
}

#[cfg(feature = "console")]
pub use crate::sinks::ConsoleSink;
pub use crate::sinks::{FileSink, JsonSink, MemoryHandle, MemorySink};
pub use crate::core::{
    is_valid_identifier, shared_sink, types, Bool, ColumnType, Criteria, DateTime, Decimal,
    ErrorCallback, Int, Loggable, Logger, LoggerBuilder, LoggerError, LoggerMetrics, LoggingMode,
    OutputManager, Result, SharedSink, Sink, SqlType, Table, TableBuilder, TimestampFormat, Value,
    Varchar, DEFAULT_LOG_DIR, SYNTHETIC_COLUMNS, TICK_COLUMN, TIMESTAMP_COLUMN, UNSTARTED_TICK,
};
