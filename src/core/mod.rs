//! Core logger types and traits

pub mod error;
pub mod loggable;
pub mod logger;
pub mod logging_mode;
pub mod metrics;
pub mod output_manager;
pub mod sink;
pub mod sql_type;
pub mod table;
pub mod timestamp;
pub mod value;

pub use error::{ErrorCallback, LoggerError, Result};
pub use loggable::{Criteria, Loggable};
pub use logger::{Logger, LoggerBuilder, DEFAULT_LOG_DIR, UNSTARTED_TICK};
pub use logging_mode::LoggingMode;
pub use metrics::LoggerMetrics;
pub use output_manager::OutputManager;
pub use sink::{shared_sink, SharedSink, Sink};
pub use sql_type::{types, Bool, ColumnType, DateTime, Decimal, Int, SqlType, Varchar};
pub use table::{
    is_valid_identifier, Table, TableBuilder, SYNTHETIC_COLUMNS, TICK_COLUMN, TIMESTAMP_COLUMN,
};
pub use timestamp::TimestampFormat;
pub use value::Value;
