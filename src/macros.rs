//! Macros for building rows of values.
//!
//! # Examples
//!
//! ```
//! use rust_tick_logger::prelude::*;
//! use rust_tick_logger::{log_row, values};
//!
//! let row = values!["x", true, 5, 1.5];
//! assert_eq!(row[2], Value::Int(5));
//!
//! let mut table = Table::new(
//!     shared_sink(MemorySink::new()),
//!     "Test",
//!     LoggingMode::Manual,
//!     &["Word", "Flag"],
//!     vec![types::varchar(), types::boolean()],
//! )
//! .unwrap();
//! log_row!(table, 0, "hello", false).unwrap();
//! ```

/// Build a `Vec<Value>` from expressions convertible into `Value`.
///
/// # Examples
///
/// ```
/// use rust_tick_logger::{values, Value};
///
/// let row = values!["word", 3];
/// assert_eq!(row, vec![Value::from("word"), Value::Int(3)]);
/// assert!(values![].is_empty());
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

/// Write one row of explicit values to a table at `tick`.
///
/// Expands to `table.log_values(tick, values![...])` and returns its `Result`.
#[macro_export]
macro_rules! log_row {
    ($table:expr, $tick:expr $(,)?) => {
        $table.log_values($tick, $crate::values![])
    };
    ($table:expr, $tick:expr, $($value:expr),+ $(,)?) => {
        $table.log_values($tick, $crate::values![$($value),+])
    };
}
