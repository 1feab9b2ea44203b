//! Column data types
//!
//! Each column of a table declares one of these types. A type checks that a
//! sampled [`Value`] has the right shape and turns it into the literal a sink
//! persists. New types are added by implementing [`SqlType`].

use super::{timestamp::TimestampFormat, value::Value};
use std::fmt;
use std::sync::Arc;

/// Capability shared by every column type
pub trait SqlType: Send + Sync + fmt::Debug {
    /// Check shape and range. Never panics.
    fn validate(&self, value: &Value) -> bool;

    /// Render a validated value as the literal a sink should persist
    fn reformat(&self, value: &Value) -> String;

    /// Stable type identifier handed to sinks during `init`
    fn name(&self) -> &str;
}

/// Shared handle to a column type
pub type ColumnType = Arc<dyn SqlType>;

/// Default maximum length of a [`Varchar`] column
pub const DEFAULT_VARCHAR_LENGTH: usize = 255;

/// Bounded text, rendered as a single-quoted literal
#[derive(Debug, Clone)]
pub struct Varchar {
    max_length: usize,
    name: String,
}

impl Varchar {
    #[must_use]
    pub fn new() -> Self {
        Self::with_length(DEFAULT_VARCHAR_LENGTH)
    }

    #[must_use]
    pub fn with_length(max_length: usize) -> Self {
        Self {
            max_length,
            name: format!("VARCHAR({})", max_length),
        }
    }

    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for Varchar {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlType for Varchar {
    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Text(s) => s.chars().count() <= self.max_length,
            _ => false,
        }
    }

    fn reformat(&self, value: &Value) -> String {
        let text = match value {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        };
        format!("'{}'", text.replace('\'', "''"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Boolean; also accepts the integers 0 and 1
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl SqlType for Bool {
    fn validate(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_) | Value::Int(0) | Value::Int(1))
    }

    fn reformat(&self, value: &Value) -> String {
        let flag = match value {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            _ => false,
        };
        flag.to_string()
    }

    fn name(&self) -> &str {
        "BOOLEAN"
    }
}

/// 32-bit signed integer
#[derive(Debug, Clone, Copy, Default)]
pub struct Int;

impl SqlType for Int {
    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Int(i) => i32::try_from(*i).is_ok(),
            _ => false,
        }
    }

    fn reformat(&self, value: &Value) -> String {
        match value {
            Value::Int(i) => i.to_string(),
            other => other.to_string(),
        }
    }

    fn name(&self) -> &str {
        "INT"
    }
}

/// Finite decimal number; integers are widened
#[derive(Debug, Clone, Copy, Default)]
pub struct Decimal;

impl SqlType for Decimal {
    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Float(f) => f.is_finite(),
            Value::Int(_) => true,
            _ => false,
        }
    }

    fn reformat(&self, value: &Value) -> String {
        let mut literal = match value {
            Value::Float(f) => f.to_string(),
            Value::Int(i) => i.to_string(),
            other => other.to_string(),
        };
        if !literal.contains('.') {
            literal.push_str(".0");
        }
        literal
    }

    fn name(&self) -> &str {
        "DECIMAL"
    }
}

/// Point in time, rendered with a configurable [`TimestampFormat`]
#[derive(Debug, Clone, Default)]
pub struct DateTime {
    format: TimestampFormat,
}

impl DateTime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(format: TimestampFormat) -> Self {
        Self { format }
    }
}

impl SqlType for DateTime {
    fn validate(&self, value: &Value) -> bool {
        matches!(value, Value::Timestamp(_))
    }

    fn reformat(&self, value: &Value) -> String {
        let rendered = match value {
            Value::Timestamp(t) => self.format.format(t),
            other => other.to_string(),
        };
        if self.format.is_numeric() {
            rendered
        } else {
            format!("'{}'", rendered)
        }
    }

    fn name(&self) -> &str {
        "DATETIME"
    }
}

/// Shorthand constructors returning shared [`ColumnType`] handles
pub mod types {
    use super::*;

    pub fn varchar() -> ColumnType {
        Arc::new(Varchar::new())
    }

    pub fn varchar_n(max_length: usize) -> ColumnType {
        Arc::new(Varchar::with_length(max_length))
    }

    pub fn boolean() -> ColumnType {
        Arc::new(Bool)
    }

    pub fn int() -> ColumnType {
        Arc::new(Int)
    }

    pub fn decimal() -> ColumnType {
        Arc::new(Decimal)
    }

    pub fn datetime() -> ColumnType {
        Arc::new(DateTime::new())
    }
}
