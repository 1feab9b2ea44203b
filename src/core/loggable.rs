//! Value producers and gating predicates bound to tables

use super::{
    error::{panic_message, LoggerError, Result},
    value::Value,
};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

type Producer = Box<dyn FnMut() -> std::result::Result<Value, String> + Send>;

/// Zero-argument producer of the current value for one column
///
/// # Examples
///
/// ```
/// use rust_tick_logger::{Loggable, Value};
///
/// let mut speed = Loggable::new(|| 1.5);
/// assert_eq!(speed.sample("Speed").unwrap(), Value::from(1.5));
///
/// let mut sensor = Loggable::fallible(|| Err::<f64, _>("sensor offline"));
/// assert!(sensor.sample("Sensor").is_err());
/// ```
pub struct Loggable {
    producer: Producer,
}

impl Loggable {
    /// Wrap an infallible producer
    pub fn new<F, V>(mut producer: F) -> Self
    where
        F: FnMut() -> V + Send + 'static,
        V: Into<Value>,
    {
        Self {
            producer: Box::new(move || Ok(producer().into())),
        }
    }

    /// Wrap a producer that can report a failure
    pub fn fallible<F, V, E>(mut producer: F) -> Self
    where
        F: FnMut() -> std::result::Result<V, E> + Send + 'static,
        V: Into<Value>,
        E: fmt::Display,
    {
        Self {
            producer: Box::new(move || producer().map(Into::into).map_err(|e| e.to_string())),
        }
    }

    /// Always produce the same value
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move || value.clone())
    }

    /// Pull the current value; failures and panics become errors for `column`
    pub fn sample(&mut self, column: &str) -> Result<Value> {
        match catch_unwind(AssertUnwindSafe(|| (self.producer)())) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(LoggerError::loggable(column, message)),
            Err(payload) => Err(LoggerError::loggable(
                column,
                format!("panicked: {}", panic_message(payload.as_ref())),
            )),
        }
    }
}

impl fmt::Debug for Loggable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Loggable")
    }
}

/// Zero-argument predicate gating criteria-mode logging
pub type Criteria = Box<dyn FnMut() -> bool + Send>;
