//! Sink trait for row output destinations

use super::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// An output destination for table rows
///
/// A sink receives one `init` per table it is attached to, carrying the
/// finalized schema, and then one `update` per written row. `init` may be
/// called again for a table that is redefined and must tolerate that.
pub trait Sink: Send {
    fn init(&mut self, table: &str, columns: &[String], type_names: &[String]) -> Result<()>;

    /// Append one row; `row[i]` belongs to `columns[i]`
    fn update(&mut self, table: &str, row: &[String], columns: &[String]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// A sink shared between tables
pub type SharedSink = Arc<Mutex<dyn Sink>>;

/// Wrap a sink so it can be attached to several tables
pub fn shared_sink<S: Sink + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}
