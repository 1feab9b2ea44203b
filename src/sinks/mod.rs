//! Sink implementations

#[cfg(feature = "console")]
pub mod console;
pub mod file;
pub mod json;
pub mod memory;

#[cfg(feature = "console")]
pub use console::ConsoleSink;
pub use file::FileSink;
pub use json::JsonSink;
pub use memory::{InitCall, MemoryHandle, MemorySink, RowCall};

pub use crate::core::{shared_sink, SharedSink, Sink};
