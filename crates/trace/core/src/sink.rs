//! Diagnostic sinks that receive trace lines
//!
//! A sink gets exactly one call per traced entry: the declaring type's simple
//! name as the tag and `--> <method>` as the message.

use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::SinkError;

/// Destination for trace lines
pub trait DiagnosticSink: Send + Sync {
    /// Write a single debug line
    fn write_debug_line(&self, tag: &str, message: &str) -> Result<(), SinkError>;
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str, &str) -> Result<(), SinkError> + Send + Sync,
{
    fn write_debug_line(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        self(tag, message)
    }
}

/// Sink that forwards lines to the `tracing` facade at DEBUG level
///
/// Events use the `nexum_trace` target and carry the tag as a field, so
/// subscribers can filter with e.g. `RUST_LOG=nexum_trace=debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write_debug_line(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        debug!(target: "nexum_trace", tag = %tag, "{message}");
        Ok(())
    }
}

/// A line captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    /// Tag the line was written under
    pub tag: String,
    /// Message body
    pub message: String,
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag, self.message)
    }
}

/// Sink that records lines in memory
///
/// Clones share the same buffer, so a handle can be kept after the sink is
/// moved into an interceptor.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<TraceLine>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded lines
    pub fn lines(&self) -> Vec<TraceLine> {
        self.lines.lock().clone()
    }

    /// Recorded lines with the given tag
    pub fn lines_for(&self, tag: &str) -> Vec<TraceLine> {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.tag == tag)
            .cloned()
            .collect()
    }

    /// Remove and return all recorded lines
    pub fn take(&self) -> Vec<TraceLine> {
        core::mem::take(&mut *self.lines.lock())
    }

    /// Number of recorded lines
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn write_debug_line(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        self.lines.lock().push(TraceLine {
            tag: tag.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
