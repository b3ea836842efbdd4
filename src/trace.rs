//! Diagnostic trace abstraction for the decompressor.
//!
//! The decompressor never writes to stdout or a logger directly: every
//! diagnostic goes through a [`TraceSink`] supplied at engine construction and
//! threaded into each context at creation. Warnings are emitted in parse
//! order, so a collecting sink observes malformed-packet diagnostics exactly
//! as they occurred.

use std::fmt::Debug;
use std::sync::Mutex;

/// A sink for decompressor diagnostics.
///
/// `warning` carries malformed-packet diagnostics (the ones that become fatal
/// errors in strict mode); `debug` carries progress chatter that sinks are
/// free to drop.
pub trait TraceSink: Send + Sync + Debug {
    /// Records a malformed-packet or protocol-anomaly diagnostic.
    fn warning(&self, message: &str);

    /// Records low-value progress detail. Default implementation drops it.
    fn debug(&self, _message: &str) {}
}

/// A sink that discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn warning(&self, _message: &str) {}
}

/// A sink that collects warnings in emission order, for tests.
#[derive(Debug, Default)]
pub struct MemoryTraceSink {
    warnings: Mutex<Vec<String>>,
}

impl MemoryTraceSink {
    /// Creates an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All warnings recorded so far, oldest first.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    /// Number of warnings recorded so far.
    pub fn warning_count(&self) -> usize {
        self.warnings.lock().unwrap().len()
    }

    /// Discards all recorded warnings.
    pub fn clear(&self) {
        self.warnings.lock().unwrap().clear();
    }
}

impl TraceSink for MemoryTraceSink {
    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_preserves_warning_order() {
        let sink = MemoryTraceSink::new();
        sink.warning("first");
        sink.warning("second");
        assert_eq!(sink.warnings(), vec!["first", "second"]);
        assert_eq!(sink.warning_count(), 2);
    }

    #[test]
    fn memory_sink_clear_empties_log() {
        let sink = MemoryTraceSink::new();
        sink.warning("stale");
        sink.clear();
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn null_sink_accepts_everything() {
        let sink = NullTraceSink;
        sink.warning("dropped");
        sink.debug("dropped");
    }
}
