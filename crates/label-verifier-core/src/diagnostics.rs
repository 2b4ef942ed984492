// crates/label-verifier-core/src/diagnostics.rs
// ============================================================================
// Module: Label Verifier Diagnostic Sinks
// Description: Reference implementations of the diagnostic sink interface.
// Purpose: Capture or forward verifier progress text.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Diagnostic sinks receive free-text lines from verifiers and the admission
//! controller. [`MemoryDiagnosticSink`] keeps lines for inspection,
//! [`WriterDiagnosticSink`] forwards them to any writer, and
//! [`NoopDiagnosticSink`] discards them. [`PrefixedSink`] tags lines written
//! on behalf of one node so concurrent attempts stay distinguishable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use crate::interfaces::DiagnosticSink;

// ============================================================================
// SECTION: Memory Sink
// ============================================================================

/// Sink that keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryDiagnosticSink {
    /// Captured lines.
    lines: Mutex<Vec<String>>,
}

impl MemoryDiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the captured lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns true when any captured line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn write_line(&self, line: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(line.to_string());
        }
    }
}

// ============================================================================
// SECTION: Writer Sink
// ============================================================================

/// Sink that writes each line to an underlying writer.
pub struct WriterDiagnosticSink<W: Write + Send> {
    /// Output writer.
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterDiagnosticSink<W> {
    /// Creates a sink over `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the writer, if the lock is intact.
    pub fn into_inner(self) -> Option<W> {
        self.writer.into_inner().ok()
    }
}

impl<W: Write + Send> DiagnosticSink for WriterDiagnosticSink<W> {
    fn write_line(&self, line: &str) {
        if let Ok(mut guard) = self.writer.lock() {
            let _ = writeln!(guard, "{line}");
            let _ = guard.flush();
        }
    }
}

// ============================================================================
// SECTION: Noop Sink
// ============================================================================

/// Sink that discards every line.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn write_line(&self, _line: &str) {}
}

// ============================================================================
// SECTION: Prefixed Sink
// ============================================================================

/// Sink adapter that prefixes every line.
pub struct PrefixedSink<'a> {
    /// Prefix written before each line.
    prefix: String,
    /// Wrapped sink.
    inner: &'a dyn DiagnosticSink,
}

impl<'a> PrefixedSink<'a> {
    /// Wraps `inner`, prefixing lines with `[prefix] `.
    #[must_use]
    pub fn new(prefix: &str, inner: &'a dyn DiagnosticSink) -> Self {
        Self {
            prefix: format!("[{prefix}] "),
            inner,
        }
    }
}

impl DiagnosticSink for PrefixedSink<'_> {
    fn write_line(&self, line: &str) {
        self.inner.write_line(&format!("{}{line}", self.prefix));
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
