// crates/label-verifier-core/src/audit.rs
// ============================================================================
// Module: Admission Audit Logging
// Description: Structured audit events for node admission decisions.
// Purpose: Emit JSON-lines decision records without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every admission decision produces one [`AdmissionAuditEvent`]. Sinks route
//! events to stderr, an append-only file, or nowhere. The module stays
//! dependency-light so deployments can forward the JSON lines to their own
//! logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::ConnectionAttempt;
use crate::core::Decision;
use crate::core::FailureKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Admission audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Attempt identifier.
    pub attempt_id: String,
    /// Node name.
    pub node: String,
    /// Labels evaluated, in order.
    pub labels: Vec<String>,
    /// Decision label (`admitted` or `rejected`).
    pub decision: &'static str,
    /// Number of verifiers that ran.
    pub verifiers_run: usize,
    /// Label whose chain rejected the node.
    pub failed_label: Option<String>,
    /// Kind of the rejecting verifier.
    pub failed_verifier: Option<String>,
    /// Failure classification.
    pub failure_kind: Option<FailureKind>,
    /// Rejection message.
    pub message: Option<String>,
    /// Wall-clock duration of the attempt in milliseconds.
    pub duration_ms: u128,
}

impl AdmissionAuditEvent {
    /// Builds an event from a finished attempt.
    #[must_use]
    pub fn from_attempt(attempt: &ConnectionAttempt, elapsed: Duration) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let rejection = match attempt.decision() {
            Some(Decision::Rejected(rejection)) => Some(rejection),
            _ => None,
        };
        Self {
            event: "node_admission",
            timestamp_ms,
            attempt_id: attempt.id.to_string(),
            node: attempt.node.to_string(),
            labels: attempt.labels.iter().map(ToString::to_string).collect(),
            decision: attempt.decision().map_or("pending", Decision::as_str),
            verifiers_run: attempt.steps.len(),
            failed_label: rejection.and_then(|r| r.label.as_ref()).map(ToString::to_string),
            failed_verifier: rejection.and_then(|r| r.verifier.clone()),
            failure_kind: rejection.map(|r| r.failure.kind),
            message: rejection.map(|r| r.failure.message.clone()),
            duration_ms: elapsed.as_millis(),
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for admission events.
pub trait AdmissionAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AdmissionAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AdmissionAuditSink for StderrAuditSink {
    fn record(&self, event: &AdmissionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AdmissionAuditSink for FileAuditSink {
    fn record(&self, event: &AdmissionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events.
    events: Mutex<Vec<AdmissionAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AdmissionAuditEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl AdmissionAuditSink for MemoryAuditSink {
    fn record(&self, event: &AdmissionAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AdmissionAuditSink for NoopAuditSink {
    fn record(&self, _event: &AdmissionAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
