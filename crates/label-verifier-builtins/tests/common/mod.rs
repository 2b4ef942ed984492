// crates/label-verifier-builtins/tests/common/mod.rs
// ============================================================================
// Module: Builtins Test Helpers
// Description: Shared channel and context fixtures for builtin tests.
// Purpose: Run builtin verifiers against scripted or local channels.
// Dependencies: label-verifier-core
// ============================================================================

//! ## Overview
//! [`ScriptedChannel`] answers checks from a fixed response and records what it
//! was asked; [`verify_with`] runs one verifier through the capturing runner.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared helpers are used by a subset of test binaries."
)]

use std::sync::Mutex;

use label_verifier_core::CancellationToken;
use label_verifier_core::ChannelError;
use label_verifier_core::CheckOutput;
use label_verifier_core::DiagnosticSink;
use label_verifier_core::Label;
use label_verifier_core::MemoryDiagnosticSink;
use label_verifier_core::NodeHandle;
use label_verifier_core::RemoteCheck;
use label_verifier_core::VerificationChannel;
use label_verifier_core::VerificationOutcome;
use label_verifier_core::Verifier;
use label_verifier_core::VerifyContext;
use label_verifier_core::run_capturing;

/// Channel returning a fixed response and recording received checks.
pub struct ScriptedChannel {
    /// Response for every check.
    pub response: Result<CheckOutput, ChannelError>,
    /// Checks received.
    pub received: Mutex<Vec<RemoteCheck>>,
}

impl ScriptedChannel {
    /// Creates a channel answering with `response`.
    pub fn new(response: Result<CheckOutput, ChannelError>) -> Self {
        Self {
            response,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Returns the checks received so far.
    pub fn received(&self) -> Vec<RemoteCheck> {
        self.received.lock().unwrap().clone()
    }
}

impl VerificationChannel for ScriptedChannel {
    fn run_remote_check(
        &self,
        check: &RemoteCheck,
        _observer: &dyn DiagnosticSink,
        _cancellation: &CancellationToken,
    ) -> Result<CheckOutput, ChannelError> {
        self.received.lock().unwrap().push(check.clone());
        self.response.clone()
    }
}

/// Runs `verifier` for node `agent-1` rooted at `root` over `channel`.
pub fn verify_with(
    verifier: &dyn Verifier,
    channel: &dyn VerificationChannel,
    root: &str,
    cancellation: &CancellationToken,
) -> (VerificationOutcome, MemoryDiagnosticSink) {
    let label = Label::new("linux");
    let node = NodeHandle::new("agent-1", root);
    let sink = MemoryDiagnosticSink::new();
    let ctx = VerifyContext {
        label: &label,
        node: &node,
        channel,
        sink: &sink,
        cancellation,
    };
    let outcome = run_capturing(verifier, &ctx);
    (outcome, sink)
}

/// Returns the failure message of `outcome`, panicking on success.
pub fn failure_message(outcome: &VerificationOutcome) -> String {
    outcome.failure().map(|failure| failure.message.clone()).expect("expected failure")
}
