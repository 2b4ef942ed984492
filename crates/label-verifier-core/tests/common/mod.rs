// crates/label-verifier-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Helpers
// Description: Shared verifiers, channels, and admission harness for tests.
// Purpose: Provide reusable fixtures for chain and controller tests.
// Dependencies: label-verifier-core
// ============================================================================

//! ## Overview
//! Test verifiers record their invocations in a shared journal so tests can
//! assert which verifiers ran and in what order. [`AdmissionHarness`] creates a
//! uniquely labelled node per test run, attaches a chain to the label, and
//! checks the decision against an expected failure message.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared helpers are used by a subset of test binaries."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use label_verifier_core::AdmissionRequest;
use label_verifier_core::CancellationToken;
use label_verifier_core::ChannelError;
use label_verifier_core::CheckOutput;
use label_verifier_core::Decision;
use label_verifier_core::DiagnosticSink;
use label_verifier_core::LabelRegistry;
use label_verifier_core::MemoryDiagnosticSink;
use label_verifier_core::NodeAdmissionController;
use label_verifier_core::NodeHandle;
use label_verifier_core::ProcessOutput;
use label_verifier_core::RemoteCheck;
use label_verifier_core::UniqueNameGenerator;
use label_verifier_core::VerificationChannel;
use label_verifier_core::Verifier;
use label_verifier_core::VerifierChain;
use label_verifier_core::VerifierError;
use label_verifier_core::VerifyContext;

// ============================================================================
// SECTION: Journal
// ============================================================================

/// Ordered record of verifier invocations.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    /// Records an entry.
    pub fn push(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_string());
    }

    /// Returns all entries.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

// ============================================================================
// SECTION: Verifiers
// ============================================================================

/// Verifier with a fixed result that journals each call.
pub struct ScriptedVerifier {
    /// Name recorded in the journal.
    pub name: String,
    /// Failure message, or `None` to pass.
    pub fail_with: Option<String>,
    /// Shared journal.
    pub journal: Journal,
}

impl ScriptedVerifier {
    /// Creates a passing verifier.
    pub fn pass(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            fail_with: None,
            journal: journal.clone(),
        }
    }

    /// Creates a failing verifier.
    pub fn fail(name: &str, message: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            fail_with: Some(message.to_string()),
            journal: journal.clone(),
        }
    }
}

impl Verifier for ScriptedVerifier {
    fn kind(&self) -> &str {
        &self.name
    }

    fn verify(&self, ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        self.journal.push(&self.name);
        ctx.diagnostic(&format!("{} checked {}", self.name, ctx.node.name));
        match &self.fail_with {
            Some(message) => Err(VerifierError::rejected(message.clone())),
            None => Ok(()),
        }
    }
}

/// Verifier that probes the channel with a script check.
pub struct ProbeVerifier {
    /// Shared journal.
    pub journal: Journal,
}

impl Verifier for ProbeVerifier {
    fn kind(&self) -> &str {
        "probe"
    }

    fn verify(&self, ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        self.journal.push("probe");
        let output = ctx.run_check(&RemoteCheck::Script {
            script: "true".to_string(),
            working_dir: Some(ctx.workspace_root().clone()),
        })?;
        match output {
            CheckOutput::Process(ProcessOutput {
                exit_code: Some(0),
                ..
            }) => Ok(()),
            _ => Err(VerifierError::rejected("probe failed")),
        }
    }
}

/// Verifier that panics.
pub struct PanickingVerifier;

impl Verifier for PanickingVerifier {
    fn kind(&self) -> &str {
        "panicking"
    }

    fn verify(&self, _ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        panic!("verifier blew up");
    }
}

/// Verifier that waits until the attempt is cancelled.
pub struct WaitForCancelVerifier {
    /// Shared journal.
    pub journal: Journal,
}

impl Verifier for WaitForCancelVerifier {
    fn kind(&self) -> &str {
        "wait"
    }

    fn verify(&self, ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        self.journal.push("wait");
        for _ in 0..500 {
            ctx.checkpoint()?;
            thread::sleep(Duration::from_millis(10));
        }
        Err(VerifierError::rejected("never cancelled"))
    }
}

/// Verifier that sleeps without observing cancellation, then passes.
pub struct SlowPassVerifier {
    /// Time spent before returning.
    pub delay: Duration,
    /// Shared journal.
    pub journal: Journal,
}

impl Verifier for SlowPassVerifier {
    fn kind(&self) -> &str {
        "slow_pass"
    }

    fn verify(&self, _ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        self.journal.push("slow_pass");
        thread::sleep(self.delay);
        Ok(())
    }
}

// ============================================================================
// SECTION: Channels
// ============================================================================

/// Channel answering every check with a fixed result.
pub struct FixedChannel {
    /// Result returned for each check.
    pub result: Result<CheckOutput, ChannelError>,
    /// Checks received.
    pub received: Mutex<Vec<RemoteCheck>>,
}

impl FixedChannel {
    /// Channel whose scripts exit with code 0.
    pub fn healthy() -> Self {
        Self::with_result(Ok(CheckOutput::Process(ProcessOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })))
    }

    /// Channel returning `result` for every check.
    pub fn with_result(result: Result<CheckOutput, ChannelError>) -> Self {
        Self {
            result,
            received: Mutex::new(Vec::new()),
        }
    }
}

impl VerificationChannel for FixedChannel {
    fn run_remote_check(
        &self,
        check: &RemoteCheck,
        observer: &dyn DiagnosticSink,
        _cancellation: &CancellationToken,
    ) -> Result<CheckOutput, ChannelError> {
        observer.write_line(&format!("running {} check", check.as_str()));
        self.received.lock().unwrap().push(check.clone());
        self.result.clone()
    }
}

// ============================================================================
// SECTION: Admission Harness
// ============================================================================

/// Creates uniquely labelled nodes and runs admission against them.
pub struct AdmissionHarness {
    /// Label name source scoped to this harness.
    names: UniqueNameGenerator,
}

impl Default for AdmissionHarness {
    fn default() -> Self {
        Self {
            names: UniqueNameGenerator::new("foo"),
        }
    }
}

impl AdmissionHarness {
    /// Attaches `chain` to a fresh label, admits a node under it, and checks
    /// the decision. `expected_message` is ignored when `None`.
    pub fn run(
        &self,
        chain: VerifierChain,
        expect_fail: bool,
        expected_message: Option<&str>,
    ) -> Decision {
        let label = self.names.next_label();
        let mut registry = LabelRegistry::new();
        registry.register(label.clone(), chain).unwrap();
        let controller = NodeAdmissionController::new(registry);
        let node = NodeHandle::new(format!("node-{label}"), "/home/agent");
        let channel = FixedChannel::healthy();
        let sink = MemoryDiagnosticSink::new();
        let cancellation = CancellationToken::new();
        let labels = [label];
        let decision = controller.admit(&AdmissionRequest {
            node: &node,
            labels: &labels,
            channel: &channel,
            sink: &sink,
            cancellation: &cancellation,
        });
        match (&decision, expect_fail) {
            (Decision::Rejected(rejection), true) => {
                if let Some(expected) = expected_message {
                    assert_eq!(rejection.message(), expected);
                }
            }
            (Decision::Admitted, false) => {}
            (Decision::Rejected(rejection), false) => {
                panic!("unexpected rejection: {}", rejection.message())
            }
            (Decision::Admitted, true) => panic!("rejection has been expected"),
        }
        decision
    }
}
