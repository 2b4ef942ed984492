// crates/label-verifier-core/src/runtime/chain.rs
// ============================================================================
// Module: Label Verifier Chains
// Description: Ordered verifier chains and the failure-capturing runner.
// Purpose: Execute one label's verifiers sequentially with fail-fast semantics.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A [`VerifierChain`] runs its verifiers in insertion order and stops at the
//! first failure. Every verifier call goes through [`run_capturing`], which
//! turns verifier errors and panics into [`VerificationOutcome`] values so no
//! failure escapes the chain as an error.
//! Invariants:
//! - Verifiers after the first failure are never invoked.
//! - An empty chain succeeds.
//! - Cancellation is checked before each verifier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::core::FailureKind;
use crate::core::VerificationFailure;
use crate::core::VerificationOutcome;
use crate::interfaces::Verifier;
use crate::interfaces::VerifierError;
use crate::interfaces::VerifyContext;

// ============================================================================
// SECTION: Capturing Runner
// ============================================================================

/// Runs one verifier and converts every error, including panics, into an
/// outcome.
#[must_use]
pub fn run_capturing(verifier: &dyn Verifier, ctx: &VerifyContext<'_>) -> VerificationOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| verifier.verify(ctx))) {
        Ok(Ok(())) => VerificationOutcome::Success,
        Ok(Err(err)) => VerificationOutcome::Failure(failure_from_error(err)),
        Err(payload) => VerificationOutcome::Failure(
            VerificationFailure::new(
                FailureKind::Panicked,
                format!("verifier {} panicked", verifier.kind()),
            )
            .with_cause(panic_message(payload.as_ref())),
        ),
    }
}

/// Maps a verifier error onto failure details.
fn failure_from_error(err: VerifierError) -> VerificationFailure {
    match err {
        VerifierError::Rejected(message) => VerificationFailure::new(FailureKind::Rejected, message),
        VerifierError::Transport(channel) => {
            let failure = VerificationFailure::new(FailureKind::Transport, channel.to_string());
            match channel.detail() {
                Some(detail) => failure.with_cause(detail),
                None => failure,
            }
        }
        VerifierError::Cancelled(reason) => {
            VerificationFailure::new(FailureKind::Cancelled, reason.to_string())
        }
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}

// ============================================================================
// SECTION: Chain Report
// ============================================================================

/// One verifier executed by a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    /// Zero-based position in the chain.
    pub index: usize,
    /// Verifier kind.
    pub verifier: String,
    /// Outcome of the verifier.
    pub outcome: VerificationOutcome,
}

/// Result of running a chain.
///
/// # Invariants
/// - `failed_at` is `Some` only when an invoked verifier failed; it always
///   names the last entry of `steps`.
/// - A chain stopped by cancellation before invoking its next verifier
///   fails with `failed_at` set to `None`.
/// - `steps` holds only verifiers that were actually invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Overall chain outcome.
    pub outcome: VerificationOutcome,
    /// Executed steps in order.
    pub steps: Vec<ChainStep>,
    /// Position of the invoked verifier that failed.
    pub failed_at: Option<usize>,
}

// ============================================================================
// SECTION: Verifier Chain
// ============================================================================

/// Ordered verifiers bound to one label.
#[derive(Clone, Default)]
pub struct VerifierChain {
    /// Verifiers in execution order.
    verifiers: Vec<Arc<dyn Verifier>>,
}

impl VerifierChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain from verifiers in execution order.
    #[must_use]
    pub const fn from_verifiers(verifiers: Vec<Arc<dyn Verifier>>) -> Self {
        Self {
            verifiers,
        }
    }

    /// Appends a verifier.
    #[must_use]
    pub fn with(mut self, verifier: impl Verifier + 'static) -> Self {
        self.verifiers.push(Arc::new(verifier));
        self
    }

    /// Appends a shared verifier.
    #[must_use]
    pub fn with_shared(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifiers.push(verifier);
        self
    }

    /// Returns the number of verifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.verifiers.len()
    }

    /// Returns true when the chain has no verifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }

    /// Returns verifier kinds in execution order.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.verifiers.iter().map(|verifier| verifier.kind().to_string()).collect()
    }

    /// Runs the chain, stopping at the first failure.
    #[must_use]
    pub fn run(&self, ctx: &VerifyContext<'_>) -> ChainReport {
        let total = self.verifiers.len();
        let mut steps = Vec::with_capacity(total);
        for (index, verifier) in self.verifiers.iter().enumerate() {
            if let Some(reason) = ctx.cancellation.reason() {
                ctx.diagnostic(&format!(
                    "label {}: stopping before verifier {} of {total}: {reason}",
                    ctx.label,
                    index + 1
                ));
                return ChainReport {
                    outcome: VerificationOutcome::Failure(VerificationFailure::new(
                        FailureKind::Cancelled,
                        reason.to_string(),
                    )),
                    steps,
                    failed_at: None,
                };
            }
            let outcome = run_capturing(verifier.as_ref(), ctx);
            steps.push(ChainStep {
                index,
                verifier: verifier.kind().to_string(),
                outcome: outcome.clone(),
            });
            if let VerificationOutcome::Failure(failure) = &outcome {
                ctx.diagnostic(&format!(
                    "label {}: verifier {} of {total} ({}) failed: {}",
                    ctx.label,
                    index + 1,
                    verifier.kind(),
                    failure.message
                ));
                return ChainReport {
                    outcome,
                    steps,
                    failed_at: Some(index),
                };
            }
        }
        ChainReport {
            outcome: VerificationOutcome::Success,
            steps,
            failed_at: None,
        }
    }
}

impl fmt::Debug for VerifierChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierChain").field("verifiers", &self.kinds()).finish()
    }
}
