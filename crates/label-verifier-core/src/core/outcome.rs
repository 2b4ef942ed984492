// crates/label-verifier-core/src/core/outcome.rs
// ============================================================================
// Module: Label Verifier Outcomes
// Description: Verification outcomes and admission decisions.
// Purpose: Carry verifier results across the chain and controller boundary.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`VerificationOutcome`] is what one verifier (or one chain) produced. A
//! [`Decision`] is what the controller hands to the node pool. Failures carry
//! opaque diagnostic text only; no error types cross the controller boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::Label;

// ============================================================================
// SECTION: Failure Kind
// ============================================================================

/// Classification of a verification failure.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The verifier's own logic rejected the node.
    Rejected,
    /// The channel to the node failed during a check.
    Transport,
    /// The attempt was abandoned (timeout, disconnect, interrupt).
    Cancelled,
    /// The verifier panicked.
    Panicked,
}

impl FailureKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Transport => "transport",
            Self::Cancelled => "cancelled",
            Self::Panicked => "panicked",
        }
    }
}

// ============================================================================
// SECTION: Verification Outcome
// ============================================================================

/// Failure details for a verifier or chain.
///
/// # Invariants
/// - `message` is the diagnostic exactly as produced by the failing verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Diagnostic message.
    pub message: String,
    /// Optional underlying cause, rendered as text.
    pub cause: Option<String>,
}

impl VerificationFailure {
    /// Creates a failure without an underlying cause.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Result of running a verifier or a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// The check passed.
    Success,
    /// The check failed.
    Failure(VerificationFailure),
}

impl VerificationOutcome {
    /// Returns true for [`VerificationOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the failure details, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&VerificationFailure> {
        match self {
            Self::Success => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Details of a rejected admission.
///
/// # Invariants
/// - `message` is identical to the failing verifier's message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Label whose chain failed.
    pub label: Option<Label>,
    /// Zero-based position of the failing verifier in its chain.
    pub verifier_index: Option<usize>,
    /// Kind of the failing verifier.
    pub verifier: Option<String>,
    /// Failure details.
    pub failure: VerificationFailure,
}

impl Rejection {
    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.failure.message
    }
}

/// Final admission decision for a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// The node may join the pool.
    Admitted,
    /// The node must not join the pool.
    Rejected(Rejection),
}

impl Decision {
    /// Returns true for [`Decision::Admitted`].
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }

    /// Returns the rejection message, if rejected.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Admitted => None,
            Self::Rejected(rejection) => Some(rejection.message()),
        }
    }

    /// Returns a stable label for the decision.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admitted => "admitted",
            Self::Rejected(_) => "rejected",
        }
    }
}
