// crates/label-verifier-core/src/core/attempt.rs
// ============================================================================
// Module: Label Verifier Connection Attempts
// Description: Per-node admission attempt records and state machine.
// Purpose: Track verifier steps and the final decision for one attempt.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ConnectionAttempt`] is created when a node asks to join and discarded
//! once its decision is delivered. State moves
//! `Pending -> Running(chain i of n) -> {Admitted | Rejected}` and terminal
//! states never change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::identifiers::AttemptId;
use crate::core::identifiers::Label;
use crate::core::identifiers::NodeName;
use crate::core::outcome::Decision;
use crate::core::outcome::VerificationOutcome;

// ============================================================================
// SECTION: State
// ============================================================================

/// Lifecycle state of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttemptState {
    /// No chain has started yet.
    Pending,
    /// Chain `chain` (zero-based) of `of` is running.
    Running {
        /// Index of the running chain.
        chain: usize,
        /// Number of chains in the attempt.
        of: usize,
    },
    /// Terminal: node admitted.
    Admitted,
    /// Terminal: node rejected.
    Rejected,
}

impl AttemptState {
    /// Returns true for terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Admitted | Self::Rejected)
    }
}

// ============================================================================
// SECTION: Step Records
// ============================================================================

/// One executed verifier within an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Label whose chain owns the verifier.
    pub label: Label,
    /// Zero-based position within the chain.
    pub index: usize,
    /// Verifier kind.
    pub verifier: String,
    /// Outcome of the verifier.
    pub outcome: VerificationOutcome,
}

// ============================================================================
// SECTION: Connection Attempt
// ============================================================================

/// Record of one node's admission attempt.
///
/// # Invariants
/// - `steps` are in execution order.
/// - `decision` is `Some` iff `state` is terminal.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionAttempt {
    /// Attempt identifier.
    pub id: AttemptId,
    /// Node requesting admission.
    pub node: NodeName,
    /// Labels in effect, in declaration order without duplicates.
    pub labels: Vec<Label>,
    /// Executed verifier steps.
    pub steps: Vec<StepRecord>,
    /// Current state.
    state: AttemptState,
    /// Final decision once terminal.
    decision: Option<Decision>,
}

impl ConnectionAttempt {
    /// Creates a pending attempt.
    #[must_use]
    pub const fn new(id: AttemptId, node: NodeName, labels: Vec<Label>) -> Self {
        Self {
            id,
            node,
            labels,
            steps: Vec::new(),
            state: AttemptState::Pending,
            decision: None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> AttemptState {
        self.state
    }

    /// Returns the decision once the attempt is terminal.
    #[must_use]
    pub const fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }

    /// Consumes the attempt and returns its decision.
    #[must_use]
    pub fn into_decision(self) -> Option<Decision> {
        self.decision
    }

    /// Marks chain `chain` of `of` as running. Ignored once terminal.
    pub fn start_chain(&mut self, chain: usize, of: usize) {
        if !self.state.is_terminal() {
            self.state = AttemptState::Running {
                chain,
                of,
            };
        }
    }

    /// Records the final decision. Ignored once terminal.
    pub fn finish(&mut self, decision: Decision) {
        if self.state.is_terminal() {
            return;
        }
        self.state = if decision.is_admitted() {
            AttemptState::Admitted
        } else {
            AttemptState::Rejected
        };
        self.decision = Some(decision);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
/// Unit tests for attempt state transitions.
mod tests {
    use super::*;
    use crate::core::outcome::FailureKind;
    use crate::core::outcome::Rejection;
    use crate::core::outcome::VerificationFailure;

    /// Builds a pending attempt for tests.
    fn attempt() -> ConnectionAttempt {
        ConnectionAttempt::new(AttemptId::new("attempt-1"), NodeName::new("n1"), Vec::new())
    }

    /// Tests terminal states are final.
    #[test]
    fn terminal_state_is_final() {
        let mut attempt = attempt();
        attempt.start_chain(0, 2);
        assert_eq!(
            attempt.state(),
            AttemptState::Running {
                chain: 0,
                of: 2
            }
        );
        attempt.finish(Decision::Rejected(Rejection {
            label: None,
            verifier_index: None,
            verifier: None,
            failure: VerificationFailure::new(FailureKind::Rejected, "no"),
        }));
        attempt.finish(Decision::Admitted);
        attempt.start_chain(1, 2);
        assert_eq!(attempt.state(), AttemptState::Rejected);
        assert_eq!(attempt.decision().and_then(Decision::message), Some("no"));
    }
}
