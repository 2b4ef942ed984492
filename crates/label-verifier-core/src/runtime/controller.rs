// crates/label-verifier-core/src/runtime/controller.rs
// ============================================================================
// Module: Node Admission Controller
// Description: Runs label chains for a connecting node and decides admission.
// Purpose: Single canonical admission path with failure isolation and audit.
// Dependencies: crate::{audit, core, diagnostics, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The controller resolves the chain of each label a node claims, runs the
//! chains in declaration order, and turns the first failure into a
//! [`Decision::Rejected`]. Verifier errors, channel failures, panics and
//! cancellation all arrive here as outcomes, so [`NodeAdmissionController::admit`]
//! always returns a decision.
//! Invariants:
//! - A node is finalized in the pool only when admitted.
//! - The rejection message is exactly the failing verifier's message.
//! - No retries: a rejected node must reconnect to try again.
//! - An attempt cancelled or past its deadline is never admitted, even when
//!   every verifier it ran passed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use crate::audit::AdmissionAuditEvent;
use crate::audit::AdmissionAuditSink;
use crate::audit::NoopAuditSink;
use crate::core::CancelReason;
use crate::core::CancellationToken;
use crate::core::ConnectionAttempt;
use crate::core::Decision;
use crate::core::FailureKind;
use crate::core::Label;
use crate::core::Rejection;
use crate::core::SequenceGenerator;
use crate::core::StepRecord;
use crate::core::VerificationFailure;
use crate::core::VerificationOutcome;
use crate::interfaces::DiagnosticSink;
use crate::interfaces::NodeHandle;
use crate::interfaces::NodePool;
use crate::interfaces::VerificationChannel;
use crate::interfaces::VerifyContext;
use crate::runtime::pool::NoopNodePool;
use crate::runtime::registry::LabelRegistry;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Admission controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdmissionConfig {
    /// Deadline applied to every attempt, measured from its start.
    pub attempt_timeout: Option<Duration>,
}

// ============================================================================
// SECTION: Request
// ============================================================================

/// Inputs for one admission attempt.
pub struct AdmissionRequest<'a> {
    /// Node requesting admission.
    pub node: &'a NodeHandle,
    /// Labels claimed by the node, in declaration order.
    pub labels: &'a [Label],
    /// Channel to the node.
    pub channel: &'a dyn VerificationChannel,
    /// Diagnostic output for this attempt.
    pub sink: &'a dyn DiagnosticSink,
    /// Cancellation controlled by the caller.
    pub cancellation: &'a CancellationToken,
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Orchestrates verifier chains for connecting nodes.
///
/// The controller is `Send + Sync`; distinct nodes may be admitted
/// concurrently from separate threads.
pub struct NodeAdmissionController {
    /// Label chains.
    registry: Arc<LabelRegistry>,
    /// Controller settings.
    config: AdmissionConfig,
    /// Pool notified of each decision.
    pool: Arc<dyn NodePool>,
    /// Audit sink for decisions.
    audit: Arc<dyn AdmissionAuditSink>,
    /// Attempt identifier sequence.
    attempts: SequenceGenerator,
}

impl NodeAdmissionController {
    /// Creates a controller with default configuration, no pool, and no audit.
    #[must_use]
    pub fn new(registry: impl Into<Arc<LabelRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            config: AdmissionConfig::default(),
            pool: Arc::new(NoopNodePool),
            audit: Arc::new(NoopAuditSink),
            attempts: SequenceGenerator::new(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: AdmissionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the node pool.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<dyn NodePool>) -> Self {
        self.pool = pool;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AdmissionAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the label registry.
    #[must_use]
    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> AdmissionConfig {
        self.config
    }

    /// Admits or rejects a node and returns the decision.
    #[must_use]
    pub fn admit(&self, request: &AdmissionRequest<'_>) -> Decision {
        match self.evaluate(request).into_decision() {
            Some(decision) => decision,
            None => Decision::Rejected(Rejection {
                label: None,
                verifier_index: None,
                verifier: None,
                failure: VerificationFailure::new(
                    FailureKind::Cancelled,
                    "admission attempt did not reach a decision",
                ),
            }),
        }
    }

    /// Runs a full admission attempt and returns its record.
    #[must_use]
    pub fn evaluate(&self, request: &AdmissionRequest<'_>) -> ConnectionAttempt {
        let started = Instant::now();
        let labels = dedupe_labels(request.labels);
        let mut attempt = ConnectionAttempt::new(
            self.attempts.next_attempt_id(),
            request.node.name.clone(),
            labels.clone(),
        );
        let cancellation = match self.config.attempt_timeout {
            Some(timeout) => request.cancellation.with_timeout(timeout),
            None => request.cancellation.clone(),
        };
        request.sink.write_line(&format!(
            "verifying node {} for labels [{}] ({})",
            request.node.name,
            join_labels(&labels),
            attempt.id
        ));

        let decision = self.run_chains(request, &labels, &cancellation, &mut attempt);
        match &decision {
            Decision::Admitted => {
                request.sink.write_line(&format!("node {} admitted", request.node.name));
                self.pool.finalize(request.node);
            }
            Decision::Rejected(rejection) => {
                request.sink.write_line(&format!(
                    "node {} rejected: {}",
                    request.node.name,
                    rejection.message()
                ));
                self.pool.tear_down(request.node, rejection);
            }
        }
        attempt.finish(decision);
        self.audit.record(&AdmissionAuditEvent::from_attempt(&attempt, started.elapsed()));
        attempt
    }

    /// Runs every label chain in order and returns the decision.
    fn run_chains(
        &self,
        request: &AdmissionRequest<'_>,
        labels: &[Label],
        cancellation: &CancellationToken,
        attempt: &mut ConnectionAttempt,
    ) -> Decision {
        let total = labels.len();
        for (position, label) in labels.iter().enumerate() {
            if let Some(reason) = cancellation.reason() {
                return cancelled(Some(label.clone()), &reason);
            }
            attempt.start_chain(position, total);
            let Some(chain) = self.registry.chain_for(label) else {
                continue;
            };
            let ctx = VerifyContext {
                label,
                node: request.node,
                channel: request.channel,
                sink: request.sink,
                cancellation,
            };
            let report = chain.run(&ctx);
            attempt.steps.extend(report.steps.iter().map(|step| StepRecord {
                label: label.clone(),
                index: step.index,
                verifier: step.verifier.clone(),
                outcome: step.outcome.clone(),
            }));
            if let VerificationOutcome::Failure(failure) = report.outcome {
                let verifier = report.failed_at.and_then(|index| chain.kinds().get(index).cloned());
                return Decision::Rejected(Rejection {
                    label: Some(label.clone()),
                    verifier_index: report.failed_at,
                    verifier,
                    failure,
                });
            }
        }
        // A verifier may finish after the deadline without observing it.
        match cancellation.reason() {
            Some(reason) => cancelled(None, &reason),
            None => Decision::Admitted,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a cancellation rejection that names no verifier.
fn cancelled(label: Option<Label>, reason: &CancelReason) -> Decision {
    Decision::Rejected(Rejection {
        label,
        verifier_index: None,
        verifier: None,
        failure: VerificationFailure::new(FailureKind::Cancelled, reason.to_string()),
    })
}

/// Removes repeated labels, keeping the first occurrence.
fn dedupe_labels(labels: &[Label]) -> Vec<Label> {
    let mut out: Vec<Label> = Vec::with_capacity(labels.len());
    for label in labels {
        if !out.contains(label) {
            out.push(label.clone());
        }
    }
    out
}

/// Renders labels as a comma-separated list.
fn join_labels(labels: &[Label]) -> String {
    labels.iter().map(Label::as_str).collect::<Vec<_>>().join(", ")
}
