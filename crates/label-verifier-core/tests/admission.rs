// crates/label-verifier-core/tests/admission.rs
// ============================================================================
// Module: Node Admission Tests
// Description: End-to-end admission decisions through the controller.
// Purpose: Validate decisions, pool notification, audit, and cancellation.
// Dependencies: label-verifier-core
// ============================================================================

//! ## Overview
//! Exercises [`label_verifier_core::NodeAdmissionController`] with scripted
//! verifiers and fixed channels.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::AdmissionHarness;
use common::FixedChannel;
use common::Journal;
use common::ProbeVerifier;
use common::ScriptedVerifier;
use common::SlowPassVerifier;
use common::WaitForCancelVerifier;
use label_verifier_core::AdmissionConfig;
use label_verifier_core::AdmissionRequest;
use label_verifier_core::AttemptState;
use label_verifier_core::CancellationToken;
use label_verifier_core::ChannelError;
use label_verifier_core::Decision;
use label_verifier_core::FailureKind;
use label_verifier_core::InMemoryNodePool;
use label_verifier_core::Label;
use label_verifier_core::LabelRegistry;
use label_verifier_core::MemoryAuditSink;
use label_verifier_core::MemoryDiagnosticSink;
use label_verifier_core::NodeAdmissionController;
use label_verifier_core::NodeHandle;
use label_verifier_core::RegistryError;
use label_verifier_core::VerifierChain;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Admits `node` under `labels` with a healthy channel.
fn admit(controller: &NodeAdmissionController, node: &NodeHandle, labels: &[Label]) -> Decision {
    let channel = FixedChannel::healthy();
    let sink = MemoryDiagnosticSink::new();
    let cancellation = CancellationToken::new();
    controller.admit(&AdmissionRequest {
        node,
        labels,
        channel: &channel,
        sink: &sink,
        cancellation: &cancellation,
    })
}

// ============================================================================
// SECTION: Scenario Tests
// ============================================================================

/// Tests a failing verifier rejects with its exact message and stops the chain.
#[test]
fn pass_then_fail_rejects_with_exact_message() {
    let journal = Journal::default();
    let chain = VerifierChain::new()
        .with(ScriptedVerifier::pass("always-pass", &journal))
        .with(ScriptedVerifier::fail("always-fail", "disk full", &journal))
        .with(ScriptedVerifier::pass("after-fail", &journal));
    let decision = AdmissionHarness::default().run(chain, true, Some("disk full"));
    let Decision::Rejected(rejection) = decision else {
        panic!("expected rejection");
    };
    assert_eq!(rejection.label, Some(Label::new("foo1")));
    assert_eq!(rejection.verifier_index, Some(1));
    assert_eq!(rejection.verifier.as_deref(), Some("always-fail"));
    assert_eq!(journal.entries(), vec!["always-pass", "always-fail"]);
}

/// Tests a chain of passing verifiers admits the node.
#[test]
fn all_passing_chain_admits() {
    let journal = Journal::default();
    let chain = VerifierChain::new()
        .with(ScriptedVerifier::pass("always-pass", &journal))
        .with(ScriptedVerifier::pass("always-pass", &journal));
    let harness = AdmissionHarness::default();
    harness.run(VerifierChain::new(), false, None);
    let decision = harness.run(chain, false, None);
    assert!(decision.is_admitted());
    assert_eq!(journal.entries().len(), 2);
}

/// Tests a transport error becomes a structured rejection.
#[test]
fn transport_error_rejects_without_escaping() {
    let mut registry = LabelRegistry::new();
    registry
        .register(
            Label::new("linux"),
            VerifierChain::new().with(ProbeVerifier {
                journal: Journal::default(),
            }),
        )
        .unwrap();
    let controller = NodeAdmissionController::new(registry);
    let node = NodeHandle::new("agent-1", "/srv/agent");
    let channel = FixedChannel::with_result(Err(ChannelError::Closed("remote hung up".to_string())));
    let sink = MemoryDiagnosticSink::new();
    let cancellation = CancellationToken::new();
    let decision = controller.admit(&AdmissionRequest {
        node: &node,
        labels: &[Label::new("linux")],
        channel: &channel,
        sink: &sink,
        cancellation: &cancellation,
    });
    let Decision::Rejected(rejection) = decision else {
        panic!("expected rejection");
    };
    assert_eq!(rejection.failure.kind, FailureKind::Transport);
    assert_eq!(rejection.message(), "channel closed: remote hung up");
    assert!(sink.contains("node agent-1 rejected: channel closed: remote hung up"));
}

/// Tests any failing label chain rejects, and later labels do not run.
#[test]
fn any_failing_label_rejects_node() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(Label::new("a"), VerifierChain::new().with(ScriptedVerifier::pass("a1", &journal)))
        .unwrap();
    registry
        .register(
            Label::new("b"),
            VerifierChain::new().with(ScriptedVerifier::fail("b1", "no docker", &journal)),
        )
        .unwrap();
    registry
        .register(Label::new("c"), VerifierChain::new().with(ScriptedVerifier::pass("c1", &journal)))
        .unwrap();
    let controller = NodeAdmissionController::new(registry);
    let node = NodeHandle::new("agent-1", "/srv/agent");
    let decision = admit(&controller, &node, &[Label::new("a"), Label::new("b"), Label::new("c")]);
    assert_eq!(decision.message(), Some("no docker"));
    assert_eq!(journal.entries(), vec!["a1", "b1"]);
}

/// Tests labels run in declaration order, once each, and unknown labels pass.
#[test]
fn labels_run_in_declared_order_without_duplicates() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(Label::new("a"), VerifierChain::new().with(ScriptedVerifier::pass("a1", &journal)))
        .unwrap();
    registry
        .register(Label::new("b"), VerifierChain::new().with(ScriptedVerifier::pass("b1", &journal)))
        .unwrap();
    let controller = NodeAdmissionController::new(registry);
    let node = NodeHandle::new("agent-1", "/srv/agent");
    let labels = [Label::new("b"), Label::new("unconfigured"), Label::new("a"), Label::new("b")];
    let channel = FixedChannel::healthy();
    let sink = MemoryDiagnosticSink::new();
    let cancellation = CancellationToken::new();
    let attempt = controller.evaluate(&AdmissionRequest {
        node: &node,
        labels: &labels,
        channel: &channel,
        sink: &sink,
        cancellation: &cancellation,
    });
    assert_eq!(attempt.state(), AttemptState::Admitted);
    assert_eq!(attempt.labels, vec![Label::new("b"), Label::new("unconfigured"), Label::new("a")]);
    assert_eq!(journal.entries(), vec!["b1", "a1"]);
    assert_eq!(attempt.steps.len(), 2);
    assert_eq!(attempt.steps[0].label, Label::new("b"));
}

/// Tests label lookup is case-sensitive.
#[test]
fn label_lookup_is_case_sensitive() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(
            Label::new("Linux"),
            VerifierChain::new().with(ScriptedVerifier::fail("f", "rejected", &journal)),
        )
        .unwrap();
    let controller = NodeAdmissionController::new(registry);
    let node = NodeHandle::new("agent-1", "/srv/agent");
    assert!(admit(&controller, &node, &[Label::new("linux")]).is_admitted());
    assert!(journal.entries().is_empty());
}

/// Tests duplicate label registration fails.
#[test]
fn duplicate_label_registration_fails() {
    let mut registry = LabelRegistry::new();
    registry.register(Label::new("foo"), VerifierChain::new()).unwrap();
    assert_eq!(
        registry.register(Label::new("foo"), VerifierChain::new()),
        Err(RegistryError::DuplicateLabel(Label::new("foo")))
    );
    assert_eq!(registry.len(), 1);
}

// ============================================================================
// SECTION: Pool and Audit Tests
// ============================================================================

/// Tests admitted nodes are finalized and rejected nodes torn down.
#[test]
fn pool_only_finalizes_admitted_nodes() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(Label::new("ok"), VerifierChain::new().with(ScriptedVerifier::pass("p", &journal)))
        .unwrap();
    registry
        .register(
            Label::new("bad"),
            VerifierChain::new().with(ScriptedVerifier::fail("f", "wrong os", &journal)),
        )
        .unwrap();
    let pool = Arc::new(InMemoryNodePool::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let controller = NodeAdmissionController::new(registry)
        .with_pool(pool.clone())
        .with_audit_sink(audit.clone());
    let good = NodeHandle::new("good", "/srv/good");
    let bad = NodeHandle::new("bad", "/srv/bad");
    assert!(admit(&controller, &good, &[Label::new("ok")]).is_admitted());
    assert!(!admit(&controller, &bad, &[Label::new("bad")]).is_admitted());

    assert!(pool.is_admitted(&good.name));
    assert!(!pool.is_admitted(&bad.name));
    assert_eq!(pool.rejection_for(&bad.name).map(|r| r.failure.message), Some("wrong os".to_string()));

    let events = audit.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].decision, "admitted");
    assert_eq!(events[0].attempt_id, "attempt-1");
    assert_eq!(events[1].decision, "rejected");
    assert_eq!(events[1].attempt_id, "attempt-2");
    assert_eq!(events[1].failed_label.as_deref(), Some("bad"));
    assert_eq!(events[1].failure_kind, Some(FailureKind::Rejected));
    assert_eq!(events[1].message.as_deref(), Some("wrong os"));
}

// ============================================================================
// SECTION: Cancellation Tests
// ============================================================================

/// Tests an external cancel interrupts an in-flight verifier.
#[test]
fn external_cancel_interrupts_in_flight_verifier() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(
            Label::new("slow"),
            VerifierChain::new()
                .with(WaitForCancelVerifier {
                    journal: journal.clone(),
                })
                .with(ScriptedVerifier::pass("after", &journal)),
        )
        .unwrap();
    let pool = Arc::new(InMemoryNodePool::new());
    let controller = NodeAdmissionController::new(registry).with_pool(pool.clone());
    let node = NodeHandle::new("agent-1", "/srv/agent");
    let cancellation = CancellationToken::new();

    let decision = thread::scope(|scope| {
        let canceller = cancellation.clone();
        scope.spawn(move || {
            thread::sleep(Duration::from_millis(50));
            canceller.cancel("node disconnected");
        });
        let channel = FixedChannel::healthy();
        let sink = MemoryDiagnosticSink::new();
        controller.admit(&AdmissionRequest {
            node: &node,
            labels: &[Label::new("slow")],
            channel: &channel,
            sink: &sink,
            cancellation: &cancellation,
        })
    });

    let Decision::Rejected(rejection) = decision else {
        panic!("expected rejection");
    };
    assert_eq!(rejection.failure.kind, FailureKind::Cancelled);
    assert_eq!(rejection.message(), "verification cancelled: node disconnected");
    assert_eq!(journal.entries(), vec!["wait"]);
    assert!(!pool.is_admitted(&node.name));
}

/// Tests the configured attempt timeout rejects a slow node.
#[test]
fn attempt_timeout_rejects_slow_node() {
    let mut registry = LabelRegistry::new();
    registry
        .register(
            Label::new("slow"),
            VerifierChain::new().with(WaitForCancelVerifier {
                journal: Journal::default(),
            }),
        )
        .unwrap();
    let controller = NodeAdmissionController::new(registry).with_config(AdmissionConfig {
        attempt_timeout: Some(Duration::from_millis(30)),
    });
    let node = NodeHandle::new("agent-1", "/srv/agent");
    let decision = admit(&controller, &node, &[Label::new("slow")]);
    assert_eq!(decision.message(), Some("verification timed out"));
}

/// Tests a verifier that passes after the deadline still leaves the node rejected.
#[test]
fn deadline_passing_during_last_verifier_rejects_node() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(
            Label::new("slow"),
            VerifierChain::new().with(SlowPassVerifier {
                delay: Duration::from_millis(200),
                journal: journal.clone(),
            }),
        )
        .unwrap();
    let pool = Arc::new(InMemoryNodePool::new());
    let controller = NodeAdmissionController::new(registry)
        .with_pool(pool.clone())
        .with_config(AdmissionConfig {
            attempt_timeout: Some(Duration::from_millis(30)),
        });
    let node = NodeHandle::new("agent-1", "/srv/agent");

    let Decision::Rejected(rejection) = admit(&controller, &node, &[Label::new("slow")]) else {
        panic!("expected rejection after the deadline");
    };
    assert_eq!(rejection.failure.kind, FailureKind::Cancelled);
    assert_eq!(rejection.message(), "verification timed out");
    assert_eq!(rejection.verifier, None);
    assert_eq!(rejection.verifier_index, None);
    assert_eq!(journal.entries(), vec!["slow_pass"]);
    assert!(!pool.is_admitted(&node.name));
}

/// Tests a chain stopped by cancellation names no verifier that never ran.
#[test]
fn cancellation_between_verifiers_names_no_verifier() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(
            Label::new("slow"),
            VerifierChain::new()
                .with(SlowPassVerifier {
                    delay: Duration::from_millis(200),
                    journal: journal.clone(),
                })
                .with(ScriptedVerifier::pass("after", &journal)),
        )
        .unwrap();
    let audit = Arc::new(MemoryAuditSink::new());
    let controller = NodeAdmissionController::new(registry)
        .with_audit_sink(audit.clone())
        .with_config(AdmissionConfig {
            attempt_timeout: Some(Duration::from_millis(30)),
        });
    let node = NodeHandle::new("agent-1", "/srv/agent");

    let Decision::Rejected(rejection) = admit(&controller, &node, &[Label::new("slow")]) else {
        panic!("expected rejection after the deadline");
    };
    assert_eq!(rejection.label, Some(Label::new("slow")));
    assert_eq!(rejection.verifier, None);
    assert_eq!(rejection.verifier_index, None);
    assert_eq!(rejection.message(), "verification timed out");
    assert_eq!(journal.entries(), vec!["slow_pass"]);
    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].failed_verifier, None);
    assert_eq!(events[0].failure_kind, Some(FailureKind::Cancelled));
}

/// Tests a node cancelled before admission starts is rejected immediately.
#[test]
fn pre_cancelled_attempt_is_rejected() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(Label::new("a"), VerifierChain::new().with(ScriptedVerifier::pass("a1", &journal)))
        .unwrap();
    let controller = NodeAdmissionController::new(registry);
    let node = NodeHandle::new("agent-1", "/srv/agent");
    let channel = FixedChannel::healthy();
    let sink = MemoryDiagnosticSink::new();
    let cancellation = CancellationToken::new();
    cancellation.cancel("shutdown");
    let attempt = controller.evaluate(&AdmissionRequest {
        node: &node,
        labels: &[Label::new("a")],
        channel: &channel,
        sink: &sink,
        cancellation: &cancellation,
    });
    assert_eq!(attempt.state(), AttemptState::Rejected);
    assert_eq!(attempt.decision().and_then(Decision::message), Some("verification cancelled: shutdown"));
    assert!(journal.entries().is_empty());
}

// ============================================================================
// SECTION: Concurrency Tests
// ============================================================================

/// Tests concurrent admissions of distinct nodes do not interfere.
#[test]
fn concurrent_admissions_are_independent() {
    let journal = Journal::default();
    let mut registry = LabelRegistry::new();
    registry
        .register(
            Label::new("pass"),
            VerifierChain::new()
                .with(ScriptedVerifier::pass("p1", &journal))
                .with(ScriptedVerifier::pass("p2", &journal)),
        )
        .unwrap();
    registry
        .register(
            Label::new("fail"),
            VerifierChain::new().with(ScriptedVerifier::fail("f1", "tool missing", &journal)),
        )
        .unwrap();
    let pool = Arc::new(InMemoryNodePool::new());
    let controller = NodeAdmissionController::new(registry).with_pool(pool.clone());

    let results: Vec<(String, Decision, Vec<String>)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|index| {
                let controller = &controller;
                scope.spawn(move || {
                    let label = if index % 2 == 0 { "pass" } else { "fail" };
                    let node = NodeHandle::new(format!("node-{index}"), "/srv/agent");
                    let channel = FixedChannel::healthy();
                    let sink = MemoryDiagnosticSink::new();
                    let cancellation = CancellationToken::new();
                    let decision = controller.admit(&AdmissionRequest {
                        node: &node,
                        labels: &[Label::new(label)],
                        channel: &channel,
                        sink: &sink,
                        cancellation: &cancellation,
                    });
                    (label.to_string(), decision, sink.lines())
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for (index, (label, decision, lines)) in results.iter().enumerate() {
        let node = format!("node-{index}");
        if label == "pass" {
            assert!(decision.is_admitted());
            assert!(pool.is_admitted(&node.as_str().into()));
        } else {
            assert_eq!(decision.message(), Some("tool missing"));
        }
        assert!(lines.iter().all(|line| !line.contains("checked") || line.ends_with(&node)));
    }
    assert_eq!(pool.admitted().len(), 4);
}
