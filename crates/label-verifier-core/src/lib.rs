// crates/label-verifier-core/src/lib.rs
// ============================================================================
// Module: Label Verifier Core Library
// Description: Public API surface for the label verifier core.
// Purpose: Expose core types, interfaces, and the admission runtime.
// Dependencies: crate::{audit, core, diagnostics, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Label verifier core decides whether a worker node may join a pool. Each
//! label carries an ordered chain of verifiers; when a node connects under a
//! set of labels, the chains run sequentially against the node's channel and
//! the first failure rejects the node. The core is transport-agnostic and
//! integrates through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod diagnostics;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use audit::AdmissionAuditEvent;
pub use audit::AdmissionAuditSink;
pub use audit::FileAuditSink;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use diagnostics::MemoryDiagnosticSink;
pub use diagnostics::NoopDiagnosticSink;
pub use diagnostics::PrefixedSink;
pub use diagnostics::WriterDiagnosticSink;
pub use interfaces::ChannelError;
pub use interfaces::CheckOutput;
pub use interfaces::DiagnosticSink;
pub use interfaces::NodeHandle;
pub use interfaces::NodePool;
pub use interfaces::PathProbe;
pub use interfaces::ProcessOutput;
pub use interfaces::RemoteCheck;
pub use interfaces::VerificationChannel;
pub use interfaces::Verifier;
pub use interfaces::VerifierError;
pub use interfaces::VerifyContext;
pub use runtime::AdmissionConfig;
pub use runtime::AdmissionRequest;
pub use runtime::ChainReport;
pub use runtime::ChainStep;
pub use runtime::InMemoryNodePool;
pub use runtime::LabelRegistry;
pub use runtime::NodeAdmissionController;
pub use runtime::NoopNodePool;
pub use runtime::RegistryError;
pub use runtime::VerifierChain;
pub use runtime::run_capturing;

#[cfg(test)]
mod tests;
