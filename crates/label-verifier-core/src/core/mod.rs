// crates/label-verifier-core/src/core/mod.rs
// ============================================================================
// Module: Label Verifier Core Types
// Description: Identifiers, outcomes, attempts, cancellation, and sequences.
// Purpose: Group the data model shared by interfaces and runtime.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types are plain data with no I/O. Runtime components build on them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod attempt;
pub mod cancel;
pub mod identifiers;
pub mod outcome;
pub mod sequence;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use attempt::AttemptState;
pub use attempt::ConnectionAttempt;
pub use attempt::StepRecord;
pub use cancel::CancelReason;
pub use cancel::CancellationToken;
pub use identifiers::AttemptId;
pub use identifiers::IdentifierError;
pub use identifiers::Label;
pub use identifiers::MAX_LABEL_NAME_BYTES;
pub use identifiers::NodeName;
pub use identifiers::RemotePath;
pub use outcome::Decision;
pub use outcome::FailureKind;
pub use outcome::Rejection;
pub use outcome::VerificationFailure;
pub use outcome::VerificationOutcome;
pub use sequence::SequenceGenerator;
pub use sequence::UniqueNameGenerator;
