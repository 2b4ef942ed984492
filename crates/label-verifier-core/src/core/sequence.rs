// crates/label-verifier-core/src/core/sequence.rs
// ============================================================================
// Module: Label Verifier Sequences
// Description: Thread-safe sequence and unique-name generators.
// Purpose: Replace process-wide counters with injected, scoped generators.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Sequence generators hand out monotonic values under concurrent use. They
//! are owned by the caller (a controller, a test, a CLI invocation) so two
//! scopes never share a counter by accident.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::core::identifiers::AttemptId;
use crate::core::identifiers::Label;

// ============================================================================
// SECTION: Sequence Generator
// ============================================================================

/// Monotonic counter safe under concurrent increment.
///
/// # Invariants
/// - Every call to [`SequenceGenerator::next`] returns a distinct value.
/// - The first value is `1`.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    /// Last value handed out.
    counter: AtomicU64,
}

impl SequenceGenerator {
    /// Creates a generator starting at `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the next sequence value.
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the next attempt identifier.
    pub fn next_attempt_id(&self) -> AttemptId {
        AttemptId::new(format!("attempt-{}", self.next()))
    }
}

// ============================================================================
// SECTION: Unique Names
// ============================================================================

/// Generates unique names by suffixing a prefix with a sequence value.
///
/// # Invariants
/// - Names produced by one generator are pairwise distinct.
#[derive(Debug)]
pub struct UniqueNameGenerator {
    /// Name prefix.
    prefix: String,
    /// Sequence backing the suffix.
    sequence: SequenceGenerator,
}

impl UniqueNameGenerator {
    /// Creates a generator for the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: SequenceGenerator::new(),
        }
    }

    /// Returns the next unique name (`foo1`, `foo2`, ...).
    pub fn next_name(&self) -> String {
        format!("{}{}", self.prefix, self.sequence.next())
    }

    /// Returns the next unique label.
    pub fn next_label(&self) -> Label {
        Label::new(self.next_name())
    }
}
