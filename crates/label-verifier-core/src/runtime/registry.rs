// crates/label-verifier-core/src/runtime/registry.rs
// ============================================================================
// Module: Label Registry
// Description: Mapping from labels to their verifier chains.
// Purpose: Resolve the chain bound to each label claimed by a node.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The registry owns one [`VerifierChain`] per [`Label`]. Label names are
//! unique within a registry and compared case-sensitively. Chains are fixed
//! once registered; the controller shares the registry read-only across
//! concurrent attempts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::Label;
use crate::runtime::chain::VerifierChain;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A chain is already registered for the label.
    #[error("label already registered: {0}")]
    DuplicateLabel(Label),
}

// ============================================================================
// SECTION: Label Registry
// ============================================================================

/// Label to chain mapping.
///
/// # Invariants
/// - Each label maps to exactly one chain.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    /// Chains keyed by label.
    chains: BTreeMap<Label, VerifierChain>,
}

impl LabelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chain for a label.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateLabel`] when the label is taken.
    pub fn register(&mut self, label: Label, chain: VerifierChain) -> Result<(), RegistryError> {
        if self.chains.contains_key(&label) {
            return Err(RegistryError::DuplicateLabel(label));
        }
        self.chains.insert(label, chain);
        Ok(())
    }

    /// Returns the chain bound to `label`.
    #[must_use]
    pub fn chain_for(&self, label: &Label) -> Option<&VerifierChain> {
        self.chains.get(label)
    }

    /// Returns the registered labels in name order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.chains.keys()
    }

    /// Returns the number of registered labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns true when no label is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
