// crates/label-verifier-core/src/runtime/pool.rs
// ============================================================================
// Module: Node Pools
// Description: Reference node-pool implementations.
// Purpose: Track which nodes were finalized or torn down.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryNodePool`] records admitted and rejected nodes; it backs the CLI
//! and tests. [`NoopNodePool`] ignores decisions for callers that consume the
//! returned [`crate::core::Decision`] directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::core::NodeName;
use crate::core::Rejection;
use crate::interfaces::NodeHandle;
use crate::interfaces::NodePool;

// ============================================================================
// SECTION: In-Memory Pool
// ============================================================================

/// Node pool that remembers decisions.
///
/// # Invariants
/// - A node is in at most one of the admitted and rejected sets.
#[derive(Debug, Default)]
pub struct InMemoryNodePool {
    /// Pool membership.
    state: Mutex<PoolState>,
}

/// Mutable pool contents.
#[derive(Debug, Default)]
struct PoolState {
    /// Finalized nodes.
    admitted: BTreeSet<NodeName>,
    /// Torn-down nodes and the reason.
    rejected: BTreeMap<NodeName, Rejection>,
}

impl InMemoryNodePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `node` was finalized.
    #[must_use]
    pub fn is_admitted(&self, node: &NodeName) -> bool {
        self.state.lock().is_ok_and(|state| state.admitted.contains(node))
    }

    /// Returns the rejection recorded for `node`.
    #[must_use]
    pub fn rejection_for(&self, node: &NodeName) -> Option<Rejection> {
        self.state.lock().ok().and_then(|state| state.rejected.get(node).cloned())
    }

    /// Returns the finalized nodes.
    #[must_use]
    pub fn admitted(&self) -> Vec<NodeName> {
        self.state
            .lock()
            .map(|state| state.admitted.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl NodePool for InMemoryNodePool {
    fn finalize(&self, node: &NodeHandle) {
        if let Ok(mut state) = self.state.lock() {
            state.rejected.remove(&node.name);
            state.admitted.insert(node.name.clone());
        }
    }

    fn tear_down(&self, node: &NodeHandle, rejection: &Rejection) {
        if let Ok(mut state) = self.state.lock() {
            state.admitted.remove(&node.name);
            state.rejected.insert(node.name.clone(), rejection.clone());
        }
    }
}

// ============================================================================
// SECTION: Noop Pool
// ============================================================================

/// Node pool that ignores decisions.
pub struct NoopNodePool;

impl NodePool for NoopNodePool {
    fn finalize(&self, _node: &NodeHandle) {}

    fn tear_down(&self, _node: &NodeHandle, _rejection: &Rejection) {}
}
