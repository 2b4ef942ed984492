// crates/label-verifier-core/src/runtime/mod.rs
// ============================================================================
// Module: Label Verifier Runtime
// Description: Chain execution, label registry, admission control, pools.
// Purpose: Group the runtime components built on core types and interfaces.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components execute verifiers and decide admission.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod chain;
pub mod controller;
pub mod pool;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use chain::ChainReport;
pub use chain::ChainStep;
pub use chain::VerifierChain;
pub use chain::run_capturing;
pub use controller::AdmissionConfig;
pub use controller::AdmissionRequest;
pub use controller::NodeAdmissionController;
pub use pool::InMemoryNodePool;
pub use pool::NoopNodePool;
pub use registry::LabelRegistry;
pub use registry::RegistryError;
