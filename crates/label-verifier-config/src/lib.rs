// crates/label-verifier-config/src/lib.rs
// ============================================================================
// Module: Label Verifier Config Library
// Description: Canonical config model, validation, and registry construction.
// Purpose: Single source of truth for label-verifier.toml semantics.
// Dependencies: label-verifier-core, label-verifier-builtins, serde, toml
// ============================================================================

//! ## Overview
//! `label-verifier-config` defines the configuration model that maps labels to
//! ordered verifier chains, together with admission and audit settings. It
//! provides strict, fail-closed validation and builds the runtime objects the
//! admission controller needs.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
