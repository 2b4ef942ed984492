// crates/label-verifier-builtins/src/lib.rs
// ============================================================================
// Module: Label Verifier Builtins
// Description: Built-in verifiers, their configuration, and a local channel.
// Purpose: Provide ready-made admission checks for common node requirements.
// Dependencies: label-verifier-core, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate ships built-in verifiers (static, shell script, path, env), a
//! serde-tagged [`VerifierConfig`] with a factory that turns it into shared
//! verifier instances, and [`LocalChannel`], a channel that runs checks on the
//! local machine.
//! Invariants:
//! - Verifiers reach the node only through the attempt's channel.
//! - Factory input is validated before any verifier is built.
//!
//! Security posture: check output is produced by the node and is untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod env;
pub mod factory;
pub mod local;
pub mod path;
pub mod script;
pub mod static_checks;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env::EnvVarVerifier;
pub use factory::MAX_SCRIPT_BYTES;
pub use factory::VerifierConfig;
pub use factory::VerifierConfigError;
pub use factory::build_chain;
pub use factory::build_verifier;
pub use local::LocalChannel;
pub use local::LocalChannelConfig;
pub use path::PathExistsVerifier;
pub use path::PathKind;
pub use script::ShellScriptVerifier;
pub use static_checks::StaticFail;
pub use static_checks::StaticPass;
