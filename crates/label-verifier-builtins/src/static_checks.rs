// crates/label-verifier-builtins/src/static_checks.rs
// ============================================================================
// Module: Static Verifiers
// Description: Verifiers with a fixed result.
// Purpose: Pin labels open or closed without touching the node.
// Dependencies: label-verifier-core
// ============================================================================

//! ## Overview
//! [`StaticPass`] always admits and [`StaticFail`] always rejects with a
//! configured message. Neither uses the channel.

// ============================================================================
// SECTION: Imports
// ============================================================================

use label_verifier_core::Verifier;
use label_verifier_core::VerifierError;
use label_verifier_core::VerifyContext;

// ============================================================================
// SECTION: Verifiers
// ============================================================================

/// Verifier that always passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPass;

impl Verifier for StaticPass {
    fn kind(&self) -> &str {
        "static_pass"
    }

    fn verify(&self, _ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        Ok(())
    }
}

/// Verifier that always rejects with a fixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFail {
    /// Rejection message.
    message: String,
}

impl StaticFail {
    /// Creates a verifier rejecting with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Verifier for StaticFail {
    fn kind(&self) -> &str {
        "static_fail"
    }

    fn verify(&self, _ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        Err(VerifierError::rejected(self.message.clone()))
    }
}
