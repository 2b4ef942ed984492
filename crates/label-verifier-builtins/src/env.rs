// crates/label-verifier-builtins/src/env.rs
// ============================================================================
// Module: Environment Verifier
// Description: Verifier requiring an environment variable on the node.
// Purpose: Gate labels on agent environment such as toolchain homes.
// Dependencies: label-verifier-core
// ============================================================================

//! ## Overview
//! The variable is read through the node's channel. When an expected value is
//! configured the variable must match it exactly; otherwise it only has to be
//! set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use label_verifier_core::ChannelError;
use label_verifier_core::CheckOutput;
use label_verifier_core::RemoteCheck;
use label_verifier_core::Verifier;
use label_verifier_core::VerifierError;
use label_verifier_core::VerifyContext;

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Requires an environment variable, optionally with a specific value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVarVerifier {
    /// Variable name.
    name: String,
    /// Required value, if any.
    expected: Option<String>,
}

impl EnvVarVerifier {
    /// Creates a verifier that only requires the variable to be set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: None,
        }
    }

    /// Requires the variable to equal `value`.
    #[must_use]
    pub fn with_expected(mut self, value: impl Into<String>) -> Self {
        self.expected = Some(value.into());
        self
    }
}

impl Verifier for EnvVarVerifier {
    fn kind(&self) -> &str {
        "env_var"
    }

    fn verify(&self, ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        let output = ctx.run_check(&RemoteCheck::EnvVar {
            name: self.name.clone(),
        })?;
        let CheckOutput::Env {
            value,
        } = output
        else {
            return Err(ChannelError::Protocol("env check returned non-env output".to_string())
                .into());
        };
        match (value, &self.expected) {
            (None, _) => Err(VerifierError::rejected(format!(
                "environment variable {} is not set",
                self.name
            ))),
            (Some(actual), Some(expected)) if actual != *expected => {
                Err(VerifierError::rejected(format!(
                    "environment variable {} is '{actual}' (expected '{expected}')",
                    self.name
                )))
            }
            (Some(_), _) => Ok(()),
        }
    }
}
