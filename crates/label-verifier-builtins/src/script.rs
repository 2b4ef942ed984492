// crates/label-verifier-builtins/src/script.rs
// ============================================================================
// Module: Shell Script Verifier
// Description: Verifier that runs a script on the node and checks its exit code.
// Purpose: Let operators express arbitrary node requirements as shell scripts.
// Dependencies: label-verifier-core
// ============================================================================

//! ## Overview
//! The script runs through the node's channel with the node's workspace root
//! as its working directory. Output lines are streamed to the attempt's
//! diagnostic sink by the channel; only the exit code decides the result.

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

/// Runs a shell script and expects a specific exit code.
///
/// # Invariants
/// - A missing exit code (the script was killed by a signal) rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScriptVerifier {
    /// Script text passed to the node's shell.
    script: String,
    /// Exit code that counts as success.
    expected_exit_code: i32,
}

impl ShellScriptVerifier {
    /// Creates a verifier expecting exit code 0.
    #[must_use]
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            expected_exit_code: 0,
        }
    }

    /// Overrides the expected exit code.
    #[must_use]
    pub const fn with_expected_exit_code(mut self, code: i32) -> Self {
        self.expected_exit_code = code;
        self
    }

    /// Returns the script text.
    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }
}

impl Verifier for ShellScriptVerifier {
    fn kind(&self) -> &str {
        "shell_script"
    }

    fn verify(&self, ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        ctx.diagnostic(&format!(
            "running verification script for label {} on {}",
            ctx.label, ctx.node.name
        ));
        let output = ctx.run_check(&RemoteCheck::Script {
            script: self.script.clone(),
            working_dir: Some(ctx.workspace_root().clone()),
        })?;
        let CheckOutput::Process(process) = output else {
            return Err(ChannelError::Protocol("script check returned non-process output".to_string())
                .into());
        };
        match process.exit_code {
            Some(code) if code == self.expected_exit_code => Ok(()),
            Some(code) => Err(VerifierError::rejected(format!(
                "script exited with code {code} (expected {})",
                self.expected_exit_code
            ))),
            None => Err(VerifierError::rejected("script terminated without an exit code")),
        }
    }
}
