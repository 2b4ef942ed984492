// crates/label-verifier-builtins/src/factory.rs
// ============================================================================
// Module: Verifier Factory
// Description: Serializable verifier configuration and instance construction.
// Purpose: Turn declarative verifier entries into shared verifier instances.
// Dependencies: label-verifier-core, serde, thiserror
// ============================================================================

//! ## Overview
//! [`VerifierConfig`] is the tagged form a verifier takes in configuration
//! files (`type = "shell_script"`, ...). [`build_verifier`] validates one entry
//! and returns a shared instance; [`build_chain`] does the same for an ordered
//! list, preserving order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use label_verifier_core::Verifier;
use label_verifier_core::VerifierChain;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::EnvVarVerifier;
use crate::PathExistsVerifier;
use crate::PathKind;
use crate::ShellScriptVerifier;
use crate::StaticFail;
use crate::StaticPass;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum script size accepted by the factory.
pub const MAX_SCRIPT_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Verifier configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierConfigError {
    /// Script text is empty or whitespace.
    #[error("shell_script verifier requires a non-empty script")]
    EmptyScript,
    /// Script text exceeds [`MAX_SCRIPT_BYTES`].
    #[error("shell_script verifier script exceeds 65536 bytes")]
    ScriptTooLarge,
    /// Path is empty.
    #[error("path_exists verifier requires a non-empty path")]
    EmptyPath,
    /// Environment variable name is empty or contains `=`.
    #[error("env_var verifier has invalid variable name: {0}")]
    InvalidEnvName(String),
    /// Static failure message is empty.
    #[error("static_fail verifier requires a non-empty message")]
    EmptyMessage,
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Declarative verifier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum VerifierConfig {
    /// Always passes.
    StaticPass,
    /// Always rejects.
    StaticFail {
        /// Rejection message.
        message: String,
    },
    /// Runs a script in the workspace root.
    ShellScript {
        /// Script text.
        script: String,
        /// Exit code that counts as success.
        #[serde(default)]
        expected_exit_code: i32,
    },
    /// Requires a path on the node.
    PathExists {
        /// Path, relative to the workspace root unless absolute.
        path: String,
        /// Required entry kind.
        #[serde(default)]
        kind: PathKind,
    },
    /// Requires an environment variable on the node.
    EnvVar {
        /// Variable name.
        name: String,
        /// Required value, if any.
        #[serde(default)]
        expected: Option<String>,
    },
}

impl VerifierConfig {
    /// Returns the configuration type tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StaticPass => "static_pass",
            Self::StaticFail {
                ..
            } => "static_fail",
            Self::ShellScript {
                ..
            } => "shell_script",
            Self::PathExists {
                ..
            } => "path_exists",
            Self::EnvVar {
                ..
            } => "env_var",
        }
    }

    /// Validates the entry.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierConfigError`] when a required field is empty or a
    /// limit is exceeded.
    pub fn validate(&self) -> Result<(), VerifierConfigError> {
        match self {
            Self::StaticPass => Ok(()),
            Self::StaticFail {
                message,
            } => {
                if message.trim().is_empty() {
                    return Err(VerifierConfigError::EmptyMessage);
                }
                Ok(())
            }
            Self::ShellScript {
                script,
                ..
            } => {
                if script.trim().is_empty() {
                    return Err(VerifierConfigError::EmptyScript);
                }
                if script.len() > MAX_SCRIPT_BYTES {
                    return Err(VerifierConfigError::ScriptTooLarge);
                }
                Ok(())
            }
            Self::PathExists {
                path,
                ..
            } => {
                if path.trim().is_empty() {
                    return Err(VerifierConfigError::EmptyPath);
                }
                Ok(())
            }
            Self::EnvVar {
                name,
                ..
            } => {
                if name.is_empty() || name.contains('=') || name.contains('\0') {
                    return Err(VerifierConfigError::InvalidEnvName(name.clone()));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds a shared verifier from a validated entry.
///
/// # Errors
///
/// Returns [`VerifierConfigError`] when the entry fails validation.
pub fn build_verifier(config: &VerifierConfig) -> Result<Arc<dyn Verifier>, VerifierConfigError> {
    config.validate()?;
    let verifier: Arc<dyn Verifier> = match config {
        VerifierConfig::StaticPass => Arc::new(StaticPass),
        VerifierConfig::StaticFail {
            message,
        } => Arc::new(StaticFail::new(message.clone())),
        VerifierConfig::ShellScript {
            script,
            expected_exit_code,
        } => Arc::new(
            ShellScriptVerifier::new(script.clone()).with_expected_exit_code(*expected_exit_code),
        ),
        VerifierConfig::PathExists {
            path,
            kind,
        } => Arc::new(PathExistsVerifier::new(path.clone()).with_kind(*kind)),
        VerifierConfig::EnvVar {
            name,
            expected,
        } => {
            let verifier = EnvVarVerifier::new(name.clone());
            Arc::new(match expected {
                Some(value) => verifier.with_expected(value.clone()),
                None => verifier,
            })
        }
    };
    Ok(verifier)
}

/// Builds a chain from ordered entries.
///
/// # Errors
///
/// Returns the first [`VerifierConfigError`] encountered.
pub fn build_chain(configs: &[VerifierConfig]) -> Result<VerifierChain, VerifierConfigError> {
    let verifiers = configs.iter().map(build_verifier).collect::<Result<Vec<_>, _>>()?;
    Ok(VerifierChain::from_verifiers(verifiers))
}
