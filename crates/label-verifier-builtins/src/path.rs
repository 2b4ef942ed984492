// crates/label-verifier-builtins/src/path.rs
// ============================================================================
// Module: Path Verifier
// Description: Verifier requiring a file or directory on the node.
// Purpose: Check for installed tools or mounted volumes without a script.
// Dependencies: label-verifier-core, serde
// ============================================================================

//! ## Overview
//! Relative paths resolve against the node's workspace root using the node's
//! own separator; absolute paths are used as given.

// ============================================================================
// SECTION: Imports
// ============================================================================

use label_verifier_core::ChannelError;
use label_verifier_core::CheckOutput;
use label_verifier_core::PathProbe;
use label_verifier_core::RemoteCheck;
use label_verifier_core::Verifier;
use label_verifier_core::VerifierError;
use label_verifier_core::VerifyContext;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Path Kind
// ============================================================================

/// Kind of filesystem entry a path must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Any existing entry.
    #[default]
    Any,
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl PathKind {
    /// Returns true when `probe` satisfies this kind.
    #[must_use]
    pub const fn accepts(self, probe: PathProbe) -> bool {
        match (self, probe) {
            (_, PathProbe::Missing) => false,
            (Self::Any, _)
            | (Self::File, PathProbe::File)
            | (Self::Directory, PathProbe::Directory) => true,
            _ => false,
        }
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Requires a path to exist on the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExistsVerifier {
    /// Path, relative to the workspace root unless absolute.
    path: String,
    /// Required entry kind.
    kind: PathKind,
}

impl PathExistsVerifier {
    /// Creates a verifier accepting any entry kind.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: PathKind::Any,
        }
    }

    /// Restricts the accepted entry kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: PathKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Verifier for PathExistsVerifier {
    fn kind(&self) -> &str {
        "path_exists"
    }

    fn verify(&self, ctx: &VerifyContext<'_>) -> Result<(), VerifierError> {
        let target = ctx.workspace_root().join(&self.path);
        let output = ctx.run_check(&RemoteCheck::PathExists {
            path: target.clone(),
        })?;
        let CheckOutput::Path {
            probe,
        } = output
        else {
            return Err(ChannelError::Protocol("path check returned non-path output".to_string())
                .into());
        };
        if self.kind.accepts(probe) {
            return Ok(());
        }
        let message = match (probe, self.kind) {
            (PathProbe::Missing, _) => format!("required path {target} does not exist"),
            (_, PathKind::File) => format!("required path {target} is not a file"),
            (_, PathKind::Directory) => format!("required path {target} is not a directory"),
            (_, PathKind::Any) => format!("required path {target} is not usable"),
        };
        Err(VerifierError::rejected(message))
    }
}
