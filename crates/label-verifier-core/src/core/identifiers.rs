// crates/label-verifier-core/src/core/identifiers.rs
// ============================================================================
// Module: Label Verifier Identifiers
// Description: Canonical opaque identifiers for labels, nodes, and attempts.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! This module defines the string-based identifiers used throughout the label
//! verifier. Identifiers are opaque and serialize as strings. Constructors
//! accept any string; [`Label::parse`] applies the naming rules enforced at
//! configuration boundaries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum label name length in bytes.
pub const MAX_LABEL_NAME_BYTES: usize = 255;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Label name was empty.
    #[error("label name must be non-empty")]
    EmptyLabel,
    /// Label name exceeded the length limit.
    #[error("label name exceeds 255 bytes: {0}")]
    LabelTooLong(String),
    /// Label name contained whitespace.
    #[error("label name must not contain whitespace: {0}")]
    LabelWhitespace(String),
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Label attached to nodes and verifier chains.
///
/// # Invariants
/// - Identity is the exact, case-sensitive name.
/// - Labels are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Creates a new label without validation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a label after enforcing naming rules.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the name is empty, too long, or
    /// contains whitespace.
    pub fn parse(name: impl Into<String>) -> Result<Self, IdentifierError> {
        let name = name.into();
        if name.is_empty() {
            return Err(IdentifierError::EmptyLabel);
        }
        if name.len() > MAX_LABEL_NAME_BYTES {
            return Err(IdentifierError::LabelTooLong(name));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(IdentifierError::LabelWhitespace(name));
        }
        Ok(Self(name))
    }

    /// Returns the label name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Name of a worker node requesting admission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeName(String);

impl NodeName {
    /// Creates a new node name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the node name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for NodeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Path on the remote node, kept as text because the remote platform may
/// differ from the controller's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemotePath(String);

impl RemotePath {
    /// Creates a new remote path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolves `relative` against this path. Absolute inputs are returned
    /// unchanged.
    #[must_use]
    pub fn join(&self, relative: &str) -> Self {
        if is_absolute(relative) || self.0.is_empty() {
            return Self::new(relative);
        }
        let separator = if self.0.contains('\\') && !self.0.contains('/') { '\\' } else { '/' };
        let base = self.0.trim_end_matches(['/', '\\']);
        Self(format!("{base}{separator}{relative}"))
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RemotePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RemotePath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identifier of a single connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(String);

impl AttemptId {
    /// Creates a new attempt identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true for POSIX absolute paths and Windows drive or UNC paths.
fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with("\\\\") {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

// ============================================================================
// SECTION: Tests
// ============================================================================
