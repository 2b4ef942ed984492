// crates/label-verifier-core/src/interfaces/mod.rs
// ============================================================================
// Module: Label Verifier Interfaces
// Description: Contracts for verifiers, channels, diagnostics, and node pools.
// Purpose: Define the seams the admission runtime is built against.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces describe how the admission runtime reaches a candidate node
//! ([`VerificationChannel`]), what a unit of admission logic looks like
//! ([`Verifier`]), where progress text goes ([`DiagnosticSink`]), and who acts
//! on the final decision ([`NodePool`]). None of them embed a transport.
//!
//! Security posture: channel output comes from an untrusted node and is only
//! ever treated as opaque text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::CancelReason;
use crate::core::CancellationToken;
use crate::core::Label;
use crate::core::NodeName;
use crate::core::Rejection;
use crate::core::RemotePath;

// ============================================================================
// SECTION: Node Handle
// ============================================================================

/// Node requesting admission.
///
/// # Invariants
/// - `workspace_root` is a path on the node, not on the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHandle {
    /// Node name.
    pub name: NodeName,
    /// Root directory verifiers may probe on the node.
    pub workspace_root: RemotePath,
}

impl NodeHandle {
    /// Creates a node handle.
    #[must_use]
    pub fn new(name: impl Into<NodeName>, workspace_root: impl Into<RemotePath>) -> Self {
        Self {
            name: name.into(),
            workspace_root: workspace_root.into(),
        }
    }
}

// ============================================================================
// SECTION: Diagnostic Sink
// ============================================================================

/// Receives human-readable progress and error lines.
pub trait DiagnosticSink: Send + Sync {
    /// Writes one line of diagnostic text.
    fn write_line(&self, line: &str);
}

// ============================================================================
// SECTION: Verification Channel
// ============================================================================

/// Check executed on the remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteCheck {
    /// Runs a script with the node's shell.
    Script {
        /// Script text.
        script: String,
        /// Working directory on the node.
        working_dir: Option<RemotePath>,
    },
    /// Probes a filesystem path.
    PathExists {
        /// Path on the node.
        path: RemotePath,
    },
    /// Reads an environment variable of the node's agent process.
    EnvVar {
        /// Variable name.
        name: String,
    },
}

impl RemoteCheck {
    /// Returns a stable label for the check type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Script {
                ..
            } => "script",
            Self::PathExists {
                ..
            } => "path_exists",
            Self::EnvVar {
                ..
            } => "env_var",
        }
    }
}

/// Output of a script check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// What a path probe found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathProbe {
    /// Nothing exists at the path.
    Missing,
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Something else (socket, device, ...).
    Other,
}

/// Output of a remote check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckOutput {
    /// Script result.
    Process(ProcessOutput),
    /// Path probe result.
    Path {
        /// Probe result.
        probe: PathProbe,
    },
    /// Environment variable value, `None` when unset.
    Env {
        /// Variable value.
        value: Option<String>,
    },
}

/// Channel errors raised while probing a node.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// I/O failure on the channel.
    #[error("channel io error: {0}")]
    Io(String),
    /// The channel closed before the check completed.
    #[error("channel closed: {0}")]
    Closed(String),
    /// The node answered with something the check did not expect.
    #[error("channel protocol error: {0}")]
    Protocol(String),
    /// The channel cannot run this kind of check.
    #[error("unsupported check: {0}")]
    Unsupported(String),
    /// The check was interrupted by cancellation.
    #[error("check cancelled")]
    Cancelled,
}

impl ChannelError {
    /// Returns the underlying detail text, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Io(detail)
            | Self::Closed(detail)
            | Self::Protocol(detail)
            | Self::Unsupported(detail) => Some(detail),
            Self::Cancelled => None,
        }
    }
}

/// Established connection to a candidate node.
///
/// Implementations must poll `cancellation` while a check is in flight and
/// return [`ChannelError::Cancelled`] promptly once it fires.
pub trait VerificationChannel: Send + Sync {
    /// Executes a check on the node, streaming output lines to `observer`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the check cannot be executed or is
    /// cancelled.
    fn run_remote_check(
        &self,
        check: &RemoteCheck,
        observer: &dyn DiagnosticSink,
        cancellation: &CancellationToken,
    ) -> Result<CheckOutput, ChannelError>;
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Errors a verifier reports.
///
/// # Invariants
/// - Display output is the exact diagnostic surfaced in a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    /// The verifier's own logic rejected the node.
    #[error("{0}")]
    Rejected(String),
    /// The channel failed while probing the node.
    #[error("{0}")]
    Transport(#[from] ChannelError),
    /// The attempt was abandoned.
    #[error("{0}")]
    Cancelled(CancelReason),
}

impl VerifierError {
    /// Creates a rejection with the given message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Everything a verifier may use while checking a node.
pub struct VerifyContext<'a> {
    /// Label whose chain is running.
    pub label: &'a Label,
    /// Node under verification.
    pub node: &'a NodeHandle,
    /// Channel to the node.
    pub channel: &'a dyn VerificationChannel,
    /// Diagnostic output.
    pub sink: &'a dyn DiagnosticSink,
    /// Cancellation for the attempt.
    pub cancellation: &'a CancellationToken,
}

impl VerifyContext<'_> {
    /// Returns the node's workspace root.
    #[must_use]
    pub const fn workspace_root(&self) -> &RemotePath {
        &self.node.workspace_root
    }

    /// Writes a diagnostic line.
    pub fn diagnostic(&self, text: &str) {
        self.sink.write_line(text);
    }

    /// Returns an error when the attempt has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::Cancelled`] once cancellation fired.
    pub fn checkpoint(&self) -> Result<(), VerifierError> {
        match self.cancellation.reason() {
            Some(reason) => Err(VerifierError::Cancelled(reason)),
            None => Ok(()),
        }
    }

    /// Runs a check on the node, translating channel cancellation into
    /// [`VerifierError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError`] when the attempt is cancelled or the channel
    /// fails.
    pub fn run_check(&self, check: &RemoteCheck) -> Result<CheckOutput, VerifierError> {
        self.checkpoint()?;
        match self.channel.run_remote_check(check, self.sink, self.cancellation) {
            Ok(output) => Ok(output),
            Err(ChannelError::Cancelled) => Err(VerifierError::Cancelled(
                self.cancellation
                    .reason()
                    .unwrap_or_else(|| CancelReason::Requested("channel interrupted".to_string())),
            )),
            Err(err) => Err(VerifierError::Transport(err)),
        }
    }
}

/// Single unit of admission logic.
///
/// Instances are shared across concurrent attempts; any internal state must
/// be immutable or synchronized.
pub trait Verifier: Send + Sync {
    /// Returns a stable kind label used in diagnostics and audit records.
    fn kind(&self) -> &str;

    /// Checks the node.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError`] when the node is unacceptable, the channel
    /// fails, or the attempt is cancelled.
    fn verify(&self, ctx: &VerifyContext<'_>) -> Result<(), VerifierError>;
}

// ============================================================================
// SECTION: Node Pool
// ============================================================================

/// External node-pool manager acting on admission decisions.
pub trait NodePool: Send + Sync {
    /// Completes the connection of an admitted node.
    fn finalize(&self, node: &NodeHandle);

    /// Tears down the connection of a rejected node.
    fn tear_down(&self, node: &NodeHandle, rejection: &Rejection);
}
