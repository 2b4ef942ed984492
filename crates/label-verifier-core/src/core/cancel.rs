// crates/label-verifier-core/src/core/cancel.rs
// ============================================================================
// Module: Label Verifier Cancellation
// Description: Cooperative cancellation tokens with optional deadlines.
// Purpose: Let callers abandon an admission attempt and interrupt checks.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`CancellationToken`] is shared between the party that may abandon an
//! attempt (timeout, node disconnect, operator interrupt) and the code that
//! runs verifiers. Clones observe the same cancellation flag. A token may also
//! carry a deadline; once it passes the token reports [`CancelReason::TimedOut`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;

// ============================================================================
// SECTION: Cancel Reason
// ============================================================================

/// Reason an attempt was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum CancelReason {
    /// Cancellation was requested explicitly.
    Requested(String),
    /// The attempt deadline passed.
    TimedOut,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested(reason) => write!(f, "verification cancelled: {reason}"),
            Self::TimedOut => f.write_str("verification timed out"),
        }
    }
}

// ============================================================================
// SECTION: Cancellation Token
// ============================================================================

/// Shared cancellation state.
#[derive(Debug, Default)]
struct CancelState {
    /// Set once cancellation has been requested.
    cancelled: AtomicBool,
    /// Reason recorded by the first cancel request.
    reason: Mutex<Option<String>>,
}

/// Cooperative cancellation token.
///
/// # Invariants
/// - Cancellation is sticky: once cancelled, a token never resets.
/// - The first explicit reason wins.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    /// Flag shared by all clones.
    state: Arc<CancelState>,
    /// Optional deadline local to this token.
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token sharing this token's flag with a deadline `timeout`
    /// from now. An earlier existing deadline is kept.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, candidate) {
            (Some(existing), Some(candidate)) => Some(existing.min(candidate)),
            (existing, None) => existing,
            (None, candidate) => candidate,
        };
        Self {
            state: Arc::clone(&self.state),
            deadline,
        }
    }

    /// Requests cancellation with a human-readable reason.
    pub fn cancel(&self, reason: impl Into<String>) {
        if let Ok(mut guard) = self.state.reason.lock()
            && guard.is_none()
        {
            *guard = Some(reason.into());
        }
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true when cancellation was requested or the deadline passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        if self.state.cancelled.load(Ordering::SeqCst) {
            let reason = self
                .state
                .reason
                .lock()
                .ok()
                .and_then(|guard| guard.clone())
                .unwrap_or_else(|| "cancelled".to_string());
            return Some(CancelReason::Requested(reason));
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::TimedOut),
            _ => None,
        }
    }

    /// Returns the remaining time before the deadline, if one is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
