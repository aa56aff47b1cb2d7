// ── Core error types ──
//
// Every public manager operation returns exactly one terminal error from
// this enum. Remote and collaborator failures are carried verbatim in
// `Provider`; the delete loop's transient dependency refusal never surfaces
// on its own, only as `Timeout` once the deadline is spent.

use thiserror::Error;

use crate::provider::ProviderError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Input errors ─────────────────────────────────────────────────
    /// Malformed ingress rule. Raised before any remote call is made.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Remote errors ────────────────────────────────────────────────
    /// Provider API or collaborator failure, surfaced as-is.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Delete deadline exceeded while the group was still referenced.
    /// The group may still exist remotely.
    #[error(
        "Timed out after {timeout_secs}s waiting for security group {group_id} to be deleted ({attempts} attempts)"
    )]
    Timeout {
        group_id: String,
        timeout_secs: u64,
        attempts: u32,
    },

    // ── Caller errors ────────────────────────────────────────────────
    /// The caller's cancellation token fired.
    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns `true` for malformed-input errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if the delete deadline was exceeded.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the caller cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The provider error code, if this wraps a remote failure that has one.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Provider(e) => e.code(),
            _ => None,
        }
    }
}
