//! Domain error taxonomy.
//!
//! Every caller-visible failure is one of these variants; the api crate
//! maps them onto HTTP statuses. Executor-internal defects (e.g. a claimed
//! job row disappearing mid-flight) are not represented here — they are
//! logged by the worker and never reach a caller.

/// Domain-level error shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// Invalid caller input at submission time. Nothing was persisted.
    #[error("{0}")]
    Validation(String),

    /// The job exists but has not reached a terminal state yet.
    #[error("Analysis still processing. Current status: {status}")]
    StillProcessing { status: &'static str },

    /// The job reached the failed state; carries the recorded detail.
    #[error("Analysis failed: {0}")]
    JobFailed(String),

    /// A uniqueness or state conflict.
    #[error("{0}")]
    Conflict(String),

    /// An unexpected internal error. The message is logged, never shown
    /// verbatim to callers.
    #[error("{0}")]
    Internal(String),
}

/// Convenience alias for fallible domain operations.
pub type CoreResult<T> = Result<T, CoreError>;
