//! Analysis job entity: one submitted document analysis and its lifecycle.

use finsight_core::error::{CoreError, CoreResult};
use finsight_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{AnalysisStatus, StatusId};

/// A row from the `analysis_jobs` table.
///
/// The row is created by the submission handler with status `pending` and
/// mutated only by the worker (status, result, error_message, claimed_at,
/// completed_at). Query endpoints read it as-is.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisJob {
    /// Caller-visible task id (UUID v4), assigned at submission.
    pub id: Uuid,
    pub owner_id: Option<DbId>,
    /// Original upload filename.
    pub filename: String,
    /// Storage path of the persisted upload.
    pub document_path: String,
    /// Normalized analysis instruction.
    pub query: String,
    pub status_id: StatusId,
    /// Structured result payload; non-null iff completed.
    pub result: Option<serde_json::Value>,
    /// Bounded failure detail; non-null iff failed.
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    /// When a worker claimed the job (pending → running).
    pub claimed_at: Option<Timestamp>,
    /// Set exactly once, at the terminal transition.
    pub completed_at: Option<Timestamp>,
    /// Enqueue TTL: an unclaimed job past this instant is never executed.
    pub expires_at: Option<Timestamp>,
}

impl AnalysisJob {
    /// Decode the status column. Unknown ids cannot occur through the
    /// repository layer (the column is a FK to the seeded lookup table),
    /// so an error here is a data defect surfaced as internal.
    pub fn status(&self) -> CoreResult<AnalysisStatus> {
        AnalysisStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "invalid status_id {} for job {}",
                self.status_id, self.id
            ))
        })
    }
}

/// Fields needed to insert a new pending job.
#[derive(Debug)]
pub struct NewAnalysisJob<'a> {
    pub id: Uuid,
    pub owner_id: Option<DbId>,
    pub filename: &'a str,
    pub document_path: &'a str,
    pub query: &'a str,
    /// TTL in seconds applied as `expires_at = NOW() + ttl`.
    pub queue_ttl_secs: i64,
}
