//! Repository for the `analysis_jobs` table.
//!
//! Status transitions are single-row guarded UPDATEs: each statement names
//! the status it expects to move from, so a racing or repeated transition
//! affects zero rows and degrades to a deterministic no-op, reported to the
//! caller as `false`. Statuses never move backward.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::analysis::{AnalysisJob, NewAnalysisJob};
use crate::models::status::AnalysisStatus;

/// Column list for `analysis_jobs` queries.
const COLUMNS: &str = "\
    id, owner_id, filename, document_path, query, status_id, \
    result, error_message, created_at, claimed_at, completed_at, expires_at";

/// Provides lifecycle operations for analysis jobs.
pub struct AnalysisRepo;

impl AnalysisRepo {
    /// Insert a new pending job. Because the table is also the work queue,
    /// this single statement is both "persist" and "enqueue".
    pub async fn create(
        pool: &PgPool,
        input: &NewAnalysisJob<'_>,
    ) -> Result<AnalysisJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO analysis_jobs \
                 (id, owner_id, filename, document_path, query, status_id, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW() + make_interval(secs => $7)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalysisJob>(&query)
            .bind(input.id)
            .bind(input.owner_id)
            .bind(input.filename)
            .bind(input.document_path)
            .bind(input.query)
            .bind(AnalysisStatus::Pending.id())
            .bind(input.queue_ttl_secs as f64)
            .fetch_one(pool)
            .await
    }

    /// Find a job by its caller-visible id.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AnalysisJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analysis_jobs WHERE id = $1");
        sqlx::query_as::<_, AnalysisJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest claimable pending job: the pending →
    /// running transition.
    ///
    /// `FOR UPDATE SKIP LOCKED` prevents double-claim when multiple worker
    /// processes poll concurrently. Jobs past their `expires_at` are never
    /// claimed and therefore never execute.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<AnalysisJob>, sqlx::Error> {
        let query = format!(
            "UPDATE analysis_jobs \
             SET status_id = $1, claimed_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM analysis_jobs \
                 WHERE status_id = $2 \
                   AND (expires_at IS NULL OR expires_at > NOW()) \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalysisJob>(&query)
            .bind(AnalysisStatus::Running.id())
            .bind(AnalysisStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Running → completed, storing the result payload and `completed_at`
    /// in one statement so readers can never observe completed with a null
    /// result.
    ///
    /// Returns `false` when the job was not in running (no-op).
    pub async fn complete(
        pool: &PgPool,
        id: Uuid,
        result: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE analysis_jobs \
             SET status_id = $2, result = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(AnalysisStatus::Completed.id())
        .bind(result)
        .bind(AnalysisStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// Running → failed, storing the (already bounded) error detail and
    /// `completed_at`. Only claimed jobs can fail; there is no direct
    /// pending → failed edge.
    ///
    /// Returns `false` when the job was not in running (no-op).
    pub async fn fail(pool: &PgPool, id: Uuid, error: &str) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE analysis_jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(AnalysisStatus::Failed.id())
        .bind(error)
        .bind(AnalysisStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// List a caller's jobs, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnalysisJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analysis_jobs \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AnalysisJob>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete terminal jobs whose `completed_at` precedes `cutoff`.
    ///
    /// Pending/running rows have a NULL `completed_at` and are never
    /// matched, regardless of age. Returns the number of rows deleted;
    /// repeated invocation with no newly expirable rows deletes zero.
    pub async fn delete_completed_before(
        pool: &PgPool,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, sqlx::Error> {
        let outcome = sqlx::query("DELETE FROM analysis_jobs WHERE completed_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(outcome.rows_affected())
    }
}
