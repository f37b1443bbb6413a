//! Lifecycle tests for the analysis job queue: creation, claim, terminal
//! transitions, expiry, retention, and the owner lookup.

use sqlx::PgPool;
use uuid::Uuid;

use finsight_db::models::analysis::NewAnalysisJob;
use finsight_db::models::status::AnalysisStatus;
use finsight_db::repositories::{AnalysisRepo, OwnerRepo};

/// Insert a pending job with the given TTL and return its id.
async fn submit_job(pool: &PgPool, ttl_secs: i64) -> Uuid {
    let id = Uuid::new_v4();
    let job = AnalysisRepo::create(
        pool,
        &NewAnalysisJob {
            id,
            owner_id: None,
            filename: "report.pdf",
            document_path: "data/report.pdf",
            query: "Analyze this",
            queue_ttl_secs: ttl_secs,
        },
    )
    .await
    .unwrap();
    assert_eq!(job.id, id);
    id
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_job_is_pending_with_empty_outcome(pool: PgPool) {
    let id = submit_job(&pool, 3600).await;

    let job = AnalysisRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(job.status().unwrap(), AnalysisStatus::Pending);
    assert!(job.result.is_none());
    assert!(job.error_message.is_none());
    assert!(job.claimed_at.is_none());
    assert!(job.completed_at.is_none());
    assert!(job.expires_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn jobs_get_distinct_ids_and_independent_rows(pool: PgPool) {
    let a = submit_job(&pool, 3600).await;
    let b = submit_job(&pool, 3600).await;
    assert_ne!(a, b);

    // Completing one job leaves the other untouched.
    AnalysisRepo::claim_next(&pool).await.unwrap().unwrap();
    let claimed = AnalysisRepo::find_by_id(&pool, a).await.unwrap().unwrap();
    assert_eq!(claimed.status().unwrap(), AnalysisStatus::Running);

    let other = AnalysisRepo::find_by_id(&pool, b).await.unwrap().unwrap();
    assert_eq!(other.status().unwrap(), AnalysisStatus::Pending);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_unknown_id_returns_none(pool: PgPool) {
    let found = AnalysisRepo::find_by_id(&pool, Uuid::new_v4()).await.unwrap();
    assert!(found.is_none());
}

// ---------------------------------------------------------------------------
// Claim (pending → running)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_transitions_oldest_pending_to_running(pool: PgPool) {
    let first = submit_job(&pool, 3600).await;
    let _second = submit_job(&pool, 3600).await;

    let claimed = AnalysisRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, first);
    assert_eq!(claimed.status().unwrap(), AnalysisStatus::Running);
    assert!(claimed.claimed_at.is_some());
    assert!(claimed.completed_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_on_empty_queue_returns_none(pool: PgPool) {
    assert!(AnalysisRepo::claim_next(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_pending_job_is_never_claimed(pool: PgPool) {
    // Negative TTL: expires_at is already in the past.
    let expired = submit_job(&pool, -10).await;

    assert!(AnalysisRepo::claim_next(&pool).await.unwrap().is_none());

    // The row itself is still there and still pending.
    let job = AnalysisRepo::find_by_id(&pool, expired)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.status().unwrap(), AnalysisStatus::Pending);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn running_job_is_not_claimed_again(pool: PgPool) {
    submit_job(&pool, 3600).await;
    AnalysisRepo::claim_next(&pool).await.unwrap().unwrap();
    assert!(AnalysisRepo::claim_next(&pool).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Terminal transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_stores_result_and_completed_at(pool: PgPool) {
    let id = submit_job(&pool, 3600).await;
    AnalysisRepo::claim_next(&pool).await.unwrap().unwrap();

    let payload = serde_json::json!({ "recommendation": "BUY", "confidence_score": 80 });
    assert!(AnalysisRepo::complete(&pool, id, &payload).await.unwrap());

    let job = AnalysisRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(job.status().unwrap(), AnalysisStatus::Completed);
    assert_eq!(job.result, Some(payload));
    assert!(job.error_message.is_none());
    assert!(job.completed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_requires_running_state(pool: PgPool) {
    let id = submit_job(&pool, 3600).await;

    // Still pending: the guarded update is a no-op.
    let payload = serde_json::json!({ "ok": true });
    assert!(!AnalysisRepo::complete(&pool, id, &payload).await.unwrap());

    let job = AnalysisRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(job.status().unwrap(), AnalysisStatus::Pending);
    assert!(job.result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fail_requires_running_state(pool: PgPool) {
    let id = submit_job(&pool, 3600).await;

    // Still pending: there is no direct pending → failed edge.
    assert!(!AnalysisRepo::fail(&pool, id, "boom").await.unwrap());

    let job = AnalysisRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(job.status().unwrap(), AnalysisStatus::Pending);
    assert!(job.error_message.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fail_stores_detail_and_completed_at(pool: PgPool) {
    let id = submit_job(&pool, 3600).await;
    AnalysisRepo::claim_next(&pool).await.unwrap().unwrap();

    assert!(AnalysisRepo::fail(&pool, id, "analysis timed out after 1800s (hard limit)")
        .await
        .unwrap());

    let job = AnalysisRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(job.status().unwrap(), AnalysisStatus::Failed);
    assert!(job.error_message.as_deref().unwrap().contains("timed out"));
    assert!(job.result.is_none());
    assert!(job.completed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn terminal_job_never_transitions_again(pool: PgPool) {
    let id = submit_job(&pool, 3600).await;
    AnalysisRepo::claim_next(&pool).await.unwrap().unwrap();

    let payload = serde_json::json!({ "recommendation": "HOLD" });
    assert!(AnalysisRepo::complete(&pool, id, &payload).await.unwrap());

    // A late failure report loses deterministically.
    assert!(!AnalysisRepo::fail(&pool, id, "too late").await.unwrap());
    // And so does a repeated completion.
    assert!(!AnalysisRepo::complete(&pool, id, &payload).await.unwrap());

    let job = AnalysisRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(job.status().unwrap(), AnalysisStatus::Completed);
    assert!(job.error_message.is_none());
}

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn retention_deletes_only_old_terminal_jobs(pool: PgPool) {
    let done = submit_job(&pool, 3600).await;
    AnalysisRepo::claim_next(&pool).await.unwrap().unwrap();
    AnalysisRepo::fail(&pool, done, "boom").await.unwrap();

    let _still_pending = submit_job(&pool, 3600).await;

    // Cutoff in the future relative to the job's completion: the terminal
    // row qualifies, the pending row (no completed_at) never does.
    let cutoff = chrono::Utc::now() + chrono::Duration::hours(1);
    let deleted = AnalysisRepo::delete_completed_before(&pool, cutoff)
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert!(AnalysisRepo::find_by_id(&pool, done).await.unwrap().is_none());

    // Idempotent: nothing new to reclaim.
    let deleted_again = AnalysisRepo::delete_completed_before(&pool, cutoff)
        .await
        .unwrap();
    assert_eq!(deleted_again, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn retention_spares_recent_terminal_jobs(pool: PgPool) {
    let id = submit_job(&pool, 3600).await;
    AnalysisRepo::claim_next(&pool).await.unwrap().unwrap();
    let payload = serde_json::json!({ "recommendation": "SELL" });
    AnalysisRepo::complete(&pool, id, &payload).await.unwrap();

    // Cutoff in the past: the freshly completed row survives.
    let cutoff = chrono::Utc::now() - chrono::Duration::hours(24);
    let deleted = AnalysisRepo::delete_completed_before(&pool, cutoff)
        .await
        .unwrap();
    assert_eq!(deleted, 0);
    assert!(AnalysisRepo::find_by_id(&pool, id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Owners
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_lookup_or_create_is_idempotent(pool: PgPool) {
    let first = OwnerRepo::get_or_create(&pool, "analyst@example.com")
        .await
        .unwrap();
    let second = OwnerRepo::get_or_create(&pool, "analyst@example.com")
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let other = OwnerRepo::get_or_create(&pool, "other@example.com")
        .await
        .unwrap();
    assert_ne!(first.id, other.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn jobs_can_be_listed_by_owner(pool: PgPool) {
    let owner = OwnerRepo::get_or_create(&pool, "analyst@example.com")
        .await
        .unwrap();

    let id = Uuid::new_v4();
    AnalysisRepo::create(
        &pool,
        &NewAnalysisJob {
            id,
            owner_id: Some(owner.id),
            filename: "report.pdf",
            document_path: "data/report.pdf",
            query: "Analyze this",
            queue_ttl_secs: 3600,
        },
    )
    .await
    .unwrap();

    let jobs = AnalysisRepo::list_by_owner(&pool, owner.id, 50, 0)
        .await
        .unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, id);
}
