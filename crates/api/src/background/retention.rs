//! Retention sweeper: periodic deletion of old terminal analysis jobs.
//!
//! Deletes rows whose `completed_at` precedes now minus the retention
//! window. Pending and running rows have no `completed_at` and are never
//! touched, regardless of age — a failed job therefore stays queryable
//! until the sweeper reclaims it, so callers can always learn the failure
//! reason at least once.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use finsight_db::repositories::AnalysisRepo;

/// Default retention window: 7 days.
const DEFAULT_RETENTION_HOURS: i64 = 168;

/// How often the sweeper runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the retention sweep loop until `cancel` is triggered.
///
/// The window is read from `RETENTION_HOURS` (default 168).
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let retention_hours: i64 = std::env::var("RETENTION_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RETENTION_HOURS);

    tracing::info!(
        retention_hours,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Retention sweeper started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Retention sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::hours(retention_hours);
                match AnalysisRepo::delete_completed_before(&pool, cutoff).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Retention sweep: purged old jobs");
                        } else {
                            tracing::debug!("Retention sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Retention sweep failed");
                    }
                }
            }
        }
    }
}
