//! The executor loop: claim, analyze, persist the terminal transition.
//!
//! Failure visibility has two channels with a fixed order: the job row is
//! updated first (source of truth for pollers), then the error propagates
//! to the run loop, which logs it for operational tooling. A live worker
//! never leaves a claimed job in running — every exit path of
//! [`Executor::process`] ends in a terminal transition attempt.
//!
//! Known limitation: a worker that crashes between claim and terminal
//! update strands the row in running, and analysis execution is not
//! exactly-once in general. Statuses never move backward, so there is no
//! automatic redelivery.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use finsight_agents::DocumentAnalyzer;
use finsight_core::document::{coerce_result, truncate_error_detail};
use finsight_db::models::analysis::AnalysisJob;
use finsight_db::repositories::AnalysisRepo;

use crate::config::WorkerConfig;

/// Processes claimed analysis jobs, one at a time.
///
/// The analyzer is injected once at construction; the executor holds no
/// other state beyond the pool, so multiple worker processes coordinate
/// purely through the database.
pub struct Executor {
    pool: PgPool,
    analyzer: Arc<dyn DocumentAnalyzer>,
    poll_interval: Duration,
    soft_timeout: Duration,
    hard_timeout: Duration,
}

impl Executor {
    pub fn new(pool: PgPool, analyzer: Arc<dyn DocumentAnalyzer>, config: &WorkerConfig) -> Self {
        Self {
            pool,
            analyzer,
            poll_interval: config.poll_interval,
            soft_timeout: config.soft_timeout,
            hard_timeout: config.hard_timeout,
        }
    }

    /// Run the executor loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            soft_timeout_secs = self.soft_timeout.as_secs(),
            hard_timeout_secs = self.hard_timeout.as_secs(),
            "Executor started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Executor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    // Drain all currently claimable jobs before sleeping
                    // again. Each failure is already persisted on the job
                    // row by the time it reaches this log line.
                    loop {
                        match self.run_once().await {
                            Ok(true) => continue,
                            Ok(false) => break,
                            Err(e) => {
                                tracing::error!(error = %e, "Job cycle failed");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Claim and process at most one job. `Ok(true)` when a job was
    /// claimed, `Ok(false)` when the queue was empty.
    pub async fn run_once(&self) -> anyhow::Result<bool> {
        let Some(job) = AnalysisRepo::claim_next(&self.pool).await? else {
            return Ok(false);
        };

        tracing::info!(
            job_id = %job.id,
            filename = %job.filename,
            "Job claimed",
        );

        self.process(job).await?;
        Ok(true)
    }

    /// Process one claimed (already running) job to a terminal state.
    ///
    /// Returns `Err` after the failed transition has been persisted so the
    /// run loop sees the failure too — database first, loop second.
    pub async fn process(&self, job: AnalysisJob) -> anyhow::Result<()> {
        let raw = match self.analyze_with_timeouts(&job).await {
            Ok(raw) => raw,
            Err(detail) => {
                self.fail_job(&job, &detail).await?;
                anyhow::bail!("job {} failed: {detail}", job.id);
            }
        };

        let result = coerce_result(&raw);

        match AnalysisRepo::complete(&self.pool, job.id, &result).await {
            Ok(true) => {
                tracing::info!(job_id = %job.id, "Job completed");
                Ok(())
            }
            Ok(false) => {
                // The row left running under our feet: an inconsistency
                // between claim and completion. Nothing to update; this is
                // a defect, not a caller-visible error.
                tracing::error!(
                    job_id = %job.id,
                    "Completion was a no-op: job not in running state",
                );
                anyhow::bail!("job {} vanished or transitioned concurrently", job.id);
            }
            Err(e) => {
                // Result obtained but persistence failed. The job must not
                // stay in running, so attempt the failed transition before
                // reporting.
                let detail = format!("failed to persist analysis result: {e}");
                self.fail_job(&job, &detail).await?;
                anyhow::bail!("job {} failed: {detail}", job.id);
            }
        }
    }

    /// Invoke the analyzer with the soft/hard timeout pair.
    ///
    /// On error the returned string is the human-readable failure detail
    /// to record on the job.
    async fn analyze_with_timeouts(&self, job: &AnalysisJob) -> Result<String, String> {
        let cancel = CancellationToken::new();

        // Soft threshold: request graceful self-termination. The guard is
        // aborted as soon as the analysis returns.
        let soft_guard = {
            let cancel = cancel.clone();
            let soft = self.soft_timeout;
            let job_id = job.id;
            tokio::spawn(async move {
                tokio::time::sleep(soft).await;
                tracing::warn!(
                    job_id = %job_id,
                    soft_timeout_secs = soft.as_secs(),
                    "Soft timeout reached, requesting analysis cancellation",
                );
                cancel.cancel();
            })
        };

        let outcome = tokio::time::timeout(
            self.hard_timeout,
            self.analyzer
                .analyze(&job.query, &job.document_path, cancel.clone()),
        )
        .await;
        soft_guard.abort();

        match outcome {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "analysis timed out after {}s (hard limit)",
                self.hard_timeout.as_secs()
            )),
        }
    }

    /// Persist the failed transition with bounded detail.
    ///
    /// A no-op outcome (job no longer running) is logged and tolerated; a
    /// database error here is propagated — there is nothing more the
    /// executor can do for this job.
    async fn fail_job(&self, job: &AnalysisJob, detail: &str) -> anyhow::Result<()> {
        let bounded = truncate_error_detail(detail);
        match AnalysisRepo::fail(&self.pool, job.id, &bounded).await {
            Ok(true) => {
                tracing::warn!(job_id = %job.id, error = %bounded, "Job failed");
                Ok(())
            }
            Ok(false) => {
                tracing::error!(
                    job_id = %job.id,
                    "Failure transition was a no-op: job not in running state",
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job.id,
                    error = %e,
                    "Could not persist failed transition",
                );
                Err(e.into())
            }
        }
    }
}
