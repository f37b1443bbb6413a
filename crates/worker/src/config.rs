//! Worker configuration loaded from environment variables.

use std::time::Duration;

/// Tunables for the executor loop.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How often the loop looks for claimable jobs.
    pub poll_interval: Duration,
    /// Soft threshold: the analysis is asked to terminate gracefully.
    pub soft_timeout: Duration,
    /// Hard wall-clock cutoff: the attempt is abandoned and the job fails.
    pub hard_timeout: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `WORKER_POLL_INTERVAL_MS`    | `1000`  |
    /// | `ANALYSIS_SOFT_TIMEOUT_SECS` | `1500`  |
    /// | `ANALYSIS_HARD_TIMEOUT_SECS` | `1800`  |
    pub fn from_env() -> Self {
        let poll_interval_ms: u64 = std::env::var("WORKER_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("WORKER_POLL_INTERVAL_MS must be a valid u64");

        let soft_timeout_secs: u64 = std::env::var("ANALYSIS_SOFT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "1500".into())
            .parse()
            .expect("ANALYSIS_SOFT_TIMEOUT_SECS must be a valid u64");

        let hard_timeout_secs: u64 = std::env::var("ANALYSIS_HARD_TIMEOUT_SECS")
            .unwrap_or_else(|_| "1800".into())
            .parse()
            .expect("ANALYSIS_HARD_TIMEOUT_SECS must be a valid u64");

        Self {
            poll_interval: Duration::from_millis(poll_interval_ms),
            soft_timeout: Duration::from_secs(soft_timeout_secs),
            hard_timeout: Duration::from_secs(hard_timeout_secs),
        }
    }
}
