//! Scheduler configuration
//!
//! Defines all configurable parameters for the task scheduler including
//! polling cadence, batch size, parallelism and the optional liveness guards.

use std::time::Duration;

/// Scheduler configuration
///
/// All intervals are configurable to allow tuning for different deployment
/// scenarios (a single embedded scheduler vs. several worker processes).
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier used in logs to tell workers apart
    pub worker_id: String,

    /// Delay between the end of one tick and the start of the next
    pub poll_interval: Duration,

    /// Maximum number of pending tasks fetched per tick
    pub batch_size: usize,

    /// Maximum number of tasks of one batch executing at the same time
    pub max_parallel_tasks: usize,

    /// Deadline for a single executor run; unbounded when `None`
    pub execution_timeout: Option<Duration>,

    /// Running tasks older than this are failed by the stale sweep;
    /// no sweep when `None`
    pub stale_after: Option<Duration>,

    /// Latency simulated by the built-in analysis executors
    pub simulated_latency: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(worker_id: String) -> Self {
        Self {
            worker_id,
            poll_interval: Duration::from_secs(5),
            batch_size: 10,
            max_parallel_tasks: 1,
            execution_timeout: None,
            stale_after: None,
            simulated_latency: Duration::from_secs(2),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - WORKER_ID (default: random UUID)
    /// - POLL_INTERVAL (seconds, default: 5)
    /// - TASK_BATCH_SIZE (default: 10)
    /// - MAX_PARALLEL_TASKS (default: 1)
    /// - TASK_EXECUTION_TIMEOUT (seconds, default: unset)
    /// - TASK_STALE_AFTER (seconds, default: unset)
    /// - SIMULATED_LATENCY_MS (milliseconds, default: 2000)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(worker_id) = std::env::var("WORKER_ID") {
            config.worker_id = worker_id;
        }
        if let Some(secs) = env_parse::<u64>("POLL_INTERVAL")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(size) = env_parse::<usize>("TASK_BATCH_SIZE")? {
            config.batch_size = size;
        }
        if let Some(parallel) = env_parse::<usize>("MAX_PARALLEL_TASKS")? {
            config.max_parallel_tasks = parallel;
        }
        config.execution_timeout =
            env_parse::<u64>("TASK_EXECUTION_TIMEOUT")?.map(Duration::from_secs);
        config.stale_after = env_parse::<u64>("TASK_STALE_AFTER")?.map(Duration::from_secs);
        if let Some(ms) = env_parse::<u64>("SIMULATED_LATENCY_MS")? {
            config.simulated_latency = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_id.is_empty() {
            anyhow::bail!("worker_id cannot be empty");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than 0");
        }

        if self.max_parallel_tasks == 0 {
            anyhow::bail!("max_parallel_tasks must be greater than 0");
        }

        if self.execution_timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("execution_timeout must be greater than 0 when set");
        }

        if self.stale_after.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("stale_after must be greater than 0 when set");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid value for {}: {:?} ({})", key, raw, e)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_parallel_tasks, 1);
        assert!(config.execution_timeout.is_none());
        assert!(config.stale_after.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        config.batch_size = 0;
        assert!(config.validate().is_err());
        config.batch_size = 10;

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.poll_interval = Duration::from_secs(1);

        config.execution_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
        config.execution_timeout = Some(Duration::from_secs(60));

        config.stale_after = Some(Duration::ZERO);
        assert!(config.validate().is_err());
        config.stale_after = Some(Duration::from_secs(1800));

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_worker_ids_are_unique() {
        assert_ne!(Config::default().worker_id, Config::default().worker_id);
    }
}
