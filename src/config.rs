use std::time::Duration;

/// Tuning knobs shared by the engine, the worker pool and the file registry.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EngineConfig {
    /// Number of ingestion workers consuming the job queue.
    pub workers: usize,
    /// Jobs that may wait in the queue before `submit` refuses new work.
    pub queue_capacity: usize,
    /// Parsed rows buffered between the CSV reader and the row processor.
    pub backpressure: usize,
    /// Rows between progress updates written to the registry.
    pub progress_interval: u64,
    /// Terminal task records kept in memory by the file registry.
    pub cache_capacity: u64,
    /// How long a cached terminal record is served before re-reading disk.
    pub cache_timeout: Duration
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 64,
            backpressure: 256,
            progress_interval: 100,
            cache_capacity: 10_000,
            cache_timeout: Duration::from_secs(300)
        }
    }
}

impl EngineConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity.max(1);
        self
    }

    pub fn with_backpressure(mut self, backpressure: usize) -> Self {
        self.backpressure = backpressure.max(1);
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: u64) -> Self {
        self.progress_interval = progress_interval.max(1);
        self
    }

    pub fn with_cache_capacity(mut self, cache_capacity: u64) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn with_cache_timeout(mut self, cache_timeout: Duration) -> Self {
        self.cache_timeout = cache_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;
    use std::time::Duration;

    #[test]
    fn test_builders_override_defaults() {
        let config = EngineConfig::default()
            .with_workers(2)
            .with_queue_capacity(8)
            .with_cache_timeout(Duration::from_secs(5));

        assert_eq!(config.workers, 2);
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.backpressure, 256);
        assert_eq!(config.cache_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builders_never_accept_zero_sized_pools() {
        let config = EngineConfig::default()
            .with_workers(0)
            .with_queue_capacity(0)
            .with_backpressure(0)
            .with_progress_interval(0);

        assert_eq!(config.workers, 1);
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.backpressure, 1);
        assert_eq!(config.progress_interval, 1);
    }
}
