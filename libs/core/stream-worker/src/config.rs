//! Broker/worker configuration.

use crate::registry::StreamDef;

/// Runtime configuration for one queue's broker + worker runtime pairing.
///
/// Field names map directly onto the config keys a binary reads from the
/// environment (e.g. `REPLAY_MAX_ATTEMPTS`, `ANALYZER_MAX_ATTEMPTS`) — the
/// binary is responsible for parsing those into a `WorkerConfig`.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub queue_name: String,
    pub consumer_id: String,
    pub max_attempts: u32,
    pub base_retry_ms: u64,
    pub max_retry_ms: u64,
    pub dedupe_window_sec: u64,
    pub processing_stale_sec: u64,
    pub read_batch: usize,
    pub read_block_ms: u64,
    pub retry_drain_batch: usize,
    pub max_concurrent_jobs: usize,
}

impl WorkerConfig {
    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self {
            queue_name: S::QUEUE_NAME.to_string(),
            consumer_id: default_consumer_id(),
            max_attempts: S::MAX_ATTEMPTS,
            base_retry_ms: S::BASE_RETRY_MS,
            max_retry_ms: S::MAX_RETRY_MS,
            dedupe_window_sec: S::DEDUPE_WINDOW_SEC,
            processing_stale_sec: S::PROCESSING_STALE_SEC,
            read_batch: S::READ_BATCH,
            read_block_ms: S::READ_BLOCK_MS,
            retry_drain_batch: S::RETRY_DRAIN_BATCH,
            max_concurrent_jobs: 1,
        }
    }

    pub fn with_consumer_id(mut self, id: impl Into<String>) -> Self {
        self.consumer_id = id.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_retry_ms(mut self, ms: u64) -> Self {
        self.base_retry_ms = ms;
        self
    }

    pub fn with_dedupe_window_sec(mut self, secs: u64) -> Self {
        self.dedupe_window_sec = secs;
        self
    }

    pub fn with_processing_stale_sec(mut self, secs: u64) -> Self {
        self.processing_stale_sec = secs;
        self
    }

    pub fn with_max_concurrent_jobs(mut self, n: usize) -> Self {
        self.max_concurrent_jobs = n.max(1);
        self
    }

    pub fn group_name(&self) -> String {
        format!("{}:group", self.queue_name)
    }

    pub fn retry_key(&self) -> String {
        format!("{}:retry", self.queue_name)
    }

    pub fn failed_key(&self) -> String {
        format!("{}:failed", self.queue_name)
    }

    pub fn unprocessable_key(&self) -> String {
        format!("{}:failed:unprocessable", self.queue_name)
    }

    pub fn done_key(&self, fingerprint: &str) -> String {
        format!("{}:done:{}", self.queue_name, fingerprint)
    }
}

/// Consumer name = `{host}-{pid}` per the worker runtime contract.
pub fn default_consumer_id() -> String {
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
    format!("{}-{}", host, std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestQueue;
    impl StreamDef for TestQueue {
        const QUEUE_NAME: &'static str = "replay-jobs";
    }

    #[test]
    fn derives_bit_exact_key_names() {
        let cfg = WorkerConfig::from_stream_def::<TestQueue>();
        assert_eq!(cfg.group_name(), "replay-jobs:group");
        assert_eq!(cfg.retry_key(), "replay-jobs:retry");
        assert_eq!(cfg.failed_key(), "replay-jobs:failed");
        assert_eq!(cfg.unprocessable_key(), "replay-jobs:failed:unprocessable");
        assert_eq!(cfg.done_key("fp1"), "replay-jobs:done:fp1");
    }
}
