//! Traits a domain implements to plug a job type into the worker runtime.

use crate::error::BrokerError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// A job carried on a queue.
///
/// `fingerprint` must be pure (no time, no randomness) and stable for
/// identical logical work so the done-marker can dedupe redeliveries.
pub trait StreamJob: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    fn job_id(&self) -> String;
    fn attempt(&self) -> u32;
    fn with_attempt(&self, attempt: u32) -> Self;
    fn fingerprint(&self) -> String;
}

/// Static configuration for one queue, implemented once per job type.
pub trait StreamDef {
    const QUEUE_NAME: &'static str;
    const MAX_ATTEMPTS: u32 = 5;
    const BASE_RETRY_MS: u64 = 1_000;
    const MAX_RETRY_MS: u64 = 120_000;
    const DEDUPE_WINDOW_SEC: u64 = 300;
    const PROCESSING_STALE_SEC: u64 = 60;
    const READ_BATCH: usize = 5;
    const READ_BLOCK_MS: u64 = 5_000;
    const RETRY_DRAIN_BATCH: usize = 20;
}

/// Domain logic that processes one job at a time.
#[async_trait]
pub trait StreamProcessor<J: StreamJob>: Send + Sync {
    async fn process(&self, job: &J) -> Result<(), BrokerError>;

    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<bool, BrokerError> {
        Ok(true)
    }
}
