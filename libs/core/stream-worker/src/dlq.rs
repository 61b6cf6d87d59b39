//! Admin-facing convenience wrapper over the broker's dead-letter lists.
//!
//! The broker owns the actual `DeadLetter`/`Redrive`/`Stats` Redis ops;
//! this module adapts them into the shapes the admin HTTP endpoints want.

use crate::broker::{Broker, FailedEntry, RedriveResult};
use crate::error::BrokerError;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DlqStats {
    pub queue: String,
    pub failed_depth: u64,
    pub retry_depth: u64,
    pub stream_depth: u64,
    pub pending: u64,
}

pub struct DlqManager {
    broker: Broker,
    queue: String,
    group: String,
}

impl DlqManager {
    pub fn new(broker: Broker, queue: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            broker,
            queue: queue.into(),
            group: group.into(),
        }
    }

    pub async fn stats(&self) -> Result<DlqStats, BrokerError> {
        let stats = self.broker.stats(&self.queue, &self.group).await?;
        Ok(DlqStats {
            queue: self.queue.clone(),
            failed_depth: stats.failed_depth,
            retry_depth: stats.retry_depth,
            stream_depth: stats.stream_depth,
            pending: stats.pending,
        })
    }

    pub async fn list(&self, limit: usize, offset: usize) -> Result<Vec<FailedEntry>, BrokerError> {
        self.broker.list_dead_letters(&self.queue, limit, offset).await
    }

    pub async fn redrive(&self, limit: usize) -> Result<RedriveResult, BrokerError> {
        self.broker.redrive(&self.queue, limit).await
    }
}
