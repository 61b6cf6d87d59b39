use async_trait::async_trait;
use domain_retro_core::ReplayJob;
use std::sync::Arc;
use stream_worker::{BrokerError, ErrorCategory, StreamProcessor};
use tracing::{error, info, warn};

use crate::repository::ArtifactRepository;
use crate::service::ReplayService;

pub struct ReplayProcessor<A: ArtifactRepository> {
    service: Arc<ReplayService<A>>,
    max_attempts: u32,
}

impl<A: ArtifactRepository + 'static> ReplayProcessor<A> {
    /// `max_attempts` must match the `WorkerConfig` this processor is run
    /// under, so the last-attempt check below agrees with the worker's own
    /// retry-exhaustion decision.
    pub fn new(service: ReplayService<A>, max_attempts: u32) -> Self {
        Self { service: Arc::new(service), max_attempts }
    }
}

impl<A: ArtifactRepository> Clone for ReplayProcessor<A> {
    fn clone(&self) -> Self {
        Self { service: Arc::clone(&self.service), max_attempts: self.max_attempts }
    }
}

#[async_trait]
impl<A: ArtifactRepository + 'static> StreamProcessor<ReplayJob> for ReplayProcessor<A> {
    async fn process(&self, job: &ReplayJob) -> Result<(), BrokerError> {
        match self.service.process(job).await {
            Ok(()) => {
                info!(session_id = %job.session_id, "replay job complete");
                Ok(())
            }
            Err(err) => {
                let broker_err: BrokerError = err.into();
                let category = broker_err.category();

                // A permanent error never gets retried by the worker, so this
                // is terminal right now. A transient error only becomes
                // terminal once this was the job's last allowed attempt — the
                // worker makes that same call independently when deciding
                // whether to schedule a retry or dead-letter, so the two must
                // agree: a user-visible `failed` card and a dead-letter entry
                // both need to exist for every terminal failure, not just one.
                let is_terminal =
                    category == ErrorCategory::Permanent || job.attempt + 1 >= self.max_attempts;

                if is_terminal {
                    error!(session_id = %job.session_id, error = %broker_err, "terminal replay failure, recording failed card");
                    if let Err(persist_err) = self.service.persist_failed(job, &broker_err.to_string()).await {
                        error!(session_id = %job.session_id, error = %persist_err, "failed to persist failed report card");
                    }
                } else {
                    warn!(session_id = %job.session_id, error = %broker_err, "replay job failed, will retry");
                }

                Err(broker_err)
            }
        }
    }

    fn name(&self) -> &'static str {
        "ReplayProcessor"
    }
}
