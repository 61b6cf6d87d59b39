use async_trait::async_trait;
use domain_retro_core::AnalysisJob;
use std::sync::Arc;
use stream_worker::{BrokerError, ErrorCategory, StreamProcessor};
use tracing::{error, info, warn};

use crate::repository::ReportCardRepository;
use crate::service::AnalysisService;

pub struct AnalysisProcessor<R: ReportCardRepository> {
    service: Arc<AnalysisService<R>>,
    max_attempts: u32,
}

impl<R: ReportCardRepository + 'static> AnalysisProcessor<R> {
    /// `max_attempts` must match the `WorkerConfig` this processor is run
    /// under, so the last-attempt check below agrees with the worker's own
    /// retry-exhaustion decision.
    pub fn new(service: AnalysisService<R>, max_attempts: u32) -> Self {
        Self { service: Arc::new(service), max_attempts }
    }
}

impl<R: ReportCardRepository> Clone for AnalysisProcessor<R> {
    fn clone(&self) -> Self {
        Self { service: Arc::clone(&self.service), max_attempts: self.max_attempts }
    }
}

#[async_trait]
impl<R: ReportCardRepository + 'static> StreamProcessor<AnalysisJob> for AnalysisProcessor<R> {
    async fn process(&self, job: &AnalysisJob) -> Result<(), BrokerError> {
        match self.service.analyze_and_persist(job).await {
            Ok(card) => {
                info!(
                    session_id = %job.session_id,
                    status = %card.status,
                    confidence = card.confidence,
                    "analysis complete"
                );
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
                    warn!(session_id = %job.session_id, error = %broker_err, "terminal analysis failure, recording failed card");
                    if let Err(persist_err) = self.service.persist_failed(job, &broker_err.to_string()).await {
                        error!(session_id = %job.session_id, error = %persist_err, "failed to persist failed report card");
                    }
                }

                Err(broker_err)
            }
        }
    }

    fn name(&self) -> &'static str {
        "AnalysisProcessor"
    }
}
