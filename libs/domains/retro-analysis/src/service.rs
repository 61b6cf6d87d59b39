use chrono::Utc;
use domain_retro_core::{AnalysisJob, ObjectStore, ReportCard, ReportCardStatus};
use std::sync::Arc;
use tracing::instrument;

use crate::config::{AnalysisConfig, AnalyzerProvider};
use crate::error::{AnalysisError, AnalysisResult};
use crate::providers::{log_fallback_to_heuristic, merge_remote_wins_if_nonempty, ConfidenceProvider, HeuristicProvider, ProviderOutput, RemoteTextProvider};
use crate::repository::ReportCardRepository;

pub struct AnalysisService<R: ReportCardRepository> {
    repository: Arc<R>,
    config: AnalysisConfig,
    heuristic: HeuristicProvider,
    remote: Option<RemoteTextProvider>,
}

impl<R: ReportCardRepository> AnalysisService<R> {
    pub fn new(repository: R, config: AnalysisConfig, object_store: Arc<dyn ObjectStore>) -> Self {
        let remote = match (&config.provider, &config.remote_text_url) {
            (AnalyzerProvider::RemoteText, Some(url)) => Some(RemoteTextProvider::new(
                url.clone(),
                config.remote_text_timeout_ms,
                Arc::clone(&object_store),
            )),
            _ => None,
        };

        Self { repository: Arc::new(repository), config, heuristic: HeuristicProvider::new(object_store), remote }
    }

    async fn resolve_confidence(&self, job: &AnalysisJob) -> AnalysisResult<ProviderOutput> {
        let heuristic_output = self.heuristic.analyze(job).await?;

        let Some(remote) = &self.remote else {
            return Ok(heuristic_output);
        };

        match remote.analyze(job).await {
            Ok(remote_output) => Ok(merge_remote_wins_if_nonempty(heuristic_output, remote_output)),
            Err(AnalysisError::Timeout(ref e)) => {
                log_fallback_to_heuristic(job, &AnalysisError::Timeout(e.clone()));
                Ok(heuristic_output)
            }
            Err(other) => Err(other),
        }
    }

    /// Confidence only ever gates into `pending` (awaiting visual
    /// confirmation) or `discarded` here — `ready` is set by the replay/visual
    /// stage once it has confirmed the card, never by text analysis alone.
    fn gate(&self, confidence: f64) -> ReportCardStatus {
        if confidence >= self.config.min_accept_confidence {
            ReportCardStatus::Pending
        } else if self.config.discard_uncertain {
            ReportCardStatus::Discarded
        } else {
            ReportCardStatus::Pending
        }
    }

    #[instrument(skip(self, job), fields(project_id = %job.project_id, session_id = %job.session_id))]
    pub async fn analyze_and_persist(&self, job: &AnalysisJob) -> AnalysisResult<ReportCard> {
        let output = self.resolve_confidence(job).await?;
        let status = self.gate(output.confidence);

        let card = ReportCard {
            project_id: job.project_id.clone(),
            session_id: job.session_id.clone(),
            status,
            symptom: Some(output.symptom),
            technical_root_cause: output.technical_root_cause,
            suggested_fix: output.suggested_fix,
            text_summary: output.text_summary,
            visual_summary: None,
            confidence: output.confidence,
            generated_at: Utc::now(),
        };

        self.repository.upsert(card).await
    }

    pub async fn repository_upsert(&self, card: ReportCard) -> AnalysisResult<ReportCard> {
        self.repository.upsert(card).await
    }

    pub async fn repository_get(&self, project_id: &str, session_id: &str) -> AnalysisResult<Option<ReportCard>> {
        self.repository.get(project_id, session_id).await
    }

    /// Persists a terminal failure for a session whose analysis cannot be
    /// retried into something better (a schema violation from the upstream
    /// provider, for example).
    pub async fn persist_failed(&self, job: &AnalysisJob, reason: &str) -> AnalysisResult<ReportCard> {
        let truncated: String = reason.chars().take(600).collect();

        let card = ReportCard {
            project_id: job.project_id.clone(),
            session_id: job.session_id.clone(),
            status: ReportCardStatus::Failed,
            symptom: None,
            technical_root_cause: Some(truncated),
            suggested_fix: None,
            text_summary: None,
            visual_summary: None,
            confidence: 0.15,
            generated_at: Utc::now(),
        };

        self.repository.upsert(card).await
    }
}
