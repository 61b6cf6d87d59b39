//! Where a finished (or failed) report card goes once the replay/visual
//! stage is done with it.
//!
//! The most natural shape has the replay worker call back into the analysis
//! worker over HTTP, the way the dispatcher calls into either worker today.
//! But that means an analysis-only deployment (no rendering, no visual
//! model) still has to stand up an HTTP listener on the replay side, and a
//! single-process test or demo deployment pays a network hop to talk to
//! itself. `ReportSink` makes that callback pluggable: `HTTPOrchestratorSink`
//! for the real multi-process deployment, `InProcessSink` for anything
//! running both stages in one process.

use async_trait::async_trait;
use domain_retro_core::ReportCard;
use std::sync::Arc;

use crate::error::{ReplayError, ReplayResult};

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// The card the text-analysis stage already produced for this session, if any.
    /// The replay stage merges its render/visual findings into this rather than
    /// overwriting the symptom/root-cause/fix the analysis stage already wrote.
    async fn fetch_card(&self, project_id: &str, session_id: &str) -> ReplayResult<Option<ReportCard>>;

    async fn report(&self, card: ReportCard) -> ReplayResult<()>;
}

/// Posts the finished card to the orchestrator's internal callback endpoint.
pub struct HTTPOrchestratorSink {
    client: reqwest::Client,
    base_url: String,
    internal_api_key: String,
}

impl HTTPOrchestratorSink {
    pub fn new(orchestrator_url: impl Into<String>, internal_api_key: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: orchestrator_url.into(), internal_api_key: internal_api_key.into() }
    }
}

#[async_trait]
impl ReportSink for HTTPOrchestratorSink {
    async fn fetch_card(&self, project_id: &str, session_id: &str) -> ReplayResult<Option<ReportCard>> {
        let url = format!("{}/v1/internal/analysis-reports/{project_id}/{session_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("X-Retrospec-Internal", &self.internal_api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReplayError::Timeout(e.to_string())
                } else {
                    ReplayError::Provider(e.to_string())
                }
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ReplayError::Provider(format!("orchestrator card lookup returned {}", response.status())));
        }

        let card = response.json().await.map_err(|e| ReplayError::SchemaViolation(e.to_string()))?;
        Ok(Some(card))
    }

    async fn report(&self, card: ReportCard) -> ReplayResult<()> {
        let url = format!("{}/v1/internal/replay-results", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("X-Retrospec-Internal", &self.internal_api_key)
            .json(&card)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReplayError::Timeout(e.to_string())
                } else {
                    ReplayError::Provider(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ReplayError::Provider(format!("orchestrator callback returned {}", response.status())));
        }

        Ok(())
    }
}

/// Upserts the card directly through an in-process analysis repository,
/// skipping the network hop entirely.
pub struct InProcessSink<R: domain_retro_analysis::ReportCardRepository> {
    service: Arc<domain_retro_analysis::AnalysisService<R>>,
}

impl<R: domain_retro_analysis::ReportCardRepository> InProcessSink<R> {
    pub fn new(service: Arc<domain_retro_analysis::AnalysisService<R>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<R: domain_retro_analysis::ReportCardRepository + 'static> ReportSink for InProcessSink<R> {
    async fn fetch_card(&self, project_id: &str, session_id: &str) -> ReplayResult<Option<ReportCard>> {
        self.service.repository_get(project_id, session_id).await.map_err(|e| ReplayError::Database(e.to_string()))
    }

    async fn report(&self, card: ReportCard) -> ReplayResult<()> {
        self.service
            .repository_upsert(card)
            .await
            .map_err(|e| ReplayError::Database(e.to_string()))?;
        Ok(())
    }
}
