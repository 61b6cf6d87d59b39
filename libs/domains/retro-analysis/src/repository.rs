use async_trait::async_trait;
use domain_retro_core::ReportCard;

use crate::error::AnalysisResult;

/// Persistence for report cards, keyed by (project_id, session_id).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportCardRepository: Send + Sync {
    async fn upsert(&self, card: ReportCard) -> AnalysisResult<ReportCard>;

    async fn get(&self, project_id: &str, session_id: &str) -> AnalysisResult<Option<ReportCard>>;
}
