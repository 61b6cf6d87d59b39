use async_trait::async_trait;
use domain_retro_core::ReportCard;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::{
    entity,
    error::{AnalysisError, AnalysisResult},
    repository::ReportCardRepository,
};

pub struct PgReportCardRepository {
    db: DatabaseConnection,
}

impl PgReportCardRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportCardRepository for PgReportCardRepository {
    async fn upsert(&self, card: ReportCard) -> AnalysisResult<ReportCard> {
        let project_id = card.project_id.clone();
        let session_id = card.session_id.clone();
        let active_model: entity::ActiveModel = card.into();

        entity::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([entity::Column::ProjectId, entity::Column::SessionId])
                    .update_columns([
                        entity::Column::Status,
                        entity::Column::Symptom,
                        entity::Column::TechnicalRootCause,
                        entity::Column::SuggestedFix,
                        entity::Column::TextSummary,
                        entity::Column::VisualSummary,
                        entity::Column::Confidence,
                        entity::Column::GeneratedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(AnalysisError::from)?;

        self.get(&project_id, &session_id)
            .await?
            .ok_or_else(|| AnalysisError::Database("report card missing after upsert".to_string()))
    }

    async fn get(&self, project_id: &str, session_id: &str) -> AnalysisResult<Option<ReportCard>> {
        let model = entity::Entity::find_by_id((project_id.to_string(), session_id.to_string()))
            .one(&self.db)
            .await
            .map_err(AnalysisError::from)?;

        Ok(model.map(Into::into))
    }
}
