use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use domain_retro_core::{ReportCard, ReportCardStatus};

/// Report cards are keyed by (project_id, session_id); `status` is stored as
/// text rather than a Postgres enum since the domain type lives in a crate
/// that stays free of a sea-orm dependency.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    pub status: String,
    pub symptom: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub technical_root_cause: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub suggested_fix: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_summary: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub visual_summary: Option<String>,
    pub confidence: f64,
    pub generated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ReportCard {
    fn from(model: Model) -> Self {
        Self {
            project_id: model.project_id,
            session_id: model.session_id,
            status: ReportCardStatus::from_str(&model.status).unwrap_or_default(),
            symptom: model.symptom,
            technical_root_cause: model.technical_root_cause,
            suggested_fix: model.suggested_fix,
            text_summary: model.text_summary,
            visual_summary: model.visual_summary,
            confidence: model.confidence,
            generated_at: model.generated_at.into(),
        }
    }
}

impl From<ReportCard> for ActiveModel {
    fn from(card: ReportCard) -> Self {
        ActiveModel {
            project_id: Set(card.project_id),
            session_id: Set(card.session_id),
            status: Set(card.status.to_string()),
            symptom: Set(card.symptom),
            technical_root_cause: Set(card.technical_root_cause),
            suggested_fix: Set(card.suggested_fix),
            text_summary: Set(card.text_summary),
            visual_summary: Set(card.visual_summary),
            confidence: Set(card.confidence),
            generated_at: Set(card.generated_at.into()),
        }
    }
}
