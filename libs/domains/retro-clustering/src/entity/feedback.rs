use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use domain_retro_core::{ClusterKey, FeedbackKind, IssueFeedbackEvent};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issue_feedback_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: String,
    pub cluster_key: String,
    pub session_id: Option<String>,
    pub kind: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: serde_json::Value,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for IssueFeedbackEvent {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            cluster_key: ClusterKey(model.cluster_key),
            session_id: model.session_id,
            kind: FeedbackKind::from_str(&model.kind).unwrap_or(FeedbackKind::Invalid),
            note: model.note,
            metadata: model.metadata,
            created_by: model.created_by,
            created_at: model.created_at.into(),
        }
    }
}

impl From<IssueFeedbackEvent> for ActiveModel {
    fn from(event: IssueFeedbackEvent) -> Self {
        ActiveModel {
            id: Set(event.id),
            project_id: Set(event.project_id),
            cluster_key: Set(event.cluster_key.0),
            session_id: Set(event.session_id),
            kind: Set(event.kind.to_string()),
            note: Set(event.note),
            metadata: Set(event.metadata),
            created_by: Set(event.created_by),
            created_at: Set(event.created_at.into()),
        }
    }
}
