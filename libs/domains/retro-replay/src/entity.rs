use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use domain_retro_core::{Artifact, ArtifactStatus, ArtifactType, MarkerKind, MarkerWindow};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artifacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub artifact_type: String,
    pub artifact_key: String,
    pub status: String,
    pub trigger_kind: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub windows: serde_json::Value,
    pub generated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Artifact {
    fn from(model: Model) -> Self {
        let windows: Vec<MarkerWindow> = serde_json::from_value(model.windows).unwrap_or_default();

        Self {
            project_id: model.project_id,
            session_id: model.session_id,
            artifact_type: ArtifactType::from_str(&model.artifact_type).unwrap_or(ArtifactType::AnalysisJson),
            artifact_key: model.artifact_key,
            status: ArtifactStatus::from_str(&model.status).unwrap_or_default(),
            trigger_kind: MarkerKind::from_str(&model.trigger_kind).unwrap_or(MarkerKind::UiNoEffect),
            windows,
            generated_at: model.generated_at.into(),
        }
    }
}

impl From<Artifact> for ActiveModel {
    fn from(artifact: Artifact) -> Self {
        ActiveModel {
            project_id: Set(artifact.project_id),
            session_id: Set(artifact.session_id),
            artifact_type: Set(artifact.artifact_type.to_string()),
            artifact_key: Set(artifact.artifact_key),
            status: Set(artifact.status.to_string()),
            trigger_kind: Set(artifact.trigger_kind.to_string()),
            windows: Set(serde_json::to_value(artifact.windows).unwrap_or(serde_json::Value::Array(vec![]))),
            generated_at: Set(artifact.generated_at.into()),
        }
    }
}
