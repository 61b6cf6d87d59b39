use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use domain_retro_core::MarkerKind;

/// One persisted marker row, cluster key pre-computed at ingest time so
/// promotion is a pure `GROUP BY cluster_key` over this table rather than a
/// join against derivation logic.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "error_markers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub project_id: String,
    pub session_id: String,
    pub cluster_key: String,
    pub kind: String,
    pub route: String,
    pub offset_ms: i64,
    pub label: Option<String>,
    pub cluster_hint: Option<String>,
    pub observed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A row ready to insert: cluster key already derived, no database identity yet.
#[derive(Debug, Clone)]
pub struct NewErrorMarker {
    pub project_id: String,
    pub session_id: String,
    pub cluster_key: String,
    pub kind: MarkerKind,
    pub route: String,
    pub offset_ms: i64,
    pub label: Option<String>,
    pub cluster_hint: Option<String>,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

impl From<NewErrorMarker> for ActiveModel {
    fn from(marker: NewErrorMarker) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            project_id: Set(marker.project_id),
            session_id: Set(marker.session_id),
            cluster_key: Set(marker.cluster_key),
            kind: Set(marker.kind.to_string()),
            route: Set(marker.route),
            offset_ms: Set(marker.offset_ms),
            label: Set(marker.label),
            cluster_hint: Set(marker.cluster_hint),
            observed_at: Set(marker.observed_at.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorMarkerRow {
    pub project_id: String,
    pub session_id: String,
    pub cluster_key: String,
    pub kind: MarkerKind,
    pub label: Option<String>,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

impl From<Model> for ErrorMarkerRow {
    fn from(model: Model) -> Self {
        Self {
            project_id: model.project_id,
            session_id: model.session_id,
            cluster_key: model.cluster_key,
            kind: MarkerKind::from_str(&model.kind).unwrap_or(MarkerKind::UiNoEffect),
            label: model.label,
            observed_at: model.observed_at.into(),
        }
    }
}
