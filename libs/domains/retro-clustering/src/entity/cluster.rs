use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use domain_retro_core::{ClusterKey, ClusterState, IssueCluster};

/// `state` is stored as text for the same reason `ReportCard.status` is:
/// the domain type lives in `retro-core`, which stays free of a sea-orm
/// dependency.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issue_clusters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub cluster_key: String,
    pub symptom: String,
    pub session_count: i64,
    pub confidence: f64,
    pub last_seen_at: DateTimeWithTimeZone,
    pub representative_session_id: String,
    pub state: String,
    pub muted_until: Option<DateTimeWithTimeZone>,
    pub assignee: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for IssueCluster {
    fn from(model: Model) -> Self {
        Self {
            project_id: model.project_id,
            cluster_key: ClusterKey(model.cluster_key),
            symptom: model.symptom,
            session_count: model.session_count,
            confidence: model.confidence,
            last_seen_at: model.last_seen_at.into(),
            representative_session_id: model.representative_session_id,
            state: ClusterState::from_str(&model.state).unwrap_or_default(),
            muted_until: model.muted_until.map(Into::into),
            assignee: model.assignee,
            note: model.note,
        }
    }
}

impl From<IssueCluster> for ActiveModel {
    fn from(cluster: IssueCluster) -> Self {
        ActiveModel {
            project_id: Set(cluster.project_id),
            cluster_key: Set(cluster.cluster_key.0),
            symptom: Set(cluster.symptom),
            session_count: Set(cluster.session_count),
            confidence: Set(cluster.confidence),
            last_seen_at: Set(cluster.last_seen_at.into()),
            representative_session_id: Set(cluster.representative_session_id),
            state: Set(cluster.state.to_string()),
            muted_until: Set(cluster.muted_until.map(Into::into)),
            assignee: Set(cluster.assignee),
            note: Set(cluster.note),
        }
    }
}
