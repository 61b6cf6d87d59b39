use async_trait::async_trait;
use domain_retro_core::{ClusterKey, ClusterState, FeedbackKind, IssueCluster, IssueFeedbackEvent};

use crate::entity::marker::{ErrorMarkerRow, NewErrorMarker};
use crate::error::ClusteringResult;

/// Persists and re-points raw marker rows. Split from [`ClusterRepository`]
/// because dispatch only ever needs `record`, never the cluster-table side.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarkerRepository: Send + Sync {
    async fn record(&self, markers: Vec<NewErrorMarker>) -> ClusteringResult<()>;

    async fn list_by_project(&self, project_id: &str) -> ClusteringResult<Vec<ErrorMarkerRow>>;

    async fn list_by_cluster(&self, project_id: &str, cluster_key: &ClusterKey) -> ClusteringResult<Vec<ErrorMarkerRow>>;

    /// Re-points every marker in `from` sessions under `to` — used by merge/split.
    async fn repoint(&self, project_id: &str, session_ids: &[String], to: &ClusterKey) -> ClusteringResult<u64>;

    /// Re-points every marker currently under `from` to `to` — used by merge.
    async fn repoint_cluster(&self, project_id: &str, from: &ClusterKey, to: &ClusterKey) -> ClusteringResult<u64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterRepository: Send + Sync {
    async fn upsert(&self, cluster: IssueCluster) -> ClusteringResult<IssueCluster>;

    async fn get(&self, project_id: &str, cluster_key: &ClusterKey) -> ClusteringResult<Option<IssueCluster>>;

    async fn list(&self, project_id: &str, state: Option<ClusterState>) -> ClusteringResult<Vec<IssueCluster>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn append(&self, event: IssueFeedbackEvent) -> ClusteringResult<IssueFeedbackEvent>;
}

pub fn feedback_event(
    project_id: impl Into<String>,
    cluster_key: ClusterKey,
    session_id: Option<String>,
    kind: FeedbackKind,
    note: Option<String>,
    metadata: serde_json::Value,
    created_by: impl Into<String>,
) -> IssueFeedbackEvent {
    IssueFeedbackEvent {
        id: uuid::Uuid::now_v7(),
        project_id: project_id.into(),
        cluster_key,
        session_id,
        kind,
        note,
        metadata,
        created_by: created_by.into(),
        created_at: chrono::Utc::now(),
    }
}
