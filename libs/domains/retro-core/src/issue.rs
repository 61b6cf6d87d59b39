use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;

/// Opaque, purely-derived identity for a cluster of sessions sharing the same
/// failure shape. Two sessions with the same key are the same issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, TS)]
#[serde(transparent)]
pub struct ClusterKey(pub String);

impl ClusterKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClusterState {
    #[default]
    Open,
    Acknowledged,
    Resolved,
    Muted,
}

/// A promoted issue: a symptom that keeps recurring across distinct sessions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct IssueCluster {
    pub project_id: String,
    #[ts(as = "String")]
    pub cluster_key: ClusterKey,
    pub symptom: String,
    pub session_count: i64,
    pub confidence: f64,
    #[ts(as = "String")]
    pub last_seen_at: DateTime<Utc>,
    pub representative_session_id: String,
    pub state: ClusterState,
    #[ts(as = "Option<String>")]
    pub muted_until: Option<DateTime<Utc>>,
    pub assignee: Option<String>,
    pub note: Option<String>,
}

impl IssueCluster {
    /// `userCount` is a stable alias of `sessionCount`: one report per session.
    pub fn user_count(&self) -> i64 {
        self.session_count
    }

    pub fn is_muted(&self, now: DateTime<Utc>) -> bool {
        match (self.state, self.muted_until) {
            (ClusterState::Muted, Some(until)) => now < until,
            (ClusterState::Muted, None) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeedbackKind {
    FalsePositive,
    TruePositive,
    Invalid,
    Suppressed,
    Unsuppressed,
    Merge,
    Split,
}

/// An operator action against a cluster: triage feedback, muting, merge/split.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct IssueFeedbackEvent {
    #[ts(as = "String")]
    pub id: uuid::Uuid,
    pub project_id: String,
    #[ts(as = "String")]
    pub cluster_key: ClusterKey,
    pub session_id: Option<String>,
    pub kind: FeedbackKind,
    pub note: Option<String>,
    pub metadata: serde_json::Value,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muted_without_expiry_stays_muted() {
        let cluster = IssueCluster {
            project_id: "p".into(),
            cluster_key: ClusterKey("k".into()),
            symptom: "s".into(),
            session_count: 3,
            confidence: 0.8,
            last_seen_at: Utc::now(),
            representative_session_id: "sess".into(),
            state: ClusterState::Muted,
            muted_until: None,
            assignee: None,
            note: None,
        };
        assert!(cluster.is_muted(Utc::now()));
    }

    #[test]
    fn user_count_aliases_session_count() {
        let cluster = IssueCluster {
            project_id: "p".into(),
            cluster_key: ClusterKey("k".into()),
            symptom: "s".into(),
            session_count: 7,
            confidence: 0.5,
            last_seen_at: Utc::now(),
            representative_session_id: "sess".into(),
            state: ClusterState::Open,
            muted_until: None,
            assignee: None,
            note: None,
        };
        assert_eq!(cluster.user_count(), 7);
    }
}
