use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_retro_core::{ClusterKey, ClusterState, FeedbackKind, IssueCluster, MarkerKind, ReportCard};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use crate::alert::{AlertClient, AlertGate, ClusterAlert};
use crate::config::ClusterConfig;
use crate::error::{ClusteringError, ClusteringResult};
use crate::repository::{feedback_event, ClusterRepository, FeedbackRepository, MarkerRepository};

/// Narrow view onto report-card storage so `sessions_for` can filter by
/// report status/confidence without this crate depending on the analysis
/// crate's repository generic directly.
#[async_trait]
pub trait ReportCardLookup: Send + Sync {
    async fn get(&self, project_id: &str, session_id: &str) -> ClusteringResult<Option<ReportCard>>;
}

#[async_trait]
impl<R: domain_retro_analysis::ReportCardRepository> ReportCardLookup for domain_retro_analysis::AnalysisService<R> {
    async fn get(&self, project_id: &str, session_id: &str) -> ClusteringResult<Option<ReportCard>> {
        self.repository_get(project_id, session_id)
            .await
            .map_err(|e| ClusteringError::Database(e.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub limit: Option<usize>,
    pub report_status: Option<String>,
    pub min_confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClusterStat {
    pub kind: MarkerKind,
    pub marker_count: i64,
    pub session_count: i64,
    pub cluster_count: i64,
    pub last_seen_at: Option<DateTime<Utc>>,
}

struct Aggregate {
    session_ids: std::collections::HashSet<String>,
    last_seen_at: DateTime<Utc>,
    symptom: String,
    representative_session_id: String,
}

pub struct ClusteringService<M: MarkerRepository, C: ClusterRepository, F: FeedbackRepository> {
    markers: Arc<M>,
    clusters: Arc<C>,
    feedback: Arc<F>,
    config: ClusterConfig,
    alert_gate: Option<AlertGate>,
    alert_client: AlertClient,
    report_cards: Option<Arc<dyn ReportCardLookup>>,
}

impl<M: MarkerRepository, C: ClusterRepository, F: FeedbackRepository> ClusteringService<M, C, F> {
    pub fn new(
        markers: M,
        clusters: C,
        feedback: F,
        config: ClusterConfig,
        alert_gate: Option<AlertGate>,
        report_cards: Option<Arc<dyn ReportCardLookup>>,
    ) -> Self {
        let alert_client = AlertClient::new(config.alert_webhook_url.clone(), config.alert_timeout_ms);
        Self { markers: Arc::new(markers), clusters: Arc::new(clusters), feedback: Arc::new(feedback), config, alert_gate, alert_client, report_cards }
    }

    /// Groups every `error_markers` row by its pre-computed `cluster_key`,
    /// upserts one `issue_clusters` row per group that reaches `minSessions`,
    /// and fires the alert webhook for groups that clear the confidence gate.
    /// Idempotent: re-running against an unchanged marker table reproduces
    /// the same cluster rows.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn promote(&self, project_id: &str) -> ClusteringResult<Vec<IssueCluster>> {
        let rows = self.markers.list_by_project(project_id).await?;

        let mut groups: HashMap<String, Aggregate> = HashMap::new();
        for row in rows {
            if row.cluster_key.is_empty() {
                continue;
            }

            let entry = groups.entry(row.cluster_key.clone()).or_insert_with(|| Aggregate {
                session_ids: std::collections::HashSet::new(),
                last_seen_at: row.observed_at,
                symptom: row.label.clone().unwrap_or_default(),
                representative_session_id: row.session_id.clone(),
            });

            entry.session_ids.insert(row.session_id.clone());
            if let Some(label) = &row.label {
                if label > &entry.symptom {
                    entry.symptom = label.clone();
                }
            }
            if row.observed_at >= entry.last_seen_at {
                entry.last_seen_at = row.observed_at;
                entry.representative_session_id = row.session_id.clone();
            }
        }

        let mut promoted = Vec::new();
        for (cluster_key, aggregate) in groups {
            let session_count = aggregate.session_ids.len() as i64;
            if session_count < self.config.min_sessions as i64 {
                continue;
            }

            let confidence = (session_count as f64 / (self.config.min_sessions + 1) as f64).min(1.0);
            let existing = self.clusters.get(project_id, &ClusterKey(cluster_key.clone())).await?;

            let cluster = IssueCluster {
                project_id: project_id.to_string(),
                cluster_key: ClusterKey(cluster_key.clone()),
                symptom: aggregate.symptom,
                session_count,
                confidence,
                last_seen_at: aggregate.last_seen_at,
                representative_session_id: aggregate.representative_session_id,
                state: existing.as_ref().map(|c| c.state).unwrap_or_default(),
                muted_until: existing.as_ref().and_then(|c| c.muted_until),
                assignee: existing.as_ref().and_then(|c| c.assignee.clone()),
                note: existing.as_ref().and_then(|c| c.note.clone()),
            };

            let stored = self.clusters.upsert(cluster).await?;
            self.maybe_alert(&stored).await?;
            promoted.push(stored);
        }

        Ok(promoted)
    }

    async fn maybe_alert(&self, cluster: &IssueCluster) -> ClusteringResult<()> {
        if cluster.confidence < self.config.min_cluster_confidence {
            return Ok(());
        }
        if matches!(cluster.state, ClusterState::Muted | ClusterState::Resolved) {
            return Ok(());
        }

        let Some(gate) = &self.alert_gate else {
            return Ok(());
        };

        if !gate.try_acquire(&cluster.project_id, cluster.cluster_key.as_str(), "threshold").await? {
            return Ok(());
        }

        self.alert_client
            .send(ClusterAlert {
                project_id: &cluster.project_id,
                cluster_key: cluster.cluster_key.as_str(),
                symptom: &cluster.symptom,
                session_count: cluster.session_count as u64,
                confidence: cluster.confidence,
                alert_type: "threshold",
            })
            .await
    }

    fn implied_feedback_kind(previous: Option<&IssueCluster>, state: ClusterState) -> FeedbackKind {
        match state {
            ClusterState::Muted => FeedbackKind::Suppressed,
            _ if matches!(previous.map(|c| c.state), Some(ClusterState::Muted)) => FeedbackKind::Unsuppressed,
            ClusterState::Resolved => FeedbackKind::TruePositive,
            ClusterState::Open | ClusterState::Acknowledged => FeedbackKind::TruePositive,
        }
    }

    #[instrument(skip(self), fields(project_id = %project_id, cluster_key = %cluster_key.as_str()))]
    pub async fn set_state(
        &self,
        project_id: &str,
        cluster_key: &ClusterKey,
        state: ClusterState,
        assignee: Option<String>,
        muted_until: Option<DateTime<Utc>>,
        note: Option<String>,
        actor: &str,
    ) -> ClusteringResult<IssueCluster> {
        let existing = self
            .clusters
            .get(project_id, cluster_key)
            .await?
            .ok_or_else(|| ClusteringError::NotFound(format!("no cluster {} in project {project_id}", cluster_key.as_str())))?;

        let kind = Self::implied_feedback_kind(Some(&existing), state);

        let mut updated = existing;
        updated.state = state;
        updated.assignee = assignee.or(updated.assignee);
        updated.muted_until = muted_until.or(updated.muted_until);
        updated.note = note.clone().or(updated.note);

        let stored = self.clusters.upsert(updated).await?;

        self.feedback
            .append(feedback_event(project_id, cluster_key.clone(), None, kind, note, serde_json::json!({}), actor))
            .await?;

        Ok(stored)
    }

    pub async fn feedback(
        &self,
        project_id: &str,
        cluster_key: &ClusterKey,
        kind: FeedbackKind,
        note: Option<String>,
        session_id: Option<String>,
        metadata: serde_json::Value,
        actor: &str,
    ) -> ClusteringResult<()> {
        self.feedback
            .append(feedback_event(project_id, cluster_key.clone(), session_id, kind, note, metadata, actor))
            .await?;
        Ok(())
    }

    /// Re-points every marker currently under each source cluster to `target`,
    /// records one `merge` feedback event per source, then re-runs promotion
    /// so the target's aggregates reflect the merged rows immediately.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn merge(
        &self,
        project_id: &str,
        target: &ClusterKey,
        sources: &[ClusterKey],
        note: Option<String>,
        actor: &str,
    ) -> ClusteringResult<Vec<IssueCluster>> {
        for source in sources {
            self.markers.repoint_cluster(project_id, source, target).await?;
            self.feedback
                .append(feedback_event(
                    project_id,
                    source.clone(),
                    None,
                    FeedbackKind::Merge,
                    note.clone(),
                    serde_json::json!({ "target": target.as_str() }),
                    actor,
                ))
                .await?;
        }

        self.promote(project_id).await
    }

    /// Moves markers belonging to `session_ids` to `new_key` and records one
    /// `split` feedback event against the originating cluster.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn split(
        &self,
        project_id: &str,
        cluster_key: &ClusterKey,
        new_key: &ClusterKey,
        session_ids: &[String],
        note: Option<String>,
        actor: &str,
    ) -> ClusteringResult<Vec<IssueCluster>> {
        self.markers.repoint(project_id, session_ids, new_key).await?;
        self.feedback
            .append(feedback_event(
                project_id,
                cluster_key.clone(),
                None,
                FeedbackKind::Split,
                note,
                serde_json::json!({ "new_key": new_key.as_str(), "session_ids": session_ids }),
                actor,
            ))
            .await?;

        self.promote(project_id).await
    }

    pub async fn list(&self, project_id: &str, state: Option<ClusterState>) -> ClusteringResult<Vec<IssueCluster>> {
        self.clusters.list(project_id, state).await
    }

    pub async fn get(&self, project_id: &str, cluster_key: &ClusterKey) -> ClusteringResult<Option<IssueCluster>> {
        self.clusters.get(project_id, cluster_key).await
    }

    pub async fn sessions_for(&self, project_id: &str, cluster_key: &ClusterKey, filter: SessionFilter) -> ClusteringResult<Vec<ReportCard>> {
        let rows = self.markers.list_by_cluster(project_id, cluster_key).await?;
        let mut seen = std::collections::HashSet::new();
        let mut session_ids = Vec::new();
        for row in rows {
            if seen.insert(row.session_id.clone()) {
                session_ids.push(row.session_id);
            }
        }

        let mut cards = Vec::new();
        for session_id in session_ids {
            let card = match &self.report_cards {
                Some(lookup) => lookup.get(project_id, &session_id).await?,
                None => None,
            };

            let Some(card) = card else {
                continue;
            };

            if let Some(status) = &filter.report_status {
                if card.status.to_string() != *status {
                    continue;
                }
            }
            if let Some(min_confidence) = filter.min_confidence {
                if card.confidence < min_confidence {
                    continue;
                }
            }

            cards.push(card);
            if filter.limit.is_some_and(|limit| cards.len() >= limit) {
                break;
            }
        }

        Ok(cards)
    }

    pub async fn stats(&self, project_id: &str, hours: i64) -> ClusteringResult<Vec<ClusterStat>> {
        let cutoff = Utc::now() - chrono::Duration::hours(hours);
        let rows = self.markers.list_by_project(project_id).await?;

        struct Acc {
            marker_count: i64,
            sessions: std::collections::HashSet<String>,
            clusters: std::collections::HashSet<String>,
            last_seen_at: Option<DateTime<Utc>>,
        }

        let mut by_kind: HashMap<MarkerKind, Acc> = HashMap::new();
        for row in rows {
            if row.observed_at < cutoff {
                continue;
            }

            let acc = by_kind.entry(row.kind).or_insert_with(|| Acc {
                marker_count: 0,
                sessions: std::collections::HashSet::new(),
                clusters: std::collections::HashSet::new(),
                last_seen_at: None,
            });

            acc.marker_count += 1;
            acc.sessions.insert(row.session_id);
            if !row.cluster_key.is_empty() {
                acc.clusters.insert(row.cluster_key);
            }
            acc.last_seen_at = Some(acc.last_seen_at.map_or(row.observed_at, |prev| prev.max(row.observed_at)));
        }

        Ok(by_kind
            .into_iter()
            .map(|(kind, acc)| ClusterStat {
                kind,
                marker_count: acc.marker_count,
                session_count: acc.sessions.len() as i64,
                cluster_count: acc.clusters.len() as i64,
                last_seen_at: acc.last_seen_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_key::derive_cluster_key;
    use crate::entity::marker::ErrorMarkerRow;
    use crate::repository::{MockClusterRepository, MockFeedbackRepository, MockMarkerRepository};

    fn config(min_sessions: u64) -> ClusterConfig {
        ClusterConfig {
            min_sessions,
            min_cluster_confidence: 0.0,
            cooldown_minutes: 60,
            alert_webhook_url: None,
            alert_timeout_ms: 5000,
        }
    }

    fn row(session_id: &str, cluster_key: &str, label: &str) -> ErrorMarkerRow {
        ErrorMarkerRow {
            project_id: "proj".to_string(),
            session_id: session_id.to_string(),
            cluster_key: cluster_key.to_string(),
            kind: MarkerKind::UiNoEffect,
            label: Some(label.to_string()),
            observed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn cluster_promotes_once_threshold_reached() {
        let key = derive_cluster_key("/checkout", MarkerKind::UiNoEffect, Some("checkout-null-user"), None);
        let key_string = key.as_str().to_string();

        let mut markers = MockMarkerRepository::new();
        let rows = vec![row("session-a", &key_string, "checkout-null-user"), row("session-b", &key_string, "checkout-null-user")];
        markers.expect_list_by_project().returning(move |_| Ok(rows.clone()));

        let mut clusters = MockClusterRepository::new();
        clusters.expect_get().returning(|_, _| Ok(None));
        clusters.expect_upsert().returning(|cluster| Ok(cluster));

        let feedback = MockFeedbackRepository::new();

        let service = ClusteringService::new(markers, clusters, feedback, config(2), None, None);
        let promoted = service.promote("proj").await.unwrap();

        assert_eq!(promoted.len(), 1);
        let cluster = &promoted[0];
        assert_eq!(cluster.session_count, 2);
        assert!((cluster.confidence - (2.0 / 3.0)).abs() < 1e-9);
        assert_eq!(cluster.state, ClusterState::Open);
    }

    #[tokio::test]
    async fn group_below_threshold_is_not_promoted() {
        let key = derive_cluster_key("/checkout", MarkerKind::UiNoEffect, Some("checkout-null-user"), None);
        let key_string = key.as_str().to_string();

        let mut markers = MockMarkerRepository::new();
        let rows = vec![row("session-a", &key_string, "checkout-null-user")];
        markers.expect_list_by_project().returning(move |_| Ok(rows.clone()));

        let mut clusters = MockClusterRepository::new();
        clusters.expect_get().times(0);
        clusters.expect_upsert().times(0);

        let feedback = MockFeedbackRepository::new();

        let service = ClusteringService::new(markers, clusters, feedback, config(2), None, None);
        let promoted = service.promote("proj").await.unwrap();
        assert!(promoted.is_empty());
    }

    #[tokio::test]
    async fn re_promotion_preserves_operator_set_state() {
        let key = derive_cluster_key("/checkout", MarkerKind::UiNoEffect, Some("checkout-null-user"), None);
        let key_string = key.as_str().to_string();

        let mut markers = MockMarkerRepository::new();
        let rows = vec![row("session-a", &key_string, "checkout-null-user"), row("session-b", &key_string, "checkout-null-user")];
        markers.expect_list_by_project().returning(move |_| Ok(rows.clone()));

        let existing = IssueCluster {
            project_id: "proj".to_string(),
            cluster_key: key.clone(),
            symptom: "checkout-null-user".to_string(),
            session_count: 2,
            confidence: 0.667,
            last_seen_at: Utc::now(),
            representative_session_id: "session-a".to_string(),
            state: ClusterState::Acknowledged,
            muted_until: None,
            assignee: Some("alice".to_string()),
            note: None,
        };

        let mut clusters = MockClusterRepository::new();
        clusters.expect_get().returning(move |_, _| Ok(Some(existing.clone())));
        clusters.expect_upsert().returning(|cluster| Ok(cluster));

        let feedback = MockFeedbackRepository::new();

        let service = ClusteringService::new(markers, clusters, feedback, config(2), None, None);
        let promoted = service.promote("proj").await.unwrap();

        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].state, ClusterState::Acknowledged);
        assert_eq!(promoted[0].assignee.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn set_state_records_implied_feedback_kind() {
        let key = ClusterKey("k".to_string());
        let existing = IssueCluster {
            project_id: "proj".to_string(),
            cluster_key: key.clone(),
            symptom: "s".to_string(),
            session_count: 2,
            confidence: 0.8,
            last_seen_at: Utc::now(),
            representative_session_id: "session-a".to_string(),
            state: ClusterState::Open,
            muted_until: None,
            assignee: None,
            note: None,
        };

        let markers = MockMarkerRepository::new();
        let mut clusters = MockClusterRepository::new();
        clusters.expect_get().returning(move |_, _| Ok(Some(existing.clone())));
        clusters.expect_upsert().returning(|cluster| Ok(cluster));

        let mut feedback = MockFeedbackRepository::new();
        feedback.expect_append().withf(|event| event.kind == FeedbackKind::Suppressed).returning(|event| Ok(event));

        let service = ClusteringService::new(markers, clusters, feedback, config(2), None, None);
        let updated = service
            .set_state("proj", &key, ClusterState::Muted, None, None, None, "operator")
            .await
            .unwrap();

        assert_eq!(updated.state, ClusterState::Muted);
    }
}
