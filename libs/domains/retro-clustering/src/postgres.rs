use async_trait::async_trait;
use domain_retro_core::{ClusterKey, ClusterState, IssueCluster, IssueFeedbackEvent};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entity::marker::{ErrorMarkerRow, NewErrorMarker};
use crate::entity::{cluster, feedback, marker};
use crate::error::{ClusteringError, ClusteringResult};
use crate::repository::{ClusterRepository, FeedbackRepository, MarkerRepository};

#[derive(Clone)]
pub struct PgClusteringRepository {
    db: DatabaseConnection,
}

impl PgClusteringRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MarkerRepository for PgClusteringRepository {
    async fn record(&self, markers: Vec<NewErrorMarker>) -> ClusteringResult<()> {
        if markers.is_empty() {
            return Ok(());
        }

        let active_models: Vec<marker::ActiveModel> = markers.into_iter().map(Into::into).collect();
        marker::Entity::insert_many(active_models).exec(&self.db).await.map_err(ClusteringError::from)?;
        Ok(())
    }

    async fn list_by_project(&self, project_id: &str) -> ClusteringResult<Vec<ErrorMarkerRow>> {
        let rows = marker::Entity::find()
            .filter(marker::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await
            .map_err(ClusteringError::from)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_cluster(&self, project_id: &str, cluster_key: &ClusterKey) -> ClusteringResult<Vec<ErrorMarkerRow>> {
        let rows = marker::Entity::find()
            .filter(marker::Column::ProjectId.eq(project_id))
            .filter(marker::Column::ClusterKey.eq(cluster_key.as_str()))
            .all(&self.db)
            .await
            .map_err(ClusteringError::from)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn repoint(&self, project_id: &str, session_ids: &[String], to: &ClusterKey) -> ClusteringResult<u64> {
        let result = marker::Entity::update_many()
            .col_expr(marker::Column::ClusterKey, Expr::value(to.as_str()))
            .filter(marker::Column::ProjectId.eq(project_id))
            .filter(marker::Column::SessionId.is_in(session_ids.to_vec()))
            .exec(&self.db)
            .await
            .map_err(ClusteringError::from)?;

        Ok(result.rows_affected)
    }

    async fn repoint_cluster(&self, project_id: &str, from: &ClusterKey, to: &ClusterKey) -> ClusteringResult<u64> {
        let result = marker::Entity::update_many()
            .col_expr(marker::Column::ClusterKey, Expr::value(to.as_str()))
            .filter(marker::Column::ProjectId.eq(project_id))
            .filter(marker::Column::ClusterKey.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(ClusteringError::from)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl ClusterRepository for PgClusteringRepository {
    async fn upsert(&self, issue: IssueCluster) -> ClusteringResult<IssueCluster> {
        let project_id = issue.project_id.clone();
        let cluster_key = issue.cluster_key.clone();
        let active_model: cluster::ActiveModel = issue.into();

        cluster::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([cluster::Column::ProjectId, cluster::Column::ClusterKey])
                    .update_columns([
                        cluster::Column::Symptom,
                        cluster::Column::SessionCount,
                        cluster::Column::Confidence,
                        cluster::Column::LastSeenAt,
                        cluster::Column::RepresentativeSessionId,
                        cluster::Column::State,
                        cluster::Column::MutedUntil,
                        cluster::Column::Assignee,
                        cluster::Column::Note,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(ClusteringError::from)?;

        self.get(&project_id, &cluster_key)
            .await?
            .ok_or_else(|| ClusteringError::Database("issue cluster missing after upsert".to_string()))
    }

    async fn get(&self, project_id: &str, cluster_key: &ClusterKey) -> ClusteringResult<Option<IssueCluster>> {
        let model = cluster::Entity::find_by_id((project_id.to_string(), cluster_key.0.clone()))
            .one(&self.db)
            .await
            .map_err(ClusteringError::from)?;

        Ok(model.map(Into::into))
    }

    async fn list(&self, project_id: &str, state: Option<ClusterState>) -> ClusteringResult<Vec<IssueCluster>> {
        let mut query = cluster::Entity::find().filter(cluster::Column::ProjectId.eq(project_id));

        if let Some(state) = state {
            query = query.filter(cluster::Column::State.eq(state.to_string()));
        }

        let models = query.all(&self.db).await.map_err(ClusteringError::from)?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl FeedbackRepository for PgClusteringRepository {
    async fn append(&self, event: IssueFeedbackEvent) -> ClusteringResult<IssueFeedbackEvent> {
        let active_model: feedback::ActiveModel = event.into();
        let inserted = active_model.insert(&self.db).await.map_err(ClusteringError::from)?;
        Ok(inserted.into())
    }
}
