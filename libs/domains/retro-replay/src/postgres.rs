use async_trait::async_trait;
use domain_retro_core::{Artifact, ArtifactType};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::{
    entity,
    error::{ReplayError, ReplayResult},
    repository::ArtifactRepository,
};

pub struct PgArtifactRepository {
    db: DatabaseConnection,
}

impl PgArtifactRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArtifactRepository for PgArtifactRepository {
    async fn upsert(&self, artifact: Artifact) -> ReplayResult<Artifact> {
        let project_id = artifact.project_id.clone();
        let session_id = artifact.session_id.clone();
        let artifact_type = artifact.artifact_type;
        let active_model: entity::ActiveModel = artifact.into();

        entity::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([entity::Column::ProjectId, entity::Column::SessionId, entity::Column::ArtifactType])
                    .update_columns([
                        entity::Column::ArtifactKey,
                        entity::Column::Status,
                        entity::Column::TriggerKind,
                        entity::Column::Windows,
                        entity::Column::GeneratedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(ReplayError::from)?;

        self.get(&project_id, &session_id, artifact_type)
            .await?
            .ok_or_else(|| ReplayError::Database("artifact missing after upsert".to_string()))
    }

    async fn get(
        &self,
        project_id: &str,
        session_id: &str,
        artifact_type: ArtifactType,
    ) -> ReplayResult<Option<Artifact>> {
        let model = entity::Entity::find_by_id((
            project_id.to_string(),
            session_id.to_string(),
            artifact_type.to_string(),
        ))
        .one(&self.db)
        .await
        .map_err(ReplayError::from)?;

        Ok(model.map(Into::into))
    }
}
