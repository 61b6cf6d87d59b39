use async_trait::async_trait;
use domain_retro_core::{Artifact, ArtifactType};

use crate::error::ReplayResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn upsert(&self, artifact: Artifact) -> ReplayResult<Artifact>;

    async fn get(
        &self,
        project_id: &str,
        session_id: &str,
        artifact_type: ArtifactType,
    ) -> ReplayResult<Option<Artifact>>;
}
