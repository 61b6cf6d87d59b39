use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Artifacts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Artifacts::ProjectId).string().not_null().primary_key())
                    .col(ColumnDef::new(Artifacts::SessionId).string().not_null().primary_key())
                    .col(ColumnDef::new(Artifacts::ArtifactType).string().not_null().primary_key())
                    .col(string(Artifacts::ArtifactKey).not_null())
                    .col(ColumnDef::new(Artifacts::Status).string_len(32).not_null())
                    .col(ColumnDef::new(Artifacts::TriggerKind).string_len(32).not_null())
                    .col(json_binary(Artifacts::Windows).not_null().default("[]"))
                    .col(timestamp_with_time_zone(Artifacts::GeneratedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_artifacts_project_session")
                    .table(Artifacts::Table)
                    .col(Artifacts::ProjectId)
                    .col(Artifacts::SessionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Artifacts::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Artifacts {
    Table,
    ProjectId,
    SessionId,
    ArtifactType,
    ArtifactKey,
    Status,
    TriggerKind,
    Windows,
    GeneratedAt,
}
