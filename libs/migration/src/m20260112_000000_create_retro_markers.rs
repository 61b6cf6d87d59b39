use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ErrorMarkers::Table)
                    .if_not_exists()
                    .col(pk_uuid(ErrorMarkers::Id))
                    .col(string(ErrorMarkers::ProjectId).not_null())
                    .col(string(ErrorMarkers::SessionId).not_null())
                    .col(string(ErrorMarkers::ClusterKey).not_null())
                    .col(ColumnDef::new(ErrorMarkers::Kind).string_len(32).not_null())
                    .col(string(ErrorMarkers::Route).not_null())
                    .col(ColumnDef::new(ErrorMarkers::OffsetMs).big_integer().not_null())
                    .col(string_null(ErrorMarkers::Label))
                    .col(string_null(ErrorMarkers::ClusterHint))
                    .col(timestamp_with_time_zone(ErrorMarkers::ObservedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_error_markers_project_id")
                    .table(ErrorMarkers::Table)
                    .col(ErrorMarkers::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_error_markers_project_cluster")
                    .table(ErrorMarkers::Table)
                    .col(ErrorMarkers::ProjectId)
                    .col(ErrorMarkers::ClusterKey)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_error_markers_session_id")
                    .table(ErrorMarkers::Table)
                    .col(ErrorMarkers::SessionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ErrorMarkers::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ErrorMarkers {
    Table,
    Id,
    ProjectId,
    SessionId,
    ClusterKey,
    Kind,
    Route,
    OffsetMs,
    Label,
    ClusterHint,
    ObservedAt,
}
