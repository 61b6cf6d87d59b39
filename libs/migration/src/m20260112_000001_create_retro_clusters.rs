use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IssueClusters::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IssueClusters::ProjectId).string().not_null().primary_key())
                    .col(ColumnDef::new(IssueClusters::ClusterKey).string().not_null().primary_key())
                    .col(string(IssueClusters::Symptom).not_null())
                    .col(ColumnDef::new(IssueClusters::SessionCount).big_integer().not_null())
                    .col(double(IssueClusters::Confidence).not_null())
                    .col(timestamp_with_time_zone(IssueClusters::LastSeenAt))
                    .col(string(IssueClusters::RepresentativeSessionId).not_null())
                    .col(ColumnDef::new(IssueClusters::State).string_len(32).not_null().default("open"))
                    .col(timestamp_with_time_zone_null(IssueClusters::MutedUntil))
                    .col(string_null(IssueClusters::Assignee))
                    .col(text_null(IssueClusters::Note))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issue_clusters_project_state")
                    .table(IssueClusters::Table)
                    .col(IssueClusters::ProjectId)
                    .col(IssueClusters::State)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IssueFeedbackEvents::Table)
                    .if_not_exists()
                    .col(pk_uuid(IssueFeedbackEvents::Id))
                    .col(string(IssueFeedbackEvents::ProjectId).not_null())
                    .col(string(IssueFeedbackEvents::ClusterKey).not_null())
                    .col(string_null(IssueFeedbackEvents::SessionId))
                    .col(ColumnDef::new(IssueFeedbackEvents::Kind).string_len(32).not_null())
                    .col(text_null(IssueFeedbackEvents::Note))
                    .col(json_binary(IssueFeedbackEvents::Metadata).not_null().default("{}"))
                    .col(string(IssueFeedbackEvents::CreatedBy).not_null())
                    .col(
                        timestamp_with_time_zone(IssueFeedbackEvents::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issue_feedback_events_project_cluster")
                    .table(IssueFeedbackEvents::Table)
                    .col(IssueFeedbackEvents::ProjectId)
                    .col(IssueFeedbackEvents::ClusterKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(IssueFeedbackEvents::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(IssueClusters::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum IssueClusters {
    Table,
    ProjectId,
    ClusterKey,
    Symptom,
    SessionCount,
    Confidence,
    LastSeenAt,
    RepresentativeSessionId,
    State,
    MutedUntil,
    Assignee,
    Note,
}

#[derive(DeriveIden)]
enum IssueFeedbackEvents {
    Table,
    Id,
    ProjectId,
    ClusterKey,
    SessionId,
    Kind,
    Note,
    Metadata,
    CreatedBy,
    CreatedAt,
}
