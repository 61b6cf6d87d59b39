use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportCards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ReportCards::ProjectId).string().not_null().primary_key())
                    .col(ColumnDef::new(ReportCards::SessionId).string().not_null().primary_key())
                    .col(ColumnDef::new(ReportCards::Status).string_len(32).not_null())
                    .col(string_null(ReportCards::Symptom))
                    .col(text_null(ReportCards::TechnicalRootCause))
                    .col(text_null(ReportCards::SuggestedFix))
                    .col(text_null(ReportCards::TextSummary))
                    .col(text_null(ReportCards::VisualSummary))
                    .col(double(ReportCards::Confidence).not_null())
                    .col(timestamp_with_time_zone(ReportCards::GeneratedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_cards_project_id")
                    .table(ReportCards::Table)
                    .col(ReportCards::ProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ReportCards::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ReportCards {
    Table,
    ProjectId,
    SessionId,
    Status,
    Symptom,
    TechnicalRootCause,
    SuggestedFix,
    TextSummary,
    VisualSummary,
    Confidence,
    GeneratedAt,
}
