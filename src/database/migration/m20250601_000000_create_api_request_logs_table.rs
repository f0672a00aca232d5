use super::ApiRequestLogs;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No-op against the API server's database, where the table already exists
        manager
            .create_table(
                Table::create()
                    .table(ApiRequestLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiRequestLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApiRequestLogs::UserId).string().not_null())
                    .col(ColumnDef::new(ApiRequestLogs::Prompt).text().not_null())
                    .col(ColumnDef::new(ApiRequestLogs::Service).string().not_null())
                    .col(
                        ColumnDef::new(ApiRequestLogs::Status)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(ApiRequestLogs::ResponseTimeMs).double().null())
                    .col(
                        ColumnDef::new(ApiRequestLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Window reads filter on created_at
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_api_request_logs_created_at")
                    .table(ApiRequestLogs::Table)
                    .col(ApiRequestLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_api_request_logs_service")
                    .table(ApiRequestLogs::Table)
                    .col(ApiRequestLogs::Service)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    /// The request log belongs to the API server; rolling back never drops it
    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}
