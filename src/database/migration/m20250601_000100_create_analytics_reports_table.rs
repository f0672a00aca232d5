use super::AnalyticsReports;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::WindowStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::WindowEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::TotalRequests)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::SuccessfulRequests)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::FailedRequests)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::PendingRequests)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::SuccessRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::AvgResponseTimeMs)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::P95ResponseTimeMs)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::UsageByService)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One report per window; re-runs over the same window upsert
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_reports_window_unique")
                    .table(AnalyticsReports::Table)
                    .col(AnalyticsReports::WindowStart)
                    .col(AnalyticsReports::WindowEnd)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_reports_created_at")
                    .table(AnalyticsReports::Table)
                    .col(AnalyticsReports::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnalyticsReports::Table).to_owned())
            .await
    }
}
