use sea_orm_migration::prelude::*;

pub use sea_orm_migration::MigratorTrait;

mod m20250601_000000_create_api_request_logs_table;
mod m20250601_000100_create_analytics_reports_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000000_create_api_request_logs_table::Migration),
            Box::new(m20250601_000100_create_analytics_reports_table::Migration),
        ]
    }
}

/// Common table and column identifiers
#[derive(Iden)]
pub enum ApiRequestLogs {
    Table,
    Id,
    UserId,
    Prompt,
    Service,
    Status,
    ResponseTimeMs,
    CreatedAt,
}

#[derive(Iden)]
pub enum AnalyticsReports {
    Table,
    Id,
    WindowStart,
    WindowEnd,
    TotalRequests,
    SuccessfulRequests,
    FailedRequests,
    PendingRequests,
    SuccessRate,
    AvgResponseTimeMs,
    P95ResponseTimeMs,
    UsageByService,
    CreatedAt,
}
