use crate::analytics::Report;
use crate::database::entities::{StoredReport, analytics_reports};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm_migration::sea_query::OnConflict;

/// Analytics reports DAO
pub struct AnalyticsReportsDao {
    db: DatabaseConnection,
}

impl AnalyticsReportsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Store a report, replacing any earlier report for the same window
    pub async fn upsert_report(&self, report: &Report) -> DatabaseResult<()> {
        let usage_by_service = serde_json::to_string(&report.usage_by_service)
            .map_err(|e| DatabaseError::Database(format!("Failed to encode usage: {}", e)))?;

        let active_model = analytics_reports::ActiveModel {
            id: ActiveValue::NotSet,
            window_start: Set(report.window_start),
            window_end: Set(report.window_end),
            total_requests: Set(report.total_requests as i64),
            successful_requests: Set(report.successful_requests as i64),
            failed_requests: Set(report.failed_requests as i64),
            pending_requests: Set(report.pending_requests as i64),
            success_rate: Set(report.success_rate_percent),
            avg_response_time_ms: Set(report.average_response_time_ms),
            p95_response_time_ms: Set(report.p95_response_time_ms),
            usage_by_service: Set(usage_by_service),
            created_at: Set(report.window_end),
        };

        let on_conflict = OnConflict::columns([
            analytics_reports::Column::WindowStart,
            analytics_reports::Column::WindowEnd,
        ])
        .update_columns([
            analytics_reports::Column::TotalRequests,
            analytics_reports::Column::SuccessfulRequests,
            analytics_reports::Column::FailedRequests,
            analytics_reports::Column::PendingRequests,
            analytics_reports::Column::SuccessRate,
            analytics_reports::Column::AvgResponseTimeMs,
            analytics_reports::Column::P95ResponseTimeMs,
            analytics_reports::Column::UsageByService,
            analytics_reports::Column::CreatedAt,
        ])
        .to_owned();

        analytics_reports::Entity::insert(active_model)
            .on_conflict(on_conflict)
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(())
    }

    /// Most recent reports first
    pub async fn list_recent(&self, limit: u64) -> DatabaseResult<Vec<StoredReport>> {
        analytics_reports::Entity::find()
            .order_by_desc(analytics_reports::Column::WindowEnd)
            .limit(Some(limit))
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn latest(&self) -> DatabaseResult<Option<StoredReport>> {
        analytics_reports::Entity::find()
            .order_by_desc(analytics_reports::Column::WindowEnd)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn find_by_window(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> DatabaseResult<Option<StoredReport>> {
        analytics_reports::Entity::find()
            .filter(analytics_reports::Column::WindowStart.eq(window_start))
            .filter(analytics_reports::Column::WindowEnd.eq(window_end))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }
}
