use crate::database::entities::{ApiRequestLog, RequestStatus, api_request_logs};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// The projection of a request log the aggregator works on
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct RequestSample {
    pub status: RequestStatus,
    pub service: String,
    pub response_time_ms: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Data required to record a new API request
#[derive(Debug, Clone)]
pub struct NewRequestLog {
    pub user_id: String,
    pub prompt: String,
    pub service: String,
    pub status: RequestStatus,
    pub response_time_ms: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Request logs DAO; the analytics side only ever reads through it
pub struct RequestLogsDao {
    db: DatabaseConnection,
}

impl RequestLogsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetch every request created in `[start, end)`.
    ///
    /// Only the columns needed for aggregation are selected. `limit` caps the
    /// number of rows returned; callers detect truncation by asking for one
    /// row more than they are willing to accept.
    pub async fn fetch_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<u64>,
    ) -> DatabaseResult<Vec<RequestSample>> {
        let mut select = api_request_logs::Entity::find()
            .select_only()
            .columns([
                api_request_logs::Column::Status,
                api_request_logs::Column::Service,
                api_request_logs::Column::ResponseTimeMs,
                api_request_logs::Column::CreatedAt,
            ])
            .filter(api_request_logs::Column::CreatedAt.gte(start))
            .filter(api_request_logs::Column::CreatedAt.lt(end))
            .order_by_asc(api_request_logs::Column::CreatedAt);

        if let Some(limit) = limit {
            select = select.limit(Some(limit));
        }

        select
            .into_model::<RequestSample>()
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Store a request log entry
    pub async fn store_log(&self, log: &NewRequestLog) -> DatabaseResult<ApiRequestLog> {
        let active_model = api_request_logs::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: Set(log.user_id.clone()),
            prompt: Set(log.prompt.clone()),
            service: Set(log.service.clone()),
            status: Set(log.status),
            response_time_ms: Set(log.response_time_ms),
            created_at: Set(log.created_at),
        };

        active_model
            .insert(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Total number of stored request logs
    pub async fn count(&self) -> DatabaseResult<u64> {
        api_request_logs::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }
}
