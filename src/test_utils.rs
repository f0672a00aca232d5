use crate::{
    analytics::AnalyticsConfig,
    database::{
        DatabaseManager, DatabaseManagerImpl, NewRequestLog, config::DatabaseConfig,
        entities::RequestStatus,
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Builds a migrated in-memory SQLite database for tests
pub struct TestDatabaseBuilder {
    config: DatabaseConfig,
}

impl TestDatabaseBuilder {
    pub fn new() -> Self {
        Self {
            config: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                // Every pooled connection to :memory: is a separate database
                max_connections: 1,
                ..Default::default()
            },
        }
    }

    pub async fn build(self) -> Arc<dyn DatabaseManager> {
        let database = DatabaseManagerImpl::new_from_config(&self.config)
            .await
            .unwrap();
        database.migrate().await.unwrap();
        Arc::new(database)
    }
}

impl Default for TestDatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Analytics configuration with only the given sinks switched on
pub fn analytics_config(log: bool, database: bool, file: bool) -> AnalyticsConfig {
    let mut config = AnalyticsConfig::default();
    config.sinks.log = log;
    config.sinks.database = database;
    config.sinks.file = file;
    config
}

/// A request log entry with sensible defaults for the fields analytics ignores
pub fn request_log(
    status: RequestStatus,
    service: &str,
    response_time_ms: Option<f64>,
    created_at: DateTime<Utc>,
) -> NewRequestLog {
    NewRequestLog {
        user_id: "user-1".to_string(),
        prompt: "a lighthouse at dusk".to_string(),
        service: service.to_string(),
        status,
        response_time_ms,
        created_at,
    }
}

/// Insert request logs, panicking on failure
pub async fn insert_logs(database: &dyn DatabaseManager, logs: &[NewRequestLog]) {
    let dao = database.request_logs();
    for log in logs {
        dao.store_log(log).await.unwrap();
    }
}
