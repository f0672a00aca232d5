use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analytics_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_requests: i64,
    pub successful_requests: i64,
    pub failed_requests: i64,
    pub pending_requests: i64,
    pub success_rate: f64,
    pub avg_response_time_ms: f64,
    pub p95_response_time_ms: Option<f64>,
    /// JSON object mapping service identifier to request count
    #[sea_orm(column_type = "Text")]
    pub usage_by_service: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the stored per-service request counts
    pub fn service_usage(&self) -> serde_json::Result<BTreeMap<String, u64>> {
        serde_json::from_str(&self.usage_by_service)
    }
}
