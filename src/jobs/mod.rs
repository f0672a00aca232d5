pub mod report;
pub mod scheduler;

use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use report::ReportJob;
pub use scheduler::JobScheduler;

/// Configuration for the in-process job scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Enable/disable internal job scheduler
    #[serde(default)]
    pub enabled: bool,

    /// Analytics report job configuration
    #[serde(default)]
    pub analytics_report: AnalyticsReportJobConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReportJobConfig {
    /// Cron schedule expression (sec min hour day month dow)
    pub schedule: String,
}

impl Default for AnalyticsReportJobConfig {
    fn default() -> Self {
        Self {
            schedule: "0 0 1 * * *".to_string(), // Daily at 1 AM UTC
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            analytics_report: AnalyticsReportJobConfig::default(),
        }
    }
}

/// Result of job execution
#[derive(Debug, Clone)]
pub struct JobResult {
    pub success: bool,
    pub message: String,
    pub items_processed: u64,
}

impl JobResult {
    pub fn success_with_count(count: u64) -> Self {
        Self {
            success: true,
            message: format!("Successfully processed {count} items"),
            items_processed: count,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            items_processed: 0,
        }
    }
}

/// Trait for executable jobs
#[async_trait]
pub trait Job: Send + Sync {
    /// Get the job name for logging and identification
    fn name(&self) -> &str;

    /// Execute the job and return the result
    async fn execute(&self) -> Result<JobResult, AppError>;
}
