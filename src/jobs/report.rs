use super::{Job, JobResult};
use crate::{
    analytics::{AnalyticsError, AnalyticsOutcome, AnalyticsService},
    error::AppError,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Scheduled analytics report over the window ending at execution time
pub struct ReportJob {
    service: Arc<AnalyticsService>,
}

impl ReportJob {
    pub fn new(service: Arc<AnalyticsService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Job for ReportJob {
    fn name(&self) -> &str {
        "analytics_report"
    }

    async fn execute(&self) -> Result<JobResult, AppError> {
        match self.service.run(None).await {
            Ok(AnalyticsOutcome::Report(report)) => {
                Ok(JobResult::success_with_count(report.total_requests))
            }
            Ok(AnalyticsOutcome::Empty { .. }) => Ok(JobResult::success_with_count(0)),
            // The report itself was built; only some destinations missed it
            Err(AnalyticsError::Sinks(failures)) => Ok(JobResult::failure(failures.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
