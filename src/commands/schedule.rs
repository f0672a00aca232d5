use super::with_database;
use crate::{
    Config,
    analytics::AnalyticsService,
    error::AppError,
    jobs::{Job, JobScheduler, ReportJob},
    shutdown::ShutdownCoordinator,
};
use std::sync::Arc;
use tracing::info;

pub async fn handle_schedule_command(config: &Config) -> Result<(), AppError> {
    if !config.jobs.enabled {
        return Err(AppError::Internal(
            "job scheduler is disabled; set jobs.enabled = true to use `schedule`".to_string(),
        ));
    }
    config.analytics.validate()?;

    with_database(config, |database| async move {
        let service = Arc::new(AnalyticsService::new(database, config.analytics.clone()));
        let jobs: Vec<Arc<dyn Job>> = vec![Arc::new(ReportJob::new(service))];

        let coordinator = ShutdownCoordinator::new();
        let mut scheduler = JobScheduler::new(config.jobs.clone(), coordinator.subscribe());
        scheduler.start(jobs)?;

        info!(
            "Analytics report scheduled with '{}'; press Ctrl+C to stop",
            config.jobs.analytics_report.schedule
        );
        coordinator.wait_for_shutdown_signal().await;
        scheduler.wait().await;

        Ok(())
    })
    .await
}
