use super::{Job, JobsConfig};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info, warn};

/// Job scheduler that runs each job at the times its cron expression names
pub struct JobScheduler {
    config: JobsConfig,
    handles: Vec<JoinHandle<()>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl JobScheduler {
    pub fn new(config: JobsConfig, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            config,
            handles: Vec::new(),
            shutdown_rx,
        }
    }

    /// Spawn a task per job. Does nothing when the scheduler is disabled.
    pub fn start(&mut self, jobs: Vec<Arc<dyn Job>>) -> Result<(), AppError> {
        if !self.config.enabled {
            info!("Job scheduler disabled in configuration");
            return Ok(());
        }

        info!("Starting job scheduler with {} jobs", jobs.len());

        for job in jobs {
            let schedule = self.schedule_for_job(job.name())?;
            let handle = Self::spawn_job(job, schedule, self.shutdown_rx.clone());
            self.handles.push(handle);
        }

        info!("Job scheduler started successfully");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|handle| !handle.is_finished())
    }

    /// Wait for every job task to observe shutdown and exit
    pub async fn wait(&mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Job handle failed during shutdown: {}", e);
            }
        }
        info!("Job scheduler stopped");
    }

    fn spawn_job(
        job: Arc<dyn Job>,
        schedule: Schedule,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let job_name = job.name().to_string();
            info!("Job '{}' scheduled", job_name);

            while !*shutdown_rx.borrow() {
                let Some(delay) = next_delay(&schedule, Utc::now()) else {
                    warn!("Job '{}' has no upcoming executions", job_name);
                    break;
                };

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        info!("Executing job '{}'", job_name);

                        match job.execute().await {
                            Ok(result) if result.success => {
                                info!("Job '{}' completed: {}", job_name, result.message);
                            }
                            Ok(result) => {
                                warn!("Job '{}' failed: {}", job_name, result.message);
                            }
                            Err(e) => {
                                error!("Job '{}' execution error: {}", job_name, e);
                            }
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() {
                            // Coordinator dropped; nobody can stop us any more
                            break;
                        }
                    }
                }
            }

            info!("Job '{}' stopped", job_name);
        })
    }

    /// Get the schedule configuration for a specific job
    fn schedule_for_job(&self, job_name: &str) -> Result<Schedule, AppError> {
        match job_name {
            "analytics_report" => parse_schedule(&self.config.analytics_report.schedule),
            _ => Err(AppError::Internal(format!("Unknown job: {job_name}"))),
        }
    }
}

/// Parse a 6-field cron expression (sec min hour day month dow)
pub fn parse_schedule(cron: &str) -> Result<Schedule, AppError> {
    Schedule::from_str(cron)
        .map_err(|e| AppError::Internal(format!("Invalid cron expression '{cron}': {e}")))
}

/// Time from `now` until the next execution, if there is one
pub fn next_delay(schedule: &Schedule, now: DateTime<Utc>) -> Option<Duration> {
    let next = schedule.after(&now).next()?;
    (next - now).to_std().ok()
}
