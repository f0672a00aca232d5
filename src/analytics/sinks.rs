use super::report::AnalyticsOutcome;
use crate::database::DatabaseManager;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type SinkResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A destination for finished analytics outcomes
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Sink name for logging and error reporting
    fn name(&self) -> &str;

    /// Record the outcome. Must not assume any other sink ran before it.
    async fn emit(&self, outcome: &AnalyticsOutcome) -> SinkResult;
}

/// Writes the report as a single structured log event
pub struct LogSink;

#[async_trait]
impl ReportSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn emit(&self, outcome: &AnalyticsOutcome) -> SinkResult {
        match outcome {
            AnalyticsOutcome::Empty { window } => {
                warn!(
                    window_start = %window.start,
                    window_end = %window.end,
                    "No request logs found in window"
                );
            }
            AnalyticsOutcome::Report(report) => {
                info!(
                    window_start = %report.window_start,
                    window_end = %report.window_end,
                    total_requests = report.total_requests,
                    successful_requests = report.successful_requests,
                    failed_requests = report.failed_requests,
                    pending_requests = report.pending_requests,
                    success_rate = %format!("{:.2}%", report.success_rate_percent),
                    avg_response_time_ms = %format!("{:.2}ms", report.average_response_time_ms),
                    p95_response_time_ms = ?report.p95_response_time_ms,
                    usage_by_service = ?report.usage_by_service,
                    "Analytics report"
                );
            }
        }
        Ok(())
    }
}

/// Persists reports into the analytics_reports table
pub struct DatabaseSink {
    database: Arc<dyn DatabaseManager>,
}

impl DatabaseSink {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl ReportSink for DatabaseSink {
    fn name(&self) -> &str {
        "database"
    }

    async fn emit(&self, outcome: &AnalyticsOutcome) -> SinkResult {
        let Some(report) = outcome.report() else {
            debug!("Empty window, nothing to persist");
            return Ok(());
        };

        self.database.analytics_reports().upsert_report(report).await?;
        info!("Stored analytics report for window {}", report.window());
        Ok(())
    }
}

/// Writes one pretty-printed JSON file per report date, replacing earlier runs
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// File path for a window ending at `window_end` (UTC date)
    pub fn report_path(&self, window_end: DateTime<Utc>) -> PathBuf {
        self.output_dir.join(format!(
            "analytics-report-{}.json",
            window_end.format("%Y-%m-%d")
        ))
    }
}

#[async_trait]
impl ReportSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn emit(&self, outcome: &AnalyticsOutcome) -> SinkResult {
        let path = self.report_path(outcome.window().end);
        let body = serde_json::to_vec_pretty(outcome)?;

        tokio::fs::create_dir_all(&self.output_dir).await?;

        // Readers only ever see a complete report: write aside, then swap in
        let staging = path.with_extension("json.tmp");
        let written = match tokio::fs::write(&staging, body).await {
            Ok(()) => tokio::fs::rename(&staging, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        info!("Wrote analytics report to {}", path.display());
        Ok(())
    }
}
