use super::with_database;
use crate::{
    Config,
    analytics::{AnalyticsConfig, AnalyticsOutcome, AnalyticsService, LogSink, ReportEmitter},
    error::AppError,
};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Aggregate one window of request logs and emit the report
    Run(RunArgs),

    /// Show the most recently stored reports
    List {
        #[arg(long, help = "Number of reports to show", default_value = "10")]
        limit: u64,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    #[arg(long, help = "Window length in hours (overrides analytics.window_hours)")]
    pub hours: Option<f64>,

    #[arg(long, help = "Window end as RFC 3339 timestamp (defaults to now)")]
    pub end: Option<DateTime<Utc>>,

    #[arg(long, help = "Skip the P95 response time calculation")]
    pub no_p95: bool,

    #[arg(long, conflicts_with = "no_file", help = "Also write the report as a JSON file")]
    pub file: bool,

    #[arg(long, help = "Do not write a JSON report file")]
    pub no_file: bool,

    #[arg(long, help = "Do not store the report in the database")]
    pub no_database: bool,

    #[arg(long, help = "Directory for JSON report files")]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Dry run - aggregate and log the report without storing it anywhere"
    )]
    pub dry_run: bool,
}

impl RunArgs {
    /// Analytics configuration with command line overrides applied
    pub fn apply(&self, base: &AnalyticsConfig) -> AnalyticsConfig {
        let mut config = base.clone();

        if let Some(hours) = self.hours {
            config.window_hours = hours;
        }
        if self.no_p95 {
            config.include_p95 = false;
        }
        if self.file {
            config.sinks.file = true;
        }
        if self.no_file {
            config.sinks.file = false;
        }
        if self.no_database {
            config.sinks.database = false;
        }
        if let Some(ref output_dir) = self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if self.dry_run {
            config.sinks.log = true;
            config.sinks.database = false;
            config.sinks.file = false;
        }

        config
    }
}

pub async fn handle_report_command(command: ReportCommand, config: &Config) -> Result<(), AppError> {
    match command {
        ReportCommand::Run(args) => {
            let analytics = args.apply(&config.analytics);
            // Fail before opening any connection
            analytics.validate()?;

            if args.dry_run {
                info!("DRY RUN: report will only be logged");
            }

            let end = args.end;
            let outcome = with_database(config, |database| async move {
                let service = if args.dry_run {
                    let emitter = ReportEmitter::new().with_sink(LogSink);
                    AnalyticsService::with_emitter(database, analytics, emitter)
                } else {
                    AnalyticsService::new(database, analytics)
                };
                Ok(service.run(end).await?)
            })
            .await?;

            match outcome {
                AnalyticsOutcome::Report(report) => info!(
                    "Analytics job completed successfully ({} requests)",
                    report.total_requests
                ),
                AnalyticsOutcome::Empty { .. } => {
                    info!("Analytics job completed with no data to process")
                }
            }
        }

        ReportCommand::List { limit } => {
            let reports = with_database(config, |database| async move {
                Ok(database.analytics_reports().list_recent(limit).await?)
            })
            .await?;

            if reports.is_empty() {
                println!("No analytics reports stored yet");
                return Ok(());
            }

            println!(
                "{:<26} {:<26} {:>8} {:>8} {:>8} {:>8} {:>9} {:>10} {:>10}",
                "WINDOW START", "WINDOW END", "TOTAL", "OK", "FAILED", "PENDING", "SUCCESS", "AVG MS", "P95 MS"
            );
            for report in reports {
                let p95 = report
                    .p95_response_time_ms
                    .map(|p95| format!("{p95:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<26} {:<26} {:>8} {:>8} {:>8} {:>8} {:>8.2}% {:>10.2} {:>10}",
                    report.window_start.format("%Y-%m-%d %H:%M:%S UTC"),
                    report.window_end.format("%Y-%m-%d %H:%M:%S UTC"),
                    report.total_requests,
                    report.successful_requests,
                    report.failed_requests,
                    report.pending_requests,
                    report.success_rate,
                    report.avg_response_time_ms,
                    p95
                );
                match report.service_usage() {
                    Ok(usage) => {
                        for (service, count) in usage {
                            println!("    {service}: {count}");
                        }
                    }
                    Err(e) => println!("    (unreadable service usage: {e})"),
                }
            }
        }
    }

    Ok(())
}
