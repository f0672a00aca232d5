use super::{
    aggregator::ReportAggregator, config::AnalyticsConfig, emitter::ReportEmitter,
    error::AnalyticsError, report::AnalyticsOutcome, window::ReportWindow,
};
use crate::database::DatabaseManager;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// One analytics run: validate, fetch, compute, emit
pub struct AnalyticsService {
    config: AnalyticsConfig,
    aggregator: ReportAggregator,
    emitter: ReportEmitter,
}

impl AnalyticsService {
    /// Service with the sinks enabled in `config`
    pub fn new(database: Arc<dyn DatabaseManager>, config: AnalyticsConfig) -> Self {
        let emitter = ReportEmitter::from_config(&config.sinks, &config.output_dir, database.clone());
        Self::with_emitter(database, config, emitter)
    }

    pub fn with_emitter(
        database: Arc<dyn DatabaseManager>,
        config: AnalyticsConfig,
        emitter: ReportEmitter,
    ) -> Self {
        let aggregator = ReportAggregator::new(database, &config);
        Self {
            config,
            aggregator,
            emitter,
        }
    }

    /// Window for a run ending at `end`, or now
    pub fn window_ending_at(&self, end: Option<DateTime<Utc>>) -> Result<ReportWindow, AnalyticsError> {
        self.config.validate()?;
        ReportWindow::ending_at(end.unwrap_or_else(Utc::now), self.config.window_hours)
    }

    /// Aggregate the window ending at `end` (default now) and emit the outcome.
    ///
    /// An empty window is a successful run. Sink failures are reported only
    /// after every sink has been attempted.
    pub async fn run(&self, end: Option<DateTime<Utc>>) -> Result<AnalyticsOutcome, AnalyticsError> {
        let window = self.window_ending_at(end)?;
        info!(
            "Starting analytics run for window {} (sinks: {})",
            window,
            self.emitter.sink_names().join(", ")
        );

        let outcome = self.aggregator.aggregate(window).await?;
        self.emitter.emit(&outcome).await?;

        info!(
            "Analytics run completed{}",
            if outcome.is_empty() { " with no data to process" } else { "" }
        );
        Ok(outcome)
    }
}
