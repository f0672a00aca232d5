use super::{
    config::AnalyticsConfig,
    error::AnalyticsError,
    report::{AnalyticsOutcome, Report, ServiceUsage},
    window::ReportWindow,
};
use crate::database::{DatabaseManager, RequestSample, entities::RequestStatus};
use std::sync::Arc;
use tracing::{debug, info};

/// Toggles for optional report fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationOptions {
    pub include_p95: bool,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self { include_p95: true }
    }
}

/// Running totals for one window
#[derive(Debug, Default)]
struct WindowTotals {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    pending_requests: u64,
    total_response_time: f64,
    measured_response_times: Vec<f64>,
    usage_by_service: ServiceUsage,
}

impl WindowTotals {
    fn record(&mut self, sample: &RequestSample) {
        self.total_requests += 1;

        match sample.status {
            RequestStatus::Success => self.successful_requests += 1,
            RequestStatus::Error => self.failed_requests += 1,
            RequestStatus::Pending => self.pending_requests += 1,
        }

        // Unmeasured requests weigh in as 0ms on the mean but never reach P95
        let response_time = sample.response_time_ms.unwrap_or(0.0);
        self.total_response_time += response_time;
        if response_time > 0.0 {
            self.measured_response_times.push(response_time);
        }

        *self
            .usage_by_service
            .entry(sample.service.clone())
            .or_default() += 1;
    }
}

/// 95th percentile by nearest rank: sort ascending and take index
/// `floor(0.95 * n)`, clamped to the last element. An empty sample yields 0.
pub fn p95_nearest_rank(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let index = (values.len() * 95 / 100).min(values.len() - 1);
    values[index]
}

/// Reduce the request logs of a window to an outcome.
///
/// Records are trusted to lie inside `window`; the log store query is what
/// enforces the bounds.
pub fn summarize(
    window: ReportWindow,
    samples: &[RequestSample],
    options: AggregationOptions,
) -> AnalyticsOutcome {
    if samples.is_empty() {
        return AnalyticsOutcome::Empty { window };
    }

    let mut totals = WindowTotals::default();
    for sample in samples {
        totals.record(sample);
    }

    let total = totals.total_requests as f64;
    let success_rate_percent = totals.successful_requests as f64 / total * 100.0;
    let average_response_time_ms = totals.total_response_time / total;
    let p95_response_time_ms = options
        .include_p95
        .then(|| p95_nearest_rank(&mut totals.measured_response_times));

    AnalyticsOutcome::Report(Report {
        window_start: window.start,
        window_end: window.end,
        total_requests: totals.total_requests,
        successful_requests: totals.successful_requests,
        failed_requests: totals.failed_requests,
        pending_requests: totals.pending_requests,
        success_rate_percent,
        average_response_time_ms,
        p95_response_time_ms,
        usage_by_service: totals.usage_by_service,
    })
}

/// Reads one window of request logs and aggregates it; never writes
pub struct ReportAggregator {
    database: Arc<dyn DatabaseManager>,
    max_records: u64,
    fetch_limit: Option<u64>,
    options: AggregationOptions,
}

impl ReportAggregator {
    pub fn new(database: Arc<dyn DatabaseManager>, config: &AnalyticsConfig) -> Self {
        Self {
            database,
            max_records: config.max_records,
            fetch_limit: config.fetch_limit(),
            options: AggregationOptions {
                include_p95: config.include_p95,
            },
        }
    }

    /// Fetch the window with a single query and build the outcome
    pub async fn aggregate(&self, window: ReportWindow) -> Result<AnalyticsOutcome, AnalyticsError> {
        info!("Aggregating request logs for window {}", window);

        let samples = self
            .database
            .request_logs()
            .fetch_window(window.start, window.end, self.fetch_limit)
            .await
            .map_err(|source| AnalyticsError::Fetch { window, source })?;

        if self.max_records > 0 && samples.len() as u64 > self.max_records {
            return Err(AnalyticsError::DataTruncated {
                window,
                limit: self.max_records,
            });
        }

        debug!("Fetched {} request logs", samples.len());

        let outcome = summarize(window, &samples, self.options);
        match &outcome {
            AnalyticsOutcome::Empty { .. } => info!("No request logs found in window {}", window),
            AnalyticsOutcome::Report(report) => info!(
                "Aggregated {} request logs across {} services",
                report.total_requests,
                report.usage_by_service.len()
            ),
        }

        Ok(outcome)
    }
}
