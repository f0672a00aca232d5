use super::window::ReportWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request count per originating service
pub type ServiceUsage = BTreeMap<String, u64>;

/// Summary statistics for one window of request logs.
///
/// Built once per run and never mutated afterwards. PENDING requests count
/// toward `total_requests` only, so
/// `total_requests == successful_requests + failed_requests + pending_requests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub pending_requests: u64,
    /// `successful / total * 100`, unrounded
    pub success_rate_percent: f64,
    /// Mean over every record, with unmeasured response times counted as 0
    pub average_response_time_ms: f64,
    /// Nearest-rank P95 over measured response times; `None` when disabled
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub p95_response_time_ms: Option<f64>,
    pub usage_by_service: ServiceUsage,
}

impl Report {
    pub fn window(&self) -> ReportWindow {
        ReportWindow {
            start: self.window_start,
            end: self.window_end,
        }
    }
}

/// Result of aggregating one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AnalyticsOutcome {
    /// No request logs fell inside the window
    Empty { window: ReportWindow },
    Report(Report),
}

impl AnalyticsOutcome {
    pub fn window(&self) -> ReportWindow {
        match self {
            AnalyticsOutcome::Empty { window } => *window,
            AnalyticsOutcome::Report(report) => report.window(),
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            AnalyticsOutcome::Empty { .. } => None,
            AnalyticsOutcome::Report(report) => Some(report),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AnalyticsOutcome::Empty { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_report() -> Report {
        let end = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        let window = ReportWindow::ending_at(end, 24.0).unwrap();
        Report {
            window_start: window.start,
            window_end: window.end,
            total_requests: 3,
            successful_requests: 2,
            failed_requests: 1,
            pending_requests: 0,
            success_rate_percent: 200.0 / 3.0,
            average_response_time_ms: 100.0,
            p95_response_time_ms: None,
            usage_by_service: BTreeMap::from([
                ("discord-bot".to_string(), 1),
                ("telegram-bot".to_string(), 2),
            ]),
        }
    }

    #[test]
    fn test_report_json_shape() {
        let json = serde_json::to_value(sample_report()).unwrap();

        assert_eq!(json["totalRequests"], 3);
        assert_eq!(json["usageByService"]["telegram-bot"], 2);
        assert!(json.get("p95ResponseTimeMs").is_none());
    }

    #[test]
    fn test_outcome_is_tagged() {
        let report = sample_report();
        let window = report.window();

        let json = serde_json::to_value(AnalyticsOutcome::Report(report)).unwrap();
        assert_eq!(json["status"], "report");
        assert_eq!(json["successfulRequests"], 2);

        let json = serde_json::to_value(AnalyticsOutcome::Empty { window }).unwrap();
        assert_eq!(json["status"], "empty");
        assert!(json["window"]["start"].is_string());
    }
}
