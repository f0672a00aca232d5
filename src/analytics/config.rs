use super::error::AnalyticsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest row limit the database drivers accept
const MAX_RECORDS_CAP: u64 = i64::MAX as u64;

/// Configuration for the analytics report job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Length of the reporting window in hours, ending at the run time
    #[serde(default = "default_window_hours")]
    pub window_hours: f64,
    /// Maximum number of request logs a single run will accept (0 = unlimited)
    #[serde(default = "default_max_records")]
    pub max_records: u64,
    /// Whether to compute the 95th percentile response time
    #[serde(default = "default_include_p95")]
    pub include_p95: bool,
    /// Enabled report destinations
    #[serde(default)]
    pub sinks: SinksConfig,
    /// Directory for JSON report files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinksConfig {
    /// Emit the report as a structured log event
    #[serde(default = "default_true")]
    pub log: bool,
    /// Persist the report into the analytics_reports table
    #[serde(default = "default_true")]
    pub database: bool,
    /// Write the report as JSON into `output_dir`
    #[serde(default)]
    pub file: bool,
}

fn default_window_hours() -> f64 {
    24.0
}

fn default_max_records() -> u64 {
    100_000
}

fn default_include_p95() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}

fn default_true() -> bool {
    true
}

impl Default for SinksConfig {
    fn default() -> Self {
        Self {
            log: true,
            database: true,
            file: false,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            max_records: default_max_records(),
            include_p95: default_include_p95(),
            sinks: SinksConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl AnalyticsConfig {
    /// Reject settings that would make a run meaningless before touching the database
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if !self.window_hours.is_finite() || self.window_hours <= 0.0 {
            return Err(AnalyticsError::Configuration {
                message: format!(
                    "window_hours must be a finite positive number, got {}",
                    self.window_hours
                ),
            });
        }

        // Row limits are bound as signed 64-bit integers, and one extra row is requested
        if self.max_records >= MAX_RECORDS_CAP {
            return Err(AnalyticsError::Configuration {
                message: format!(
                    "max_records must be below {}, got {}",
                    MAX_RECORDS_CAP, self.max_records
                ),
            });
        }

        if self.sinks.file && self.output_dir.as_os_str().is_empty() {
            return Err(AnalyticsError::Configuration {
                message: "output_dir must be set when the file sink is enabled".to_string(),
            });
        }

        Ok(())
    }

    /// Limit to request from the log store, one above the cap so overflow is detectable
    pub fn fetch_limit(&self) -> Option<u64> {
        match self.max_records {
            0 => None,
            max => Some(max.saturating_add(1).min(MAX_RECORDS_CAP)),
        }
    }
}
