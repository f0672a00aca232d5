use super::window::ReportWindow;
use crate::database::DatabaseError;
use std::fmt;
use thiserror::Error;

/// Errors produced by an analytics run
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid analytics configuration: {message}")]
    Configuration { message: String },

    #[error("Failed to fetch request logs for window {window}: {source}")]
    Fetch {
        window: ReportWindow,
        #[source]
        source: DatabaseError,
    },

    #[error(
        "Request logs for window {window} exceed the limit of {limit} records; refusing to report a partial count"
    )]
    DataTruncated { window: ReportWindow, limit: u64 },

    #[error("{0}")]
    Sinks(SinkFailures),
}

/// A single sink that failed to record a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    pub sink: String,
    pub message: String,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sink: {}", self.sink, self.message)
    }
}

impl std::error::Error for SinkError {}

/// Every sink failure from one emission, together with what did succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailures {
    pub window: ReportWindow,
    pub failures: Vec<SinkError>,
    pub succeeded: Vec<String>,
}

impl fmt::Display for SinkFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} report sink(s) failed for window {}: ",
            self.failures.len(),
            self.window
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}
