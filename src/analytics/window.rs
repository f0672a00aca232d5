use super::error::AnalyticsError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open time interval `[start, end)` a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Window of `hours` length ending at `end`.
    ///
    /// Fractional hours are honoured to the millisecond. `hours` must be finite
    /// and large enough to produce a non-empty interval.
    pub fn ending_at(end: DateTime<Utc>, hours: f64) -> Result<Self, AnalyticsError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(AnalyticsError::Configuration {
                message: format!("window hours must be a finite positive number, got {hours}"),
            });
        }

        let millis = (hours * 3_600_000.0).round();
        if millis < 1.0 {
            return Err(AnalyticsError::Configuration {
                message: format!("window of {hours} hours is shorter than one millisecond"),
            });
        }

        let start = Duration::try_milliseconds(millis as i64)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| AnalyticsError::Configuration {
                message: format!("window of {hours} hours ending at {end} is out of range"),
            })?;

        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}
