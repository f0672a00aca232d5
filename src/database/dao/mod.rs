pub mod analytics_reports;
pub mod request_logs;

pub use analytics_reports::AnalyticsReportsDao;
pub use request_logs::{NewRequestLog, RequestLogsDao, RequestSample};
