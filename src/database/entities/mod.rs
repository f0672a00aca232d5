pub mod analytics_reports;
pub mod api_request_logs;

pub use analytics_reports::Entity as AnalyticsReports;
pub use api_request_logs::{Entity as ApiRequestLogs, RequestStatus};

// Type aliases
pub type ApiRequestLog = api_request_logs::Model;
pub type StoredReport = analytics_reports::Model;
