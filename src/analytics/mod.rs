//! Request analytics reporting
//!
//! A run reads every request log in a time window, reduces it to a single
//! [`Report`] and hands that report to the configured sinks.

pub mod aggregator;
pub mod config;
pub mod emitter;
pub mod error;
pub mod report;
pub mod service;
pub mod sinks;
pub mod window;

pub use aggregator::{AggregationOptions, ReportAggregator, p95_nearest_rank, summarize};
pub use config::{AnalyticsConfig, SinksConfig};
pub use emitter::{EmitSummary, ReportEmitter};
pub use error::{AnalyticsError, SinkError, SinkFailures};
pub use report::{AnalyticsOutcome, Report, ServiceUsage};
pub use service::AnalyticsService;
pub use sinks::{DatabaseSink, FileSink, LogSink, ReportSink};
pub use window::ReportWindow;
