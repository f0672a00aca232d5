use super::{
    config::SinksConfig,
    error::{AnalyticsError, SinkError, SinkFailures},
    report::AnalyticsOutcome,
    sinks::{DatabaseSink, FileSink, LogSink, ReportSink},
};
use crate::database::DatabaseManager;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Names of the sinks that accepted an outcome
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmitSummary {
    pub succeeded: Vec<String>,
}

/// Fans an outcome out to every registered sink.
///
/// Sinks run one after another; a failing sink never stops the rest and all
/// failures are returned together.
pub struct ReportEmitter {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl ReportEmitter {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Build the sink set enabled in configuration
    pub fn from_config(
        sinks: &SinksConfig,
        output_dir: &Path,
        database: Arc<dyn DatabaseManager>,
    ) -> Self {
        let mut emitter = Self::new();
        if sinks.log {
            emitter.register(LogSink);
        }
        if sinks.database {
            emitter.register(DatabaseSink::new(database));
        }
        if sinks.file {
            emitter.register(FileSink::new(output_dir));
        }
        emitter
    }

    pub fn register<T>(&mut self, sink: T)
    where
        T: ReportSink + 'static,
    {
        self.sinks.push(Box::new(sink));
    }

    pub fn with_sink<T>(mut self, sink: T) -> Self
    where
        T: ReportSink + 'static,
    {
        self.register(sink);
        self
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    pub async fn emit(&self, outcome: &AnalyticsOutcome) -> Result<EmitSummary, AnalyticsError> {
        let mut summary = EmitSummary::default();
        let mut failures = Vec::new();

        for sink in &self.sinks {
            match sink.emit(outcome).await {
                Ok(()) => summary.succeeded.push(sink.name().to_string()),
                Err(e) => {
                    error!("Report sink '{}' failed: {}", sink.name(), e);
                    failures.push(SinkError {
                        sink: sink.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if failures.is_empty() {
            info!("Report delivered to {} sink(s)", summary.succeeded.len());
            Ok(summary)
        } else {
            Err(AnalyticsError::Sinks(SinkFailures {
                window: outcome.window(),
                failures,
                succeeded: summary.succeeded,
            }))
        }
    }
}

impl Default for ReportEmitter {
    fn default() -> Self {
        Self::new()
    }
}
