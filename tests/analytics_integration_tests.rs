use chrono::{DateTime, Duration, TimeZone, Utc};
use request_analytics::{
    Config,
    analytics::{AnalyticsError, AnalyticsOutcome, AnalyticsService, FileSink, ReportEmitter},
    commands::with_database,
    database::{
        DatabaseManager,
        entities::RequestStatus,
        migration::{Migrator, MigratorTrait},
    },
    error::AppError,
    jobs::{Job, ReportJob},
    test_utils::{TestDatabaseBuilder, analytics_config, insert_logs, request_log},
};
use std::sync::{Arc, Mutex};

fn window_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
}

async fn seed_scenario(database: &dyn DatabaseManager) {
    let end = window_end();
    insert_logs(
        database,
        &[
            request_log(RequestStatus::Success, "serviceA", Some(100.0), end - Duration::hours(3)),
            request_log(RequestStatus::Success, "serviceA", Some(200.0), end - Duration::hours(2)),
            request_log(RequestStatus::Error, "serviceB", Some(0.0), end - Duration::hours(1)),
            // Outside the window on both sides
            request_log(RequestStatus::Success, "serviceC", Some(50.0), end),
            request_log(RequestStatus::Error, "serviceC", Some(50.0), end - Duration::hours(25)),
        ],
    )
    .await;
}

#[tokio::test]
async fn test_report_run_stores_and_writes_report() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = analytics_config(true, true, true);
    config.output_dir = dir.path().to_path_buf();

    let service = AnalyticsService::new(database.clone(), config);
    let outcome = service.run(Some(window_end())).await.unwrap();

    let report = outcome.report().expect("populated report").clone();
    assert_eq!(report.total_requests, 3);
    assert_eq!(report.successful_requests, 2);
    assert_eq!(report.failed_requests, 1);
    assert_eq!(format!("{:.2}", report.success_rate_percent), "66.67");
    assert_eq!(report.average_response_time_ms, 100.0);
    assert_eq!(report.p95_response_time_ms, Some(200.0));
    assert_eq!(report.usage_by_service.len(), 2);
    assert_eq!(report.usage_by_service["serviceA"], 2);
    assert_eq!(report.usage_by_service["serviceB"], 1);

    let stored = database
        .analytics_reports()
        .latest()
        .await
        .unwrap()
        .expect("stored report");
    assert_eq!(stored.total_requests, 3);
    assert_eq!(stored.successful_requests, 2);
    assert_eq!(stored.failed_requests, 1);
    assert_eq!(stored.window_start, window_end() - Duration::hours(24));
    assert_eq!(stored.window_end, window_end());
    assert_eq!(stored.created_at, window_end());
    assert_eq!(stored.p95_response_time_ms, Some(200.0));
    assert_eq!(stored.service_usage().unwrap(), report.usage_by_service);

    let path = FileSink::new(dir.path()).report_path(window_end());
    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(written["status"], "report");
    assert_eq!(written["totalRequests"], 3);
}

#[tokio::test]
async fn test_empty_window_is_success() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = analytics_config(true, true, true);
    config.output_dir = dir.path().to_path_buf();

    let service = AnalyticsService::new(database.clone(), config);
    let end = window_end() + Duration::days(10);
    let outcome = service.run(Some(end)).await.unwrap();

    assert!(outcome.is_empty());
    assert!(database.analytics_reports().latest().await.unwrap().is_none());

    let path = FileSink::new(dir.path()).report_path(end);
    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(written["status"], "empty");
}

#[tokio::test]
async fn test_rerun_over_same_window_upserts() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    let service = AnalyticsService::new(database.clone(), analytics_config(false, true, false));
    service.run(Some(window_end())).await.unwrap();

    insert_logs(
        &*database,
        &[request_log(
            RequestStatus::Pending,
            "serviceB",
            None,
            window_end() - Duration::minutes(5),
        )],
    )
    .await;
    service.run(Some(window_end())).await.unwrap();

    let reports = database.analytics_reports().list_recent(10).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].total_requests, 4);
    assert_eq!(reports[0].pending_requests, 1);
    assert_eq!(reports[0].failed_requests, 1);

    let by_window = database
        .analytics_reports()
        .find_by_window(window_end() - Duration::hours(24), window_end())
        .await
        .unwrap()
        .expect("report for the window");
    assert_eq!(by_window.id, reports[0].id);
    assert!(
        database
            .analytics_reports()
            .find_by_window(window_end(), window_end() + Duration::hours(24))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_result_cap_surfaces_truncation() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    let mut config = analytics_config(false, true, false);
    config.max_records = 2;

    let service = AnalyticsService::new(database.clone(), config);
    let err = service.run(Some(window_end())).await.unwrap_err();

    assert!(matches!(err, AnalyticsError::DataTruncated { limit: 2, .. }));
    assert!(database.analytics_reports().latest().await.unwrap().is_none());
}

#[tokio::test]
async fn test_result_cap_allows_exact_fit() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    let mut config = analytics_config(false, false, false);
    config.max_records = 3;

    let service = AnalyticsService::new(database, config);
    let outcome = service.run(Some(window_end())).await.unwrap();
    assert_eq!(outcome.report().unwrap().total_requests, 3);
}

#[tokio::test]
async fn test_failing_sink_does_not_block_database_sink() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    // A regular file where the output directory should be
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let mut config = analytics_config(true, false, false);
    config.output_dir = blocker.path().to_path_buf();

    let emitter = ReportEmitter::new()
        .with_sink(FileSink::new(blocker.path()))
        .with_sink(request_analytics::analytics::DatabaseSink::new(database.clone()));
    let service = AnalyticsService::with_emitter(database.clone(), config, emitter);

    let err = service.run(Some(window_end())).await.unwrap_err();
    match err {
        AnalyticsError::Sinks(failures) => {
            assert_eq!(failures.failures.len(), 1);
            assert_eq!(failures.failures[0].sink, "file");
            assert_eq!(failures.succeeded, vec!["database"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let stored = database.analytics_reports().latest().await.unwrap();
    assert_eq!(stored.map(|r| r.total_requests), Some(3));
}

#[tokio::test]
async fn test_fetch_failure_is_reported_with_window() {
    let database = TestDatabaseBuilder::new().build().await;
    database.close().await.unwrap();

    let service = AnalyticsService::new(database, analytics_config(false, false, false));
    let err = service.run(Some(window_end())).await.unwrap_err();

    assert!(matches!(err, AnalyticsError::Fetch { .. }));
    assert!(err.to_string().contains("2025-06-02T00:00:00Z"));
}

#[tokio::test]
async fn test_invalid_window_fails_before_querying() {
    // A closed database would turn any query into a fetch error
    let database = TestDatabaseBuilder::new().build().await;
    database.close().await.unwrap();

    let mut config = analytics_config(false, false, false);
    config.window_hours = -3.0;

    let service = AnalyticsService::new(database, config);
    let err = service.run(Some(window_end())).await.unwrap_err();
    assert!(matches!(err, AnalyticsError::Configuration { .. }));
}

#[tokio::test]
async fn test_p95_disabled_is_stored_as_null() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    let mut config = analytics_config(false, true, false);
    config.include_p95 = false;

    AnalyticsService::new(database.clone(), config)
        .run(Some(window_end()))
        .await
        .unwrap();

    let stored = database.analytics_reports().latest().await.unwrap().unwrap();
    assert_eq!(stored.p95_response_time_ms, None);
}

#[tokio::test]
async fn test_fetch_window_projects_half_open_range() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    let end = window_end();
    let samples = database
        .request_logs()
        .fetch_window(end - Duration::hours(24), end, None)
        .await
        .unwrap();

    assert_eq!(samples.len(), 3);
    assert!(samples.iter().all(|s| s.created_at < end));
    assert!(samples.windows(2).all(|pair| pair[0].created_at <= pair[1].created_at));
    assert_eq!(samples[2].status, RequestStatus::Error);
    assert_eq!(database.request_logs().count().await.unwrap(), 5);

    let capped = database
        .request_logs()
        .fetch_window(end - Duration::hours(24), end, Some(2))
        .await
        .unwrap();
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn test_report_job_counts_requests() {
    let database = TestDatabaseBuilder::new().build().await;
    insert_logs(
        &*database,
        &[
            request_log(RequestStatus::Success, "telegram-bot", Some(12.0), Utc::now() - Duration::minutes(10)),
            request_log(RequestStatus::Error, "discord-bot", None, Utc::now() - Duration::minutes(5)),
        ],
    )
    .await;

    let service = Arc::new(AnalyticsService::new(
        database.clone(),
        analytics_config(true, true, false),
    ));
    let job = ReportJob::new(service);

    assert_eq!(job.name(), "analytics_report");
    let result = job.execute().await.unwrap();
    assert!(result.success);
    assert_eq!(result.items_processed, 2);
    assert!(database.analytics_reports().latest().await.unwrap().is_some());
}

#[tokio::test]
async fn test_outcome_window_matches_requested_end() {
    let database = TestDatabaseBuilder::new().build().await;
    let mut config = analytics_config(false, false, false);
    config.window_hours = 0.5;

    let outcome = AnalyticsService::new(database, config)
        .run(Some(window_end()))
        .await
        .unwrap();

    match outcome {
        AnalyticsOutcome::Empty { window } => {
            assert_eq!(window.end, window_end());
            assert_eq!(window.start, window_end() - Duration::minutes(30));
        }
        AnalyticsOutcome::Report(_) => panic!("expected an empty window"),
    }
}

#[tokio::test]
async fn test_health_check_tracks_connection_state() {
    let database = TestDatabaseBuilder::new().build().await;
    assert!(database.health_check().await.is_ok());

    database.close().await.unwrap();
    assert!(database.health_check().await.is_err());
}

#[tokio::test]
async fn test_oversized_result_cap_is_a_configuration_error() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    let mut config = analytics_config(false, true, false);
    config.max_records = u64::MAX - 1;

    let err = AnalyticsService::new(database.clone(), config)
        .run(Some(window_end()))
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyticsError::Configuration { .. }));
    assert!(database.analytics_reports().latest().await.unwrap().is_none());
}

#[tokio::test]
async fn test_rolling_back_migrations_keeps_request_logs() {
    let database = TestDatabaseBuilder::new().build().await;
    seed_scenario(&*database).await;

    Migrator::down(database.connection(), None).await.unwrap();
    assert_eq!(database.request_logs().count().await.unwrap(), 5);

    // Re-applying leaves the existing log table alone
    Migrator::up(database.connection(), None).await.unwrap();
    assert_eq!(database.request_logs().count().await.unwrap(), 5);
    assert!(database.analytics_reports().latest().await.unwrap().is_none());
}

fn file_backed_config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.database.url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("analytics.db").display()
    );
    config.database.max_connections = 1;
    config.database.migration_on_startup = true;
    config
}

#[tokio::test]
async fn test_scoped_database_is_closed_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_backed_config(&dir);
    let captured: Arc<Mutex<Option<Arc<dyn DatabaseManager>>>> = Arc::new(Mutex::new(None));

    let result: Result<(), AppError> = with_database(&config, |database| {
        let captured = captured.clone();
        async move {
            // Migrated on startup
            assert_eq!(database.request_logs().count().await.unwrap(), 0);
            *captured.lock().unwrap() = Some(database);
            Err(AppError::Internal("report failed".to_string()))
        }
    })
    .await;
    assert!(matches!(result, Err(AppError::Internal(_))));

    let database = captured.lock().unwrap().take().expect("handle passed to closure");
    assert!(database.health_check().await.is_err());
}

#[tokio::test]
async fn test_scoped_database_is_closed_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_backed_config(&dir);

    let database = with_database(&config, |database| async move {
        assert!(database.health_check().await.is_ok());
        Ok(database)
    })
    .await
    .unwrap();

    assert!(database.health_check().await.is_err());
}
