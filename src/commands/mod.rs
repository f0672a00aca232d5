pub mod migrate;
pub mod report;
pub mod schedule;

use crate::{
    Config,
    database::{DatabaseManager, DatabaseManagerImpl},
    error::AppError,
};
use clap::Subcommand;
use std::{future::Future, sync::Arc};
use tracing::warn;

#[derive(Subcommand)]
pub enum Commands {
    /// Build analytics reports from the request log
    Report {
        #[command(subcommand)]
        action: report::ReportCommand,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: migrate::MigrateAction,
    },
    /// Run the report job on its cron schedule until interrupted
    Schedule,
}

pub async fn handle_command(command: Commands, config: &Config) -> Result<(), AppError> {
    match command {
        Commands::Report { action } => report::handle_report_command(action, config).await,
        Commands::Migrate { action } => migrate::handle_migrate_command(action, config).await,
        Commands::Schedule => schedule::handle_schedule_command(config).await,
    }
}

/// Run `f` with a database handle that is closed on every exit path.
///
/// Migrations run first when `database.migration_on_startup` is set.
pub async fn with_database<F, Fut, T>(config: &Config, f: F) -> Result<T, AppError>
where
    F: FnOnce(Arc<dyn DatabaseManager>) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let database: Arc<dyn DatabaseManager> =
        Arc::new(DatabaseManagerImpl::new_from_config(&config.database).await?);

    let result = async {
        if config.database.migration_on_startup {
            database.migrate().await?;
        }
        f(database.clone()).await
    }
    .await;

    if let Err(e) = database.close().await {
        warn!("Failed to close database connection: {}", e);
    }

    result
}
