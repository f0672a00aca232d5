use crate::{
    Config,
    database::{DatabaseManager, DatabaseManagerImpl, migration::Migrator},
    error::AppError,
};
use clap::Subcommand;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Run all pending migrations
    Up,
    /// Rollback the last migration
    Down {
        #[arg(
            short,
            long,
            help = "Number of migrations to rollback",
            default_value = "1"
        )]
        steps: u32,
    },
    /// Show migration status
    Status,
}

pub async fn handle_migrate_command(action: MigrateAction, config: &Config) -> Result<(), AppError> {
    let db_manager = DatabaseManagerImpl::new_from_config(&config.database).await?;

    let result = run_migrate_action(action, &db_manager).await;

    if let Err(e) = db_manager.close().await {
        warn!("Failed to close database connection: {}", e);
    }
    result
}

async fn run_migrate_action(
    action: MigrateAction,
    db_manager: &DatabaseManagerImpl,
) -> Result<(), AppError> {
    let connection = db_manager.connection();
    let migration_error = |e: sea_orm::DbErr| {
        AppError::Database(crate::database::DatabaseError::Migration(e.to_string()))
    };

    match action {
        MigrateAction::Up => {
            info!("Running pending migrations...");
            Migrator::up(connection, None).await.map_err(migration_error)?;
            info!("All migrations completed successfully");
        }
        MigrateAction::Down { steps } => {
            info!("Rolling back {} migration(s)...", steps);
            Migrator::down(connection, Some(steps))
                .await
                .map_err(migration_error)?;
            info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            info!("Checking migration status...");
            Migrator::status(connection).await.map_err(migration_error)?;
            println!("Migration status check completed (see logs for details)");
        }
    }

    Ok(())
}
