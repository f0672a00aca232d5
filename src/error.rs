use crate::analytics::AnalyticsError;
use crate::database::DatabaseError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(config::ConfigError),
    Database(DatabaseError),
    Analytics(AnalyticsError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "Configuration error: {}", err),
            AppError::Database(err) => write!(f, "Database error: {}", err),
            AppError::Analytics(err) => write!(f, "Analytics error: {}", err),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Database(err) => Some(err),
            AppError::Analytics(err) => Some(err),
            AppError::Internal(_) => None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        AppError::Analytics(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let config_err = AppError::Config(config::ConfigError::NotFound("test".to_string()));
        assert!(config_err.to_string().contains("Configuration error"));

        let db_err = AppError::Database(DatabaseError::NotFound);
        assert_eq!(db_err.to_string(), "Database error: Record not found");

        let analytics_err = AppError::Analytics(AnalyticsError::Configuration {
            message: "window_hours must be positive".to_string(),
        });
        assert!(analytics_err.to_string().contains("window_hours must be positive"));

        let internal_err = AppError::Internal("test message".to_string());
        assert_eq!(internal_err.to_string(), "Internal error: test message");
    }

    #[test]
    fn test_app_error_conversions() {
        let app_err: AppError = config::ConfigError::NotFound("test".to_string()).into();
        assert!(matches!(app_err, AppError::Config(_)));

        let app_err: AppError = DatabaseError::Migration("boom".to_string()).into();
        assert!(matches!(app_err, AppError::Database(_)));

        let app_err: AppError = AnalyticsError::Configuration {
            message: "bad".to_string(),
        }
        .into();
        assert!(matches!(app_err, AppError::Analytics(_)));
    }
}
