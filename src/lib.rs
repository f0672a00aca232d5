pub mod analytics;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod jobs;
pub mod shutdown;
pub mod test_utils;

pub use config::Config;
