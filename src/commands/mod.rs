//! CLI command definitions and dispatch.

pub mod document;
pub mod migrate;
pub mod version;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use quotever_core::config::AppConfig;
use quotever_core::error::AppError;
use quotever_database::DatabasePool;
use quotever_service::{DiffEngine, VersionManager};

/// quotever: quotation version control
#[derive(Debug, Parser)]
#[command(name = "quotever", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Live quotation state
    Document(document::DocumentArgs),
    /// Quotation versions
    Version(version::VersionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Document(args) => document::execute(args, config, self.format).await,
            Commands::Version(args) => version::execute(args, config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: wire a version manager over the PostgreSQL backends
pub async fn create_manager(config: &AppConfig) -> Result<VersionManager, AppError> {
    let pool = create_db_pool(config).await?;
    Ok(VersionManager::new(
        Arc::new(pool.version_store()),
        Arc::new(pool.document_store()),
        DiffEngine::from_config(&config.versioning),
    ))
}
