//! Persistence for daily records, notes and bot settings
//!
//! SQLite holds everything; see [`repository`] for the trait and backends.

pub mod repository;

use anyhow::Result;
use std::sync::Arc;

use crate::config::StorageConfig;

pub use repository::{
    create_mock_repository, create_sqlite_repository, MockReportRepository, ReportRepository,
    SharedReportRepository, SqliteReportRepository,
};

/// Path value selecting a throwaway in-memory database
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Open the repository described by the storage configuration
pub fn open_repository(config: &StorageConfig) -> Result<SharedReportRepository> {
    if config.sqlite_path.as_os_str() == IN_MEMORY_PATH {
        tracing::warn!("Using in-memory SQLite; data is lost on exit");
        return Ok(Arc::new(SqliteReportRepository::in_memory()?));
    }
    create_sqlite_repository(&config.sqlite_path)
}
