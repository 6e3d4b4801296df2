mod file_config;

pub use file_config::FileConfig;

use crate::catalog::DEFAULT_READ_POOL_SIZE;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub read_pool_size: Option<usize>,
    pub search_deadline_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub read_pool_size: usize,
    pub search_deadline: Option<Duration>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db or in config file")
            })?;
        if db_path.is_dir() {
            bail!(
                "db_path is a directory, expected a database file: {:?}",
                db_path
            );
        }

        let read_pool_size = file
            .read_pool_size
            .or(cli.read_pool_size)
            .unwrap_or(DEFAULT_READ_POOL_SIZE)
            .max(1);

        let search_deadline = file
            .search_deadline_ms
            .or(cli.search_deadline_ms)
            .map(Duration::from_millis);

        Ok(Self {
            db_path,
            read_pool_size,
            search_deadline,
        })
    }
}
