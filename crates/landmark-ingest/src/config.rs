//! Runtime configuration for the ingestion pipeline
//!
//! TOML-based configuration covering the landmark algorithm parameters,
//! the PostgreSQL connection and the pipeline tunables.

use landmark_core::LandmarkConfig;
use landmark_db::DbPool;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub landmark: LandmarkConfig,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostgresConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Upper bound on pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    5432
}
fn default_database() -> String {
    "landmark".to_string()
}
fn default_user() -> String {
    "landmark_user".to_string()
}
fn default_password() -> String {
    "landmark_pass".to_string()
}
fn default_max_connections() -> u32 {
    10
}

/// Pipeline tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Records per fallback batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Per-stage timeout; expiry fails the job and leaves redelivery to
    /// the queue
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_s: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            stage_timeout_s: default_stage_timeout(),
        }
    }
}

fn default_batch_size() -> usize {
    landmark_db::DEFAULT_BATCH_SIZE
}
fn default_stage_timeout() -> u64 {
    300
}

impl IngestConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: IngestConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.landmark.validate()?;
        Ok(config)
    }

    /// Connection string for logging and diagnostics
    pub fn connection_string(&self) -> String {
        let pg = &self.postgres;
        format!(
            "postgresql://{}@{}:{}/{}",
            pg.user, pg.host, pg.port, pg.database
        )
    }

    /// Create a connection pool from the configured parameters
    pub fn create_pool(&self) -> Result<DbPool, landmark_db::StoreError> {
        let pg = &self.postgres;
        landmark_db::create_pool(
            &pg.host,
            pg.port,
            &pg.database,
            &pg.user,
            &pg.password,
            pg.max_connections,
        )
    }
}
