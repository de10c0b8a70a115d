//! Landmark Ingest - song ingestion pipeline
//!
//! Orchestrates one ingestion job: dedupe by title, song identity
//! allocation, fingerprint extraction and two-strategy bulk persistence.

pub mod config;
pub mod job;
pub mod pipeline;

pub use config::{IngestConfig, PipelineConfig, PostgresConfig};
pub use job::{run_job, JobPayload, JobReport, JobStatus};
pub use pipeline::{ingest, IngestError, IngestOutcome, IngestStage};
