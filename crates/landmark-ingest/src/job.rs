//! Queue-facing job types
//!
//! The queue worker resolves the audio source, owns temporary-file
//! lifecycle and redelivery; this module gives it the payload shape it
//! consumes and a report it can hand back to its transport.

use crate::config::IngestConfig;
use crate::pipeline::{ingest, IngestError, IngestOutcome};
use landmark_db::DbPool;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Message produced by the upload boundary, delivered at-least-once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPayload {
    pub file_url: String,
    pub original_filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    Skipped,
    Failed,
}

/// Result record reported back to the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprints: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobReport {
    pub fn from_result(result: &Result<IngestOutcome, IngestError>) -> Self {
        match result {
            Ok(IngestOutcome::Created {
                song_id,
                fingerprints,
            }) => Self {
                status: JobStatus::Success,
                song_id: Some(song_id.clone()),
                fingerprints: Some(*fingerprints),
                error: None,
            },
            Ok(IngestOutcome::Skipped { song_id }) => Self {
                status: JobStatus::Skipped,
                song_id: Some(song_id.clone()),
                fingerprints: None,
                error: None,
            },
            Err(error) => Self {
                status: JobStatus::Failed,
                // Partial persistence keeps the song id visible so
                // operators know reconciliation may be needed
                song_id: match error {
                    IngestError::PartialPersist { song_id, .. } => Some(song_id.clone()),
                    _ => None,
                },
                fingerprints: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Execute one ingestion job against a locally resolved audio file and
/// always produce a report
pub async fn run_job(
    pool: &DbPool,
    config: &IngestConfig,
    local_path: &Path,
    original_filename: &str,
) -> JobReport {
    let result = ingest(pool, config, local_path, original_filename).await;

    if let Err(ref error) = result {
        log::error!("job for '{original_filename}' failed: {error}");
    }

    JobReport::from_result(&result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_json() {
        let json = r#"{"file_url":"https://cdn/x.mp3","original_filename":"x.mp3"}"#;
        let payload: JobPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.original_filename, "x.mp3");
        let back = serde_json::to_string(&payload).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn created_outcome_maps_to_success() {
        let result = Ok(IngestOutcome::Created {
            song_id: "SONG_20250101_AAAA1111".into(),
            fingerprints: 42,
        });
        let report = JobReport::from_result(&result);
        assert_eq!(report.status, JobStatus::Success);
        assert_eq!(report.song_id.as_deref(), Some("SONG_20250101_AAAA1111"));
        assert_eq!(report.fingerprints, Some(42));
        assert!(report.error.is_none());
    }

    #[test]
    fn skipped_outcome_maps_to_skipped() {
        let result = Ok(IngestOutcome::Skipped {
            song_id: "SONG_20250101_BBBB2222".into(),
        });
        let report = JobReport::from_result(&result);
        assert_eq!(report.status, JobStatus::Skipped);
        assert_eq!(report.song_id.as_deref(), Some("SONG_20250101_BBBB2222"));
    }

    #[test]
    fn failure_carries_error_text() {
        let result = Err(IngestError::Extraction("worker died".into()));
        let report = JobReport::from_result(&result);
        assert_eq!(report.status, JobStatus::Failed);
        assert!(report.song_id.is_none());
        assert!(report.error.unwrap().contains("worker died"));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Skipped).unwrap(),
            "\"skipped\""
        );
    }
}
