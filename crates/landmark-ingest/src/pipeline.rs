//! Ingestion pipeline
//!
//! Turns one audio file into a song row plus its fingerprint rows:
//! dedupe by title, allocate a song identity, extract fingerprints,
//! bulk-persist with a fast COPY path and a batched fallback.

use crate::config::IngestConfig;
use landmark_core::DecodeError;
use landmark_db::{
    find_song_by_title, insert_song, persist_fingerprints, DbPool, FingerprintRecord, NewSong,
    StoreError,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Pipeline stages, in order of progress. `Skipped` and `Failed` are
/// terminal; `Failed` is reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    NotStarted,
    TitleChecked,
    SongPersisted,
    FingerprintsPersisted,
    Done,
    Skipped,
    Failed,
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IngestStage::NotStarted => "not_started",
            IngestStage::TitleChecked => "title_checked",
            IngestStage::SongPersisted => "song_persisted",
            IngestStage::FingerprintsPersisted => "fingerprints_persisted",
            IngestStage::Done => "done",
            IngestStage::Skipped => "skipped",
            IngestStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of a successful ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new song was created and its fingerprints persisted
    Created { song_id: String, fingerprints: usize },
    /// A song with this title already existed; nothing was written
    Skipped { song_id: String },
}

impl IngestOutcome {
    pub fn song_id(&self) -> &str {
        match self {
            IngestOutcome::Created { song_id, .. } => song_id,
            IngestOutcome::Skipped { song_id } => song_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("audio decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("fingerprint extraction aborted: {0}")]
    Extraction(String),

    #[error("storage error: {0}")]
    Storage(StoreError),

    #[error("lost the creation race for title '{title}': a concurrent job inserted it first")]
    Conflict { title: String },

    #[error(
        "song {song_id} was created but only {persisted} of its fingerprints \
         were persisted: {source}"
    )]
    PartialPersist {
        song_id: String,
        persisted: u64,
        #[source]
        source: StoreError,
    },

    #[error("stage {stage} exceeded the configured timeout")]
    StageTimeout { stage: IngestStage },
}

/// Run one ingestion job end to end.
///
/// The caller owns the audio file's lifecycle; this function never leaks
/// intermediate state of its own. Retries are the queue's responsibility.
pub async fn ingest(
    pool: &DbPool,
    config: &IngestConfig,
    audio_path: &Path,
    original_filename: &str,
) -> Result<IngestOutcome, IngestError> {
    let timeout = Duration::from_secs(config.pipeline.stage_timeout_s);
    let title = derive_title(original_filename);

    // Fast-path dedupe check; the schema's unique constraint is the
    // authority when two jobs race past this
    let existing = stage(IngestStage::TitleChecked, timeout, find_song_by_title(pool, &title))
        .await?
        .map_err(IngestError::Storage)?;

    if let Some(song) = existing {
        log::info!("'{title}' already ingested as {}, skipping", song.song_id);
        return Ok(IngestOutcome::Skipped {
            song_id: song.song_id,
        });
    }

    let song_id = generate_song_id();
    let song = NewSong::with_defaults(song_id.clone(), title.clone());

    stage(IngestStage::SongPersisted, timeout, insert_song(pool, &song))
        .await?
        .map_err(|e| match e {
            StoreError::DuplicateTitle { title } => IngestError::Conflict { title },
            other => IngestError::Storage(other),
        })?;
    log::info!("created song {song_id} for '{title}'");

    let fingerprints =
        extract_stage(config.landmark.clone(), audio_path.to_path_buf(), timeout).await?;

    if fingerprints.is_empty() {
        // A song with zero fingerprints is a valid terminal success
        log::info!("no landmarks found for '{title}'");
        return Ok(IngestOutcome::Created {
            song_id,
            fingerprints: 0,
        });
    }

    let records: Vec<FingerprintRecord> = fingerprints
        .iter()
        .map(|fp| FingerprintRecord::new(&song_id, fp.anchor_time_s as f64, fp.hash))
        .collect();

    let persisted = stage(
        IngestStage::FingerprintsPersisted,
        timeout,
        persist_fingerprints(pool, &records, config.pipeline.batch_size),
    )
    .await?
    .map_err(|e| match e {
        StoreError::PartialPersist { persisted, source } => IngestError::PartialPersist {
            song_id: song_id.clone(),
            persisted,
            source: StoreError::Sql(source),
        },
        other => IngestError::Storage(other),
    })?;

    log::info!("persisted {persisted} fingerprints for {song_id}");
    Ok(IngestOutcome::Created {
        song_id,
        fingerprints: persisted as usize,
    })
}

/// Run fingerprint extraction on a blocking thread under the stage timeout.
///
/// Extraction happens between song and fingerprint persistence; a timeout
/// here is reported against `SongPersisted`, the last stage that completed.
async fn extract_stage(
    landmark_config: landmark_core::LandmarkConfig,
    path: PathBuf,
    timeout: Duration,
) -> Result<Vec<landmark_core::Fingerprint>, IngestError> {
    let extraction = tokio::task::spawn_blocking(move || {
        landmark_core::extract_fingerprints(&path, &landmark_config)
    });
    stage(IngestStage::SongPersisted, timeout, async {
        match extraction.await {
            Ok(result) => result.map_err(IngestError::from),
            Err(join_error) => Err(IngestError::Extraction(join_error.to_string())),
        }
    })
    .await?
}

/// Wrap a stage future with the configured timeout
async fn stage<T>(
    name: IngestStage,
    timeout: Duration,
    fut: impl Future<Output = T>,
) -> Result<T, IngestError> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| IngestError::StageTimeout { stage: name })
}

/// Song title: the original filename with its extension stripped
pub fn derive_title(original_filename: &str) -> String {
    Path::new(original_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original_filename)
        .to_string()
}

/// Allocate a song identity: date-stamped prefix plus a short random
/// suffix, globally unique by construction
pub fn generate_song_id() -> String {
    let date_part = chrono::Utc::now().format("%Y%m%d");
    let uuid_part = uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("SONG_{date_part}_{uuid_part}")
}
