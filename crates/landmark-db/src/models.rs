use serde::{Deserialize, Serialize};

/// A song row. Identity is immutable once created; the title is the
/// external dedupe key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub composer_id: String,
    pub performer_id: String,
    pub active: bool,
    pub created_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Input structure for creating a new song
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSong {
    pub song_id: String,
    pub title: String,
    pub composer_id: String,
    pub performer_id: String,
    pub active: bool,
    pub created_by: String,
}

impl NewSong {
    /// New song with placeholder composer/performer metadata
    pub fn with_defaults(song_id: String, title: String) -> Self {
        Self {
            song_id,
            title,
            composer_id: "UNKNOWN".to_string(),
            performer_id: "UNKNOWN".to_string(),
            active: true,
            created_by: "ingest".to_string(),
        }
    }
}

/// A persisted fingerprint row. Many-to-one with songs; the same hash
/// legitimately recurs across songs and offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub song_id: String,
    /// Anchor time within the song, in seconds
    pub offset_time: f64,
    /// 64-bit landmark hash, bit-cast for BIGINT storage
    pub hash: i64,
}

impl FingerprintRecord {
    pub fn new(song_id: &str, offset_time: f64, hash: u64) -> Self {
        Self {
            song_id: song_id.to_string(),
            offset_time,
            hash: hash as i64,
        }
    }
}
