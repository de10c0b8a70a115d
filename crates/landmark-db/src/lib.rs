//! Landmark Database Layer
//!
//! PostgreSQL integration for song and fingerprint storage. The schema
//! lives in `schema.sql`; the title uniqueness constraint there is the
//! authority behind the pipeline's dedupe check.

pub mod connection;
pub mod models;
pub mod operations;

pub use connection::{create_pool, test_connection, DbPool};
pub use models::{FingerprintRecord, NewSong, Song};
pub use operations::{
    batch_insert_fingerprints, copy_fingerprints, count_fingerprints, find_song_by_title,
    insert_song, persist_fingerprints, StoreError, DEFAULT_BATCH_SIZE,
};
