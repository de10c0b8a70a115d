//! Song and fingerprint persistence operations
//!
//! Fingerprint persistence runs a two-strategy protocol: a single binary
//! COPY as the fast path, falling back to fixed-size batches that are each
//! committed independently.

use deadpool_postgres::Pool;
use thiserror::Error;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::Type;

use crate::models::{FingerprintRecord, NewSong, Song};

/// Default number of records per fallback batch
pub const DEFAULT_BATCH_SIZE: usize = 5000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("a song titled '{title}' already exists")]
    DuplicateTitle { title: String },

    #[error("database error: {0}")]
    Sql(#[from] tokio_postgres::Error),

    #[error("bulk copy failed: {0}")]
    CopyFailed(#[source] tokio_postgres::Error),

    #[error("batch insert failed after {persisted} fingerprints were committed: {source}")]
    PartialPersist {
        persisted: u64,
        #[source]
        source: tokio_postgres::Error,
    },
}

fn song_from_row(row: &tokio_postgres::Row) -> Song {
    Song {
        song_id: row.get(0),
        title: row.get(1),
        composer_id: row.get(2),
        performer_id: row.get(3),
        active: row.get(4),
        created_by: row.get(5),
        created_at: row.get(6),
        updated_at: row.get(7),
    }
}

/// Look up a song by exact title
pub async fn find_song_by_title(pool: &Pool, title: &str) -> Result<Option<Song>, StoreError> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            "SELECT song_id, title, composer_id, performer_id, active, created_by,
                    created_at, updated_at
             FROM songs
             WHERE title = $1",
            &[&title],
        )
        .await?;

    Ok(row.as_ref().map(song_from_row))
}

/// Insert a song row as its own durable unit.
///
/// The title uniqueness constraint is the real dedupe authority; losing the
/// check-then-insert race surfaces as `DuplicateTitle`.
pub async fn insert_song(pool: &Pool, song: &NewSong) -> Result<(), StoreError> {
    let client = pool.get().await?;

    client
        .execute(
            "INSERT INTO songs
             (song_id, title, composer_id, performer_id, active, created_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())",
            &[
                &song.song_id,
                &song.title,
                &song.composer_id,
                &song.performer_id,
                &song.active,
                &song.created_by,
            ],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                StoreError::DuplicateTitle {
                    title: song.title.clone(),
                }
            } else {
                StoreError::Sql(e)
            }
        })?;

    Ok(())
}

/// Fast path: stream all records through one binary COPY
pub async fn copy_fingerprints(
    pool: &Pool,
    records: &[FingerprintRecord],
) -> Result<u64, StoreError> {
    if records.is_empty() {
        return Ok(0);
    }

    let client = pool.get().await?;

    let sink = client
        .copy_in("COPY fingerprints (song_id, offset_time, hash) FROM STDIN BINARY")
        .await
        .map_err(StoreError::CopyFailed)?;

    let writer = BinaryCopyInWriter::new(sink, &[Type::VARCHAR, Type::FLOAT8, Type::INT8]);
    tokio::pin!(writer);

    for record in records {
        writer
            .as_mut()
            .write(&[&record.song_id, &record.offset_time, &record.hash])
            .await
            .map_err(StoreError::CopyFailed)?;
    }

    let rows = writer.finish().await.map_err(StoreError::CopyFailed)?;
    Ok(rows)
}

/// Fallback path: insert in fixed-size batches, each committed on its own.
///
/// A failure partway leaves the earlier batches durable; the error reports
/// how many records were already committed.
pub async fn batch_insert_fingerprints(
    pool: &Pool,
    records: &[FingerprintRecord],
    batch_size: usize,
) -> Result<u64, StoreError> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut client = pool.get().await?;
    let mut persisted: u64 = 0;
    let total_batches = records.len().div_ceil(batch_size);

    for (batch_idx, batch) in records.chunks(batch_size).enumerate() {
        log::debug!(
            "inserting batch {}/{} ({} records)",
            batch_idx + 1,
            total_batches,
            batch.len()
        );

        let result: Result<(), tokio_postgres::Error> = async {
            let tx = client.transaction().await?;
            let statement = tx
                .prepare("INSERT INTO fingerprints (song_id, offset_time, hash) VALUES ($1, $2, $3)")
                .await?;
            for record in batch {
                tx.execute(&statement, &[&record.song_id, &record.offset_time, &record.hash])
                    .await?;
            }
            tx.commit().await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => persisted += batch.len() as u64,
            Err(source) => return Err(StoreError::PartialPersist { persisted, source }),
        }
    }

    Ok(persisted)
}

/// Two-strategy bulk persistence: COPY first, batches on COPY failure.
///
/// Both strategies produce the same final rows; only the fallback failing
/// is fatal.
pub async fn persist_fingerprints(
    pool: &Pool,
    records: &[FingerprintRecord],
    batch_size: usize,
) -> Result<u64, StoreError> {
    match copy_fingerprints(pool, records).await {
        Ok(rows) => Ok(rows),
        Err(copy_error) => {
            log::warn!("bulk copy failed ({copy_error}), falling back to batch insert");
            batch_insert_fingerprints(pool, records, batch_size).await
        }
    }
}

/// Count persisted fingerprints for a song
pub async fn count_fingerprints(pool: &Pool, song_id: &str) -> Result<i64, StoreError> {
    let client = pool.get().await?;

    let row = client
        .query_one(
            "SELECT COUNT(*) FROM fingerprints WHERE song_id = $1",
            &[&song_id],
        )
        .await?;

    Ok(row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_pool;
    use uuid::Uuid;

    fn test_pool() -> Pool {
        create_pool("localhost", 5432, "landmark", "landmark_user", "landmark_pass", 10).unwrap()
    }

    fn sample_records(song_id: &str, count: usize) -> Vec<FingerprintRecord> {
        (0..count)
            .map(|i| FingerprintRecord::new(song_id, i as f64 * 0.1, 0x1000 + i as u64))
            .collect()
    }

    async fn insert_test_song(pool: &Pool, title: &str) -> String {
        let song_id = format!("SONG_TEST_{}", Uuid::new_v4().simple());
        insert_song(pool, &NewSong::with_defaults(song_id.clone(), title.into()))
            .await
            .unwrap();
        song_id
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL to be running
    async fn duplicate_title_surfaces_distinct_error() {
        let pool = test_pool();
        let title = format!("dup-{}", Uuid::new_v4());
        insert_test_song(&pool, &title).await;

        let err = insert_song(
            &pool,
            &NewSong::with_defaults("SONG_TEST_OTHER".into(), title.clone()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTitle { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL to be running
    async fn copy_and_batch_paths_persist_same_rows() {
        let pool = test_pool();

        let copy_song = insert_test_song(&pool, &format!("copy-{}", Uuid::new_v4())).await;
        let batch_song = insert_test_song(&pool, &format!("batch-{}", Uuid::new_v4())).await;

        let copied = copy_fingerprints(&pool, &sample_records(&copy_song, 12_345))
            .await
            .unwrap();
        let batched = batch_insert_fingerprints(&pool, &sample_records(&batch_song, 12_345), 5000)
            .await
            .unwrap();

        assert_eq!(copied, batched);
        assert_eq!(
            count_fingerprints(&pool, &copy_song).await.unwrap(),
            count_fingerprints(&pool, &batch_song).await.unwrap()
        );
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL to be running
    async fn empty_record_set_is_a_noop() {
        let pool = test_pool();
        assert_eq!(persist_fingerprints(&pool, &[], 5000).await.unwrap(), 0);
    }
}
