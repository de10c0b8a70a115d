//! Pipeline tests against a live PostgreSQL instance.
//!
//! Run with: cargo test -p landmark-ingest -- --ignored

use landmark_db::count_fingerprints;
use landmark_ingest::{ingest, IngestConfig, IngestOutcome};
use std::f32::consts::PI;
use std::path::PathBuf;

/// Write a sine-tone WAV fixture and return its path
fn write_sine_wav(filename: &str, freq: f32, duration_s: f32) -> PathBuf {
    let sample_rate = 11_025u32;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let path = std::env::temp_dir().join(filename);
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..(duration_s * sample_rate as f32) as usize {
        let sample = (2.0 * PI * freq * i as f32 / sample_rate as f32).sin();
        writer.write_sample((sample * i16::MAX as f32 * 0.8) as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[tokio::test]
#[ignore] // Requires PostgreSQL to be running
async fn reingest_is_idempotent() {
    let config = IngestConfig::default();
    let pool = config.create_pool().unwrap();

    let unique = format!("idem-{}.wav", uuid_suffix());
    let path = write_sine_wav(&unique, 440.0, 5.0);

    let first = ingest(&pool, &config, &path, &unique).await.unwrap();
    let IngestOutcome::Created { song_id, .. } = &first else {
        panic!("first ingest should create, got {first:?}");
    };
    let count_after_first = count_fingerprints(&pool, song_id).await.unwrap();

    let second = ingest(&pool, &config, &path, &unique).await.unwrap();
    assert_eq!(
        second,
        IngestOutcome::Skipped {
            song_id: song_id.clone()
        }
    );

    // Fingerprint rows must not double on re-ingestion
    let count_after_second = count_fingerprints(&pool, song_id).await.unwrap();
    assert_eq!(count_after_first, count_after_second);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL to be running
async fn silent_file_creates_song_with_zero_fingerprints() {
    let config = IngestConfig::default();
    let pool = config.create_pool().unwrap();

    let unique = format!("silence-{}.wav", uuid_suffix());
    let path = write_sine_wav(&unique, 440.0, 0.01); // shorter than one window

    let outcome = ingest(&pool, &config, &path, &unique).await.unwrap();
    let IngestOutcome::Created {
        song_id,
        fingerprints,
    } = outcome
    else {
        panic!("expected creation");
    };
    assert_eq!(fingerprints, 0);
    assert_eq!(count_fingerprints(&pool, &song_id).await.unwrap(), 0);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL to be running
async fn concurrent_same_title_yields_one_song() {
    let config = IngestConfig::default();
    let pool = config.create_pool().unwrap();

    let unique = format!("race-{}.wav", uuid_suffix());
    let path = write_sine_wav(&unique, 523.0, 3.0);

    let (a, b) = tokio::join!(
        ingest(&pool, &config, &path, &unique),
        ingest(&pool, &config, &path, &unique),
    );

    // One call wins; the loser either saw the row in its dedupe check
    // (Skipped) or lost the insert race (Conflict). Never two creations.
    let created = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Ok(IngestOutcome::Created { .. })))
        .count();
    assert_eq!(created, 1);
}

fn uuid_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
