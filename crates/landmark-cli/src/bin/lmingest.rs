//! lmingest - ingest audio files into the fingerprint index
//!
//! Usage: lmingest <file-or-directory>... [--config <toml>]

use anyhow::{Context, Result};
use clap::Parser;
use landmark_core::audio::AudioFormat;
use landmark_ingest::{run_job, IngestConfig, JobStatus};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "lmingest")]
#[command(about = "Ingest audio files into the landmark fingerprint index", long_about = None)]
struct Args {
    /// Audio files or directories of audio files to ingest
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the fallback batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Default: no logs (clean JSON output for parsing)
    // Verbose: show Info level logs for debugging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    let mut config = match &args.config {
        Some(path) => IngestConfig::load(path)?,
        None => IngestConfig::default(),
    };
    if let Some(batch_size) = args.batch_size {
        config.pipeline.batch_size = batch_size;
    }
    config.landmark.validate()?;

    let files = collect_audio_files(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("no supported audio files found in the given inputs");
    }

    log::info!(
        "ingesting {} file(s) into {}",
        files.len(),
        config.connection_string()
    );
    let pool = config.create_pool()?;

    let mut any_failed = false;
    for path in &files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("invalid filename: {}", path.display()))?;

        let report = run_job(&pool, &config, path, filename).await;
        if report.status == JobStatus::Failed {
            any_failed = true;
        }

        let mut result = serde_json::json!({
            "input_file": path.display().to_string(),
            "status": report.status,
        });
        if let Some(song_id) = &report.song_id {
            result["song_id"] = song_id.clone().into();
        }
        if let Some(count) = report.fingerprints {
            result["num_fingerprints"] = count.into();
        }
        if let Some(error) = &report.error {
            result["error"] = error.clone().into();
        }
        println!("{}", serde_json::to_string(&result)?);
    }

    if any_failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Expand files and directories into the list of supported audio files
fn collect_audio_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(input)
                .with_context(|| format!("failed to read directory: {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && AudioFormat::from_path(p).is_supported())
                .collect();
            entries.sort();
            files.extend(entries);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            anyhow::bail!("input not found: {}", input.display());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_is_kept_even_with_odd_extension() {
        let dir = std::env::temp_dir().join("lmingest-test-explicit");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("noisy.bin");
        std::fs::write(&file, b"x").unwrap();

        let files = collect_audio_files(&[file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn directory_scan_filters_unsupported_extensions() {
        let dir = std::env::temp_dir().join("lmingest-test-scan");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.mp3"), b"x").unwrap();
        std::fs::write(dir.join("b.wav"), b"x").unwrap();
        std::fs::write(dir.join("notes.txt"), b"x").unwrap();

        let files = collect_audio_files(&[dir.clone()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.wav"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(collect_audio_files(&[PathBuf::from("/definitely/missing.mp3")]).is_err());
    }
}
