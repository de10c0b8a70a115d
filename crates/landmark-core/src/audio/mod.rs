//! Audio decoding and resampling
//!
//! Decodes WAV, MP3, FLAC and OGG Vorbis files to mono PCM at a fixed
//! target sample rate using pure Rust decoders.

mod decoder;
mod resample;

pub use decoder::{load_signal, AudioSignal};
pub use resample::resample_to_target;

use std::path::Path;

use thiserror::Error;

/// Audio decode failure. Fatal to the ingestion job; never retried here.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read audio file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    #[error("MP3 decode error: {0}")]
    Mp3(#[from] minimp3::Error),

    #[error("FLAC decode error: {0}")]
    Flac(#[from] claxon::Error),

    #[error("OGG decode error: {0}")]
    Ogg(#[from] lewton::VorbisError),

    #[error("audio file decoded to an empty signal: {0}")]
    EmptySignal(String),
}

/// Supported audio container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") => AudioFormat::Ogg,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}
