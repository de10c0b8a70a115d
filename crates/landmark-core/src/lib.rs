//! Landmark Core - spectral landmark fingerprint extraction
//!
//! Decodes an audio file to mono PCM at a fixed rate, computes a dB-scale
//! spectrogram, detects local-maximum peaks and hashes peak pairs into
//! (hash, anchor time) fingerprints.

pub mod audio;
pub mod config;
pub mod landmark;
pub mod peaks;
pub mod spectrogram;

pub use audio::{load_signal, AudioSignal, DecodeError};
pub use config::LandmarkConfig;
pub use landmark::{landmark_hash, Fingerprint, LandmarkHasher};
pub use peaks::{Peak, PeakDetector};
pub use spectrogram::{compute_spectrogram, Spectrogram};

use std::path::Path;

/// Extract fingerprints from a decoded signal
pub fn fingerprint_signal(signal: &AudioSignal, config: &LandmarkConfig) -> Vec<Fingerprint> {
    let spectrogram = compute_spectrogram(signal, config);

    let peaks = PeakDetector::new(config.neighborhood_size, config.amplitude_floor_db)
        .detect(&spectrogram);

    LandmarkHasher::new(config).generate(&peaks)
}

/// Extract fingerprints from an audio file
pub fn extract_fingerprints(
    audio_path: &Path,
    config: &LandmarkConfig,
) -> Result<Vec<Fingerprint>, DecodeError> {
    let signal = load_signal(audio_path, config.sample_rate)?;
    Ok(fingerprint_signal(&signal, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_signal(freq: f32, duration_s: f32, sample_rate: u32) -> AudioSignal {
        let n = (duration_s * sample_rate as f32) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioSignal {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn sine_fingerprints_are_reproducible() {
        let config = LandmarkConfig::default();
        let signal = sine_signal(440.0, 5.0, config.sample_rate);

        let first = fingerprint_signal(&signal, &config);
        let second = fingerprint_signal(&signal, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn anchor_times_lie_within_signal_duration() {
        let config = LandmarkConfig::default();
        let signal = sine_signal(440.0, 5.0, config.sample_rate);
        let duration = signal.duration_s();

        for fp in fingerprint_signal(&signal, &config) {
            assert!(fp.anchor_time_s >= 0.0);
            assert!(fp.anchor_time_s < duration);
        }
    }

    #[test]
    fn silence_yields_no_fingerprints() {
        let config = LandmarkConfig::default();
        let signal = AudioSignal {
            samples: vec![0.0; 5 * config.sample_rate as usize],
            sample_rate: config.sample_rate,
        };
        assert!(fingerprint_signal(&signal, &config).is_empty());
    }

    #[test]
    fn very_short_signal_yields_no_fingerprints() {
        let config = LandmarkConfig::default();
        let signal = sine_signal(440.0, 0.01, config.sample_rate);
        assert!(fingerprint_signal(&signal, &config).is_empty());
    }
}
