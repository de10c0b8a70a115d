//! Short-time magnitude spectrogram in decibel scale
//!
//! Fixed analysis window and hop length; amplitude is expressed relative to
//! the signal's own peak magnitude so absolute loudness is normalized away.

use crate::audio::AudioSignal;
use crate::config::LandmarkConfig;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// Magnitudes below this are clamped before the log
const AMPLITUDE_EPSILON: f32 = 1e-10;

/// Dynamic range kept below the reference peak, in dB
const TOP_DB: f32 = 80.0;

/// Spectrogram representation
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Decibel values [time_frame][frequency_bin], 0 dB at the signal peak
    pub db: Vec<Vec<f32>>,
    /// Number of time frames
    pub num_frames: usize,
    /// Number of frequency bins (fft_size / 2 + 1)
    pub num_bins: usize,

    sample_rate: u32,
    fft_size: usize,
    hop_size: usize,
}

impl Spectrogram {
    /// Center frequency of a bin in Hz
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.fft_size as f32
    }

    /// Time of a frame in seconds, at the analysis window center
    pub fn frame_time(&self, frame: usize) -> f32 {
        (frame * self.hop_size + self.fft_size / 2) as f32 / self.sample_rate as f32
    }

    /// Build a spectrogram from a raw dB matrix [frame][bin]
    #[cfg(test)]
    pub(crate) fn from_db_matrix(db: Vec<Vec<f32>>, config: &crate::config::LandmarkConfig) -> Self {
        let num_frames = db.len();
        let num_bins = db.first().map_or(0, Vec::len);
        Self {
            db,
            num_frames,
            num_bins,
            sample_rate: config.sample_rate,
            fft_size: config.fft_size,
            hop_size: config.hop_size,
        }
    }
}

/// Compute the short-time magnitude spectrogram of a signal
pub fn compute_spectrogram(signal: &AudioSignal, config: &LandmarkConfig) -> Spectrogram {
    let fft_size = config.fft_size;
    let hop_size = config.hop_size;
    let num_bins = fft_size / 2 + 1;

    // Signals shorter than one window yield zero frames, which is a valid
    // silent-ingestion outcome for every downstream stage
    let num_frames = if signal.samples.len() < fft_size {
        0
    } else {
        1 + (signal.samples.len() - fft_size) / hop_size
    };

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    let window = create_hann_window(fft_size);

    let mut magnitudes = Vec::with_capacity(num_frames);
    let mut peak_magnitude = 0.0f32;

    for frame_idx in 0..num_frames {
        let start = frame_idx * hop_size;

        let mut frame: Vec<Complex<f32>> = signal.samples[start..start + fft_size]
            .iter()
            .enumerate()
            .map(|(i, &s)| Complex::new(s * window[i], 0.0))
            .collect();

        fft.process(&mut frame);

        let row: Vec<f32> = frame[..num_bins].iter().map(|c| c.norm()).collect();
        for &m in &row {
            peak_magnitude = peak_magnitude.max(m);
        }
        magnitudes.push(row);
    }

    // Convert to dB relative to the peak magnitude, clamped to -TOP_DB.
    // Digital silence has no peak to normalize against; pinning it to the
    // bottom of the range keeps the peak detector from seeing a 0 dB plateau
    let silent = peak_magnitude <= AMPLITUDE_EPSILON;
    let reference = peak_magnitude.max(AMPLITUDE_EPSILON);
    let db = magnitudes
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|m| {
                    if silent {
                        return -TOP_DB;
                    }
                    let value = 20.0 * (m.max(AMPLITUDE_EPSILON) / reference).log10();
                    value.max(-TOP_DB)
                })
                .collect()
        })
        .collect();

    Spectrogram {
        db,
        num_frames,
        num_bins,
        sample_rate: signal.sample_rate,
        fft_size,
        hop_size,
    }
}

/// Create Hann window
fn create_hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let x = i as f32 / (size - 1) as f32;
            0.5 * (1.0 - (2.0 * PI * x).cos())
        })
        .collect()
}
