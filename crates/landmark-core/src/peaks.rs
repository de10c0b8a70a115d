//! Spectral peak detection using 2D max filtering
//!
//! A bin is a peak when it equals the maximum of its square neighborhood
//! and exceeds the amplitude floor.

use crate::spectrogram::Spectrogram;
use serde::{Deserialize, Serialize};

/// A prominent time-frequency point of the spectrogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Time in seconds
    pub time_s: f32,
    /// Frequency in Hz
    pub freq_hz: f32,
}

/// Peak detector over a square neighborhood with an amplitude floor
pub struct PeakDetector {
    neighborhood_size: usize,
    amplitude_floor_db: f32,
}

impl PeakDetector {
    pub fn new(neighborhood_size: usize, amplitude_floor_db: f32) -> Self {
        Self {
            neighborhood_size,
            amplitude_floor_db,
        }
    }

    /// Detect local maxima above the floor, in physical units.
    ///
    /// Returns peaks sorted ascending by time, ties broken by ascending
    /// frequency. An empty result is a valid outcome, not an error.
    pub fn detect(&self, spectrogram: &Spectrogram) -> Vec<Peak> {
        let half = self.neighborhood_size / 2;
        let num_frames = spectrogram.num_frames;
        let num_bins = spectrogram.num_bins;

        let mut peaks = Vec::new();

        for t in 0..num_frames {
            for f in 0..num_bins {
                let value = spectrogram.db[t][f];
                if value <= self.amplitude_floor_db {
                    continue;
                }
                if value >= self.neighborhood_max(spectrogram, t, f, half) {
                    peaks.push(Peak {
                        time_s: spectrogram.frame_time(t),
                        freq_hz: spectrogram.bin_frequency(f),
                    });
                }
            }
        }

        // Frame-major iteration already orders by time; the sort pins the
        // documented tie-break of equal-time peaks by ascending frequency
        peaks.sort_by(|a, b| {
            a.time_s
                .partial_cmp(&b.time_s)
                .unwrap()
                .then(a.freq_hz.partial_cmp(&b.freq_hz).unwrap())
        });

        peaks
    }

    /// Maximum over the neighborhood, padding out-of-range cells with 0 dB.
    ///
    /// The padding matters: dB values are non-positive, so a window that
    /// hangs over the matrix edge sees a 0 dB pad cell and suppresses the
    /// bin unless it sits at the reference peak itself.
    fn neighborhood_max(&self, spectrogram: &Spectrogram, t: usize, f: usize, half: usize) -> f32 {
        let t_start = t.saturating_sub(half);
        let t_end = (t + half + 1).min(spectrogram.num_frames);
        let f_start = f.saturating_sub(half);
        let f_end = (f + half + 1).min(spectrogram.num_bins);

        let clipped = t < half
            || f < half
            || t + half + 1 > spectrogram.num_frames
            || f + half + 1 > spectrogram.num_bins;

        let mut max_val = if clipped { 0.0 } else { f32::NEG_INFINITY };
        for ti in t_start..t_end {
            for fi in f_start..f_end {
                max_val = max_val.max(spectrogram.db[ti][fi]);
            }
        }
        max_val
    }
}
