//! Landmark pairing and deterministic hashing
//!
//! Pairs each anchor peak with later peaks inside a bounded time/frequency
//! target zone and derives one 64-bit hash per pair. The hash is a pure
//! function of the quantized pair geometry so that independent workers
//! produce identical values for identical audio.

use crate::config::LandmarkConfig;
use crate::peaks::Peak;
use serde::{Deserialize, Serialize};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A single (hash, anchor time) record for one peak pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// 64-bit landmark hash
    pub hash: u64,
    /// Time of the anchor peak in seconds
    pub anchor_time_s: f32,
}

/// Landmark hasher over a time-sorted peak sequence
pub struct LandmarkHasher {
    zone_start_s: f32,
    zone_duration_s: f32,
    zone_freq_width_hz: f32,
}

impl LandmarkHasher {
    pub fn new(config: &LandmarkConfig) -> Self {
        Self {
            zone_start_s: config.zone_start_s,
            zone_duration_s: config.zone_duration_s,
            zone_freq_width_hz: config.zone_freq_width_hz,
        }
    }

    /// Generate fingerprints from peaks sorted ascending by time.
    ///
    /// Empty input yields empty output; there is no failure mode.
    pub fn generate(&self, peaks: &[Peak]) -> Vec<Fingerprint> {
        let mut fingerprints = Vec::new();

        for (i, anchor) in peaks.iter().enumerate() {
            let t_min = anchor.time_s + self.zone_start_s;
            let t_max = t_min + self.zone_duration_s;
            let f_min = anchor.freq_hz - self.zone_freq_width_hz;
            let f_max = anchor.freq_hz + self.zone_freq_width_hz;

            for candidate in &peaks[i + 1..] {
                // Peaks are time-sorted, so once a candidate falls past the
                // zone no later one can qualify. Correctness of this break
                // rests on the sort order, not on it being faster.
                if candidate.time_s > t_max {
                    break;
                }
                if candidate.time_s < t_min {
                    continue;
                }
                if candidate.freq_hz < f_min || candidate.freq_hz > f_max {
                    continue;
                }

                fingerprints.push(Fingerprint {
                    hash: landmark_hash(
                        anchor.freq_hz,
                        candidate.freq_hz,
                        candidate.time_s - anchor.time_s,
                    ),
                    anchor_time_s: anchor.time_s,
                });
            }
        }

        fingerprints
    }
}

/// Deterministic hash of a peak pair.
///
/// Frequencies are quantized to the nearest Hz and the time delta to the
/// nearest millisecond before hashing, absorbing float noise, then the
/// three fields are combined with FNV-1a over their little-endian bytes.
/// Stable across processes, runs and architectures.
pub fn landmark_hash(anchor_freq_hz: f32, candidate_freq_hz: f32, time_delta_s: f32) -> u64 {
    let anchor_freq = anchor_freq_hz.round().max(0.0) as u32;
    let candidate_freq = candidate_freq_hz.round().max(0.0) as u32;
    let delta_ms = (time_delta_s * 1000.0).round().max(0.0) as u32;

    let mut hash = FNV_OFFSET_BASIS;
    for field in [anchor_freq, candidate_freq, delta_ms] {
        for byte in field.to_le_bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}
