//! Configuration parameters for the landmark extraction algorithm

use serde::{Deserialize, Serialize};

/// Algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    // Audio processing
    pub sample_rate: u32,

    // Short-time transform
    pub fft_size: usize,
    pub hop_size: usize,

    // Peak detection
    pub neighborhood_size: usize,
    pub amplitude_floor_db: f32,

    // Target zone for peak pairing
    pub zone_start_s: f32,
    pub zone_duration_s: f32,
    pub zone_freq_width_hz: f32,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            sample_rate: 11_025,

            fft_size: 2048,
            hop_size: 512,

            // 15x15 bin footprint, floor relative to the signal's own peak
            neighborhood_size: 15,
            amplitude_floor_db: -50.0,

            // Candidates between 0.1s and 0.9s after the anchor,
            // within +-200Hz of the anchor frequency
            zone_start_s: 0.1,
            zone_duration_s: 0.8,
            zone_freq_width_hz: 200.0,
        }
    }
}

impl LandmarkConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sample_rate == 0 {
            anyhow::bail!("sample_rate must be > 0");
        }
        if self.fft_size == 0 || self.hop_size == 0 {
            anyhow::bail!("fft_size and hop_size must be > 0");
        }
        if self.hop_size > self.fft_size {
            anyhow::bail!("hop_size must be <= fft_size");
        }
        if self.neighborhood_size % 2 == 0 {
            anyhow::bail!("neighborhood_size must be odd");
        }
        if self.zone_duration_s <= 0.0 {
            anyhow::bail!("zone_duration_s must be > 0");
        }
        Ok(())
    }
}
