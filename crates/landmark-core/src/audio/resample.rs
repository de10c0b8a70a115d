//! Audio resampling using linear interpolation

/// Resample audio to the target sample rate
pub fn resample_to_target(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = src_pos - src_idx as f64;

        if src_idx + 1 < samples.len() {
            let val = samples[src_idx] * (1.0 - frac as f32) + samples[src_idx + 1] * frac as f32;
            output.push(val);
        } else if src_idx < samples.len() {
            output.push(samples[src_idx]);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_to_target(&samples, 11_025, 11_025), samples);
    }

    #[test]
    fn downsample_halves_length() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 100.0).sin()).collect();
        let out = resample_to_target(&samples, 44_100, 22_050);
        assert!((out.len() as i64 - 500).abs() <= 1);
    }

    #[test]
    fn upsample_interpolates_between_samples() {
        let samples = vec![0.0, 1.0];
        let out = resample_to_target(&samples, 100, 200);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }
}
