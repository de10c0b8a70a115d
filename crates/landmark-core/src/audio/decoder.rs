//! Audio decoding for multiple formats

use super::{resample_to_target, AudioFormat, DecodeError};
use std::path::Path;

/// A mono PCM signal at a single fixed sample rate.
///
/// Owned exclusively by one extraction run and discarded after the
/// spectrogram is computed.
#[derive(Debug, Clone)]
pub struct AudioSignal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSignal {
    pub fn duration_s(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Raw decoder output before downmix and resampling
struct RawAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl RawAudio {
    /// Convert interleaved samples to mono by averaging channels
    fn to_mono(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }

        let mut mono = Vec::with_capacity(self.samples.len() / self.channels as usize);
        for chunk in self.samples.chunks(self.channels as usize) {
            let avg: f32 = chunk.iter().sum::<f32>() / chunk.len() as f32;
            mono.push(avg);
        }
        mono
    }
}

/// Decode an audio file to mono PCM at the target sample rate
pub fn load_signal(path: &Path, target_sample_rate: u32) -> Result<AudioSignal, DecodeError> {
    let raw = match AudioFormat::from_path(path) {
        AudioFormat::Wav => decode_wav(path)?,
        AudioFormat::Mp3 => decode_mp3(path)?,
        AudioFormat::Flac => decode_flac(path)?,
        AudioFormat::Ogg => decode_ogg(path)?,
        AudioFormat::Unknown => {
            return Err(DecodeError::UnsupportedFormat(path.display().to_string()));
        }
    };

    if raw.samples.is_empty() || raw.sample_rate == 0 {
        return Err(DecodeError::EmptySignal(path.display().to_string()));
    }

    let mono = raw.to_mono();
    let samples = if raw.sample_rate != target_sample_rate {
        resample_to_target(&mono, raw.sample_rate, target_sample_rate)
    } else {
        mono
    };

    log::debug!(
        "decoded {}: {} samples @ {}Hz",
        path.display(),
        samples.len(),
        target_sample_rate
    );

    Ok(AudioSignal {
        samples,
        sample_rate: target_sample_rate,
    })
}

/// Decode WAV file
fn decode_wav(path: &Path) -> Result<RawAudio, DecodeError> {
    let mut reader = hound::WavReader::open(path)?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(RawAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Decode MP3 file
fn decode_mp3(path: &Path) -> Result<RawAudio, DecodeError> {
    let data = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut decoder = minimp3::Decoder::new(&data[..]);
    let mut samples = Vec::new();
    let mut sample_rate = 0;
    let mut channels = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                    channels = frame.channels as u16;
                }
                for &sample in &frame.data {
                    samples.push(sample as f32 / 32768.0);
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode FLAC file
fn decode_flac(path: &Path) -> Result<RawAudio, DecodeError> {
    let mut reader = claxon::FlacReader::open(path)?;

    let info = reader.streaminfo();
    let sample_rate = info.sample_rate;
    let channels = info.channels as u16;

    let max_val = (1i64 << (info.bits_per_sample - 1)) as f32;
    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / max_val))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode OGG Vorbis file
fn decode_ogg(path: &Path) -> Result<RawAudio, DecodeError> {
    let file = std::fs::File::open(path).map_err(|source| DecodeError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut reader = lewton::inside_ogg::OggStreamReader::new(file)?;

    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u16;

    let mut samples = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl()? {
        for &sample in &packet {
            samples.push(sample as f32 / 32768.0);
        }
    }

    Ok(RawAudio {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channels() {
        let raw = RawAudio {
            samples: vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0],
            sample_rate: 11_025,
            channels: 2,
        };
        let mono = raw.to_mono();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn mono_passthrough() {
        let raw = RawAudio {
            samples: vec![0.1, 0.2, 0.3],
            sample_rate: 11_025,
            channels: 1,
        };
        assert_eq!(raw.to_mono(), raw.samples);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = load_signal(Path::new("/tmp/does-not-exist.xyz"), 11_025).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    }

    #[test]
    fn duration_from_samples() {
        let signal = AudioSignal {
            samples: vec![0.0; 22_050],
            sample_rate: 11_025,
        };
        assert!((signal.duration_s() - 2.0).abs() < 1e-6);
    }
}
