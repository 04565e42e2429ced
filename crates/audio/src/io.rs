use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Reference clips shorter than this make for unreliable voiceprints.
pub const MIN_REFERENCE_SECS: f64 = 3.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
}

impl AudioInfo {
    pub fn is_short_reference(&self) -> bool {
        self.duration_secs < MIN_REFERENCE_SECS
    }
}

pub struct AudioProbe;

impl AudioProbe {
    /// Reads the container header; the stream is only decoded when the header
    /// does not carry a frame count.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<AudioInfo> {
        let path_ref = path.as_ref();
        let file =
            File::open(path_ref).with_context(|| format!("open audio file {:?}", path_ref))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| anyhow::anyhow!("no default track found"))?;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| anyhow::anyhow!("unknown sample rate in {:?}", path_ref))?;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(1);

        let n_frames = track.codec_params.n_frames;

        let frames = match n_frames {
            Some(frames) => frames,
            None => {
                debug!(path = ?path_ref, "header has no frame count, decoding");
                count_frames(&mut *format)?
            }
        };

        Ok(AudioInfo {
            sample_rate,
            channels,
            duration_secs: frames as f64 / sample_rate as f64,
        })
    }
}

fn count_frames(format: &mut dyn FormatReader) -> Result<u64> {
    let track = format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("no default track found"))?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())?;
    let mut frames = 0u64;

    loop {
        match format.next_packet() {
            Ok(packet) => {
                if packet.track_id() != track_id {
                    continue;
                }
                match decoder.decode(&packet) {
                    Ok(buffer) => frames += buffer.frames() as u64,
                    Err(symphonia::core::errors::Error::DecodeError(_)) => {
                        // skip undecodable packet
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(err) => {
                use symphonia::core::errors::Error as SymphError;
                match err {
                    SymphError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                        break;
                    }
                    _ => return Err(err.into()),
                }
            }
        }
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tone(path: &Path, sample_rate: u32, seconds: f32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let total = (sample_rate as f32 * seconds) as usize;
        for n in 0..total {
            let t = n as f32 / sample_rate as f32;
            let sample = (t * 440.0 * std::f32::consts::TAU).sin() * 0.3;
            writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn probe_handles_missing_file() {
        let result = AudioProbe::open("does-not-exist.wav");
        assert!(result.is_err());
    }

    #[test]
    fn probe_reports_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.wav");
        write_tone(&path, 16_000, 2.0);
        let info = AudioProbe::open(&path).unwrap();
        assert_eq!(info.sample_rate, 16_000);
        assert_eq!(info.channels, 1);
        assert!((info.duration_secs - 2.0).abs() < 0.01);
        assert!(info.is_short_reference());
    }

    #[test]
    fn probe_rejects_non_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.wav");
        std::fs::write(&path, b"definitely not riff data").unwrap();
        assert!(AudioProbe::open(&path).is_err());
    }
}
