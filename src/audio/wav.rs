// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use super::error::AudioError;

/// Writes interleaved f32 samples to a 32-bit float WAV file.
pub fn write_wav(
    path: &Path,
    samples: &[f32],
    channel_count: u16,
    sample_rate: u32,
) -> Result<(), AudioError> {
    if channel_count == 0 {
        return Err(AudioError::InvalidChannels(channel_count));
    }

    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: channel_count,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    )?;

    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    info!(
        path = ?path,
        channels = channel_count,
        sample_rate,
        frames = samples.len() / channel_count as usize,
        "Wrote WAV file"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode_file;

    #[test]
    fn test_write_then_decode() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.wav");
        let samples = vec![0.0f32, 0.5, -0.5, 0.25, 1.0, -1.0];

        write_wav(&path, &samples, 2, 48000)?;

        let decoded = decode_file(&path)?;
        assert_eq!(decoded.channel_count, 2);
        assert_eq!(decoded.sample_rate, 48000);
        assert_eq!(decoded.samples, samples);
        Ok(())
    }

    #[test]
    fn test_zero_channels_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_wav(&dir.path().join("bad.wav"), &[0.0], 0, 48000);
        assert!(matches!(result, Err(AudioError::InvalidChannels(0))));
    }
}
