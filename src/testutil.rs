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
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::sampler::LoadedSample;

/// Writes 16-bit integer frames to a WAV file. Each frame holds one sample per channel.
pub fn write_wav_i16<const N: usize>(
    path: &Path,
    frames: &[[i16; N]],
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: N as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
    )?;

    for frame in frames {
        for sample in frame {
            writer.write_sample(*sample)?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Creates an in-memory mono sample of constant amplitude.
pub fn constant_sample(value: f32, frames: usize, sample_rate: u32) -> LoadedSample {
    LoadedSample::new(Arc::new(vec![value; frames]), 1, sample_rate)
}

/// Creates an in-memory stereo sample. Frame `i` is `i + 1` on the left and
/// `-(i + 1)` on the right.
pub fn stereo_sample(frames: usize, sample_rate: u32) -> LoadedSample {
    LoadedSample::new(
        Arc::new(
            (0..frames)
                .flat_map(|i| [(i + 1) as f32, -((i + 1) as f32)])
                .collect(),
        ),
        2,
        sample_rate,
    )
}

/// Creates an in-memory mono sample whose value is its frame index.
pub fn ramp_sample(frames: usize, sample_rate: u32) -> LoadedSample {
    LoadedSample::new(
        Arc::new((0..frames).map(|i| i as f32).collect()),
        1,
        sample_rate,
    )
}
