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
use std::path::PathBuf;

use crate::audio::AudioError;
use crate::config::ConfigError;
use crate::note::Note;

/// Error types for sampler operations.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("Invalid sampler config: {0}")]
    Config(#[from] ConfigError),

    #[error("No available buffers for note {0}")]
    NoBuffer(Note),

    #[error("Failed to load sample {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: AudioError,
    },

    #[error("Remote sample URLs are not supported: {0}")]
    RemoteUrl(String),

    #[error("Output buffer length {len} is not a multiple of {channels} channels")]
    BufferSize { len: usize, channels: u16 },
}
