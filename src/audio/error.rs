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

/// Error types for decoding and writing audio.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Unsupported audio in '{path}': {reason}")]
    Unsupported { path: String, reason: String },

    #[error("Audio file error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("WAV write error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Invalid channel count {0}")]
    InvalidChannels(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
