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

//! Note-triggered sample playback.
//!
//! This module provides:
//! - The drum kit factory and a general note-to-file sampler
//! - Sample loading and caching (in-memory for zero-latency playback)
//! - Nearest-buffer lookup with pitch shifting for unmapped notes
//! - Voice management with a polyphony limit and attack/release envelopes

mod engine;
mod error;
mod loader;
mod voice;

pub use engine::{create_drum_sampler, Sampler, DEFAULT_CHANNEL_COUNT, DEFAULT_SAMPLE_RATE};
pub use error::SamplerError;
pub use loader::{local_path, LoadedSample, SampleLoader};
pub use voice::{Envelope, Voice, VoiceManager};
