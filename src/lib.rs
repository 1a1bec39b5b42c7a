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

//! A note-triggered drum sampler, along with the pattern and user descriptors
//! that accompany it.

pub mod audio;
pub mod config;
pub mod models;
pub mod note;
pub mod sampler;
#[cfg(test)]
mod testutil;

pub use models::{DrumPattern, User};
pub use sampler::{create_drum_sampler, Sampler};
