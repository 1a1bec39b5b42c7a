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

//! Voice management for polyphonic sample playback.
//!
//! Handles voice allocation, stealing, envelopes and mixing.

use tracing::{debug, warn};

use super::loader::LoadedSample;
use crate::note::Note;

/// Attack and release lengths, in output frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Envelope {
    pub attack_frames: usize,
    pub release_frames: usize,
}

/// Represents an active voice playing a sample.
pub struct Voice {
    /// Unique ID for this voice, assigned by the voice manager. Lower IDs are older.
    id: u64,
    /// The note that triggered this voice (for release matching).
    trigger_note: Note,
    /// The sample being played.
    sample: LoadedSample,
    /// Read position in sample frames.
    position: f64,
    /// Sample frames advanced per output frame.
    step: f64,
    /// Linear gain (velocity times volume).
    gain: f32,
    envelope: Envelope,
    /// Output frames to wait before the voice starts.
    start_delay: usize,
    /// Output frames rendered since the voice started.
    elapsed: usize,
    /// Output frames until the release begins, counted from now.
    release_in: Option<usize>,
    /// Level at the moment the release started, and frames spent releasing.
    releasing: Option<(f32, usize)>,
    finished: bool,
}

impl Voice {
    /// Creates a new voice. The voice manager assigns its ID when it is added.
    pub fn new(
        trigger_note: Note,
        sample: LoadedSample,
        step: f64,
        gain: f32,
        envelope: Envelope,
        start_delay: usize,
    ) -> Self {
        Self {
            id: 0,
            trigger_note,
            sample,
            position: 0.0,
            step,
            gain,
            envelope,
            start_delay,
            elapsed: 0,
            release_in: None,
            releasing: None,
            finished: false,
        }
    }

    /// Returns the note that triggered this voice.
    pub fn trigger_note(&self) -> Note {
        self.trigger_note
    }

    /// Returns true once the voice has nothing left to play.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Schedules the release to begin after the given number of output frames.
    /// An earlier pending release wins.
    pub fn schedule_release(&mut self, after_frames: usize) {
        if self.releasing.is_some() {
            return;
        }
        self.release_in = Some(match self.release_in {
            Some(existing) => existing.min(after_frames),
            None => after_frames,
        });
    }

    /// Current envelope level, ignoring any release.
    fn attack_level(&self) -> f32 {
        if self.envelope.attack_frames == 0 || self.elapsed >= self.envelope.attack_frames {
            1.0
        } else {
            self.elapsed as f32 / self.envelope.attack_frames as f32
        }
    }

    /// Reads one channel at the current (fractional) position with linear interpolation.
    /// The last frame is held rather than interpolated toward silence.
    fn read(&self, channel: usize) -> f32 {
        let frame = self.position.floor() as usize;
        let frac = self.position.fract() as f32;
        let s0 = self.sample.sample_at(frame, channel);
        if frame + 1 >= self.sample.frames() {
            return s0;
        }
        let s1 = self.sample.sample_at(frame + 1, channel);
        s0 + (s1 - s0) * frac
    }

    /// Mixes this voice into an interleaved output buffer.
    pub fn render(&mut self, output: &mut [f32], channel_count: usize) {
        if channel_count == 0 {
            return;
        }

        for frame in output.chunks_exact_mut(channel_count) {
            if self.finished {
                return;
            }

            if let Some(remaining) = self.release_in {
                if remaining == 0 {
                    self.release_in = None;
                    if self.start_delay > 0 {
                        // Released before it ever sounded.
                        self.finished = true;
                        return;
                    }
                    self.releasing = Some((self.attack_level(), 0));
                } else {
                    self.release_in = Some(remaining - 1);
                }
            }

            if self.start_delay > 0 {
                self.start_delay -= 1;
                continue;
            }

            if self.position >= self.sample.frames() as f64 {
                self.finished = true;
                return;
            }

            let level = match self.releasing {
                Some((start_level, done)) => {
                    if done >= self.envelope.release_frames {
                        self.finished = true;
                        return;
                    }
                    self.releasing = Some((start_level, done + 1));
                    start_level * (1.0 - done as f32 / self.envelope.release_frames as f32)
                }
                None => self.attack_level(),
            };

            let amplitude = level * self.gain;
            let sample_channels = self.sample.channel_count().max(1) as usize;
            for (channel, out) in frame.iter_mut().enumerate() {
                *out += self.read(channel % sample_channels) * amplitude;
            }

            self.position += self.step;
            self.elapsed += 1;
        }
    }
}

impl std::fmt::Debug for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voice")
            .field("id", &self.id)
            .field("note", &self.trigger_note)
            .field("position", &self.position)
            .field("step", &self.step)
            .field("releasing", &self.releasing.is_some())
            .finish()
    }
}

/// Manages active voices for sample playback.
pub struct VoiceManager {
    /// Active voices, oldest first.
    voices: Vec<Voice>,
    /// Maximum number of concurrent voices.
    max_voices: u32,
    /// Next voice ID.
    next_id: u64,
}

impl VoiceManager {
    /// Creates a new voice manager. A limit of zero is treated as one.
    pub fn new(max_voices: u32) -> Self {
        Self {
            voices: Vec::new(),
            max_voices: max_voices.max(1),
            next_id: 1,
        }
    }

    /// Adds a new voice, stealing the oldest voice if the limit is reached.
    /// Returns the ID of the new voice and the ID of the stolen voice, if any.
    pub fn add_voice(&mut self, mut voice: Voice) -> (u64, Option<u64>) {
        voice.id = self.next_id;
        self.next_id += 1;

        let mut stolen = None;
        if self.voices.len() >= self.max_voices as usize {
            if let Some(oldest) = self.voices.iter().min_by_key(|v| v.id) {
                let oldest_id = oldest.id;
                self.voices.retain(|v| v.id != oldest_id);
                warn!(
                    max_voices = self.max_voices,
                    stolen = oldest_id,
                    "Voice limit reached, stealing oldest"
                );
                stolen = Some(oldest_id);
            }
        }

        let id = voice.id;
        debug!(id, note = %voice.trigger_note(), "Voice started");
        self.voices.push(voice);
        (id, stolen)
    }

    /// Schedules the release of every voice triggered by the given note.
    /// Returns the number of voices affected.
    pub fn release(&mut self, note: Note, after_frames: usize) -> usize {
        let mut count = 0;
        for voice in self
            .voices
            .iter_mut()
            .filter(|v| v.trigger_note() == note && !v.finished)
        {
            voice.schedule_release(after_frames);
            count += 1;
        }
        count
    }

    /// Schedules the release of a single voice. Returns false if it is no longer active.
    pub fn release_voice(&mut self, id: u64, after_frames: usize) -> bool {
        match self.voices.iter_mut().find(|v| v.id == id) {
            Some(voice) => {
                voice.schedule_release(after_frames);
                true
            }
            None => false,
        }
    }

    /// Schedules the release of every active voice.
    pub fn release_all(&mut self, after_frames: usize) -> usize {
        for voice in self.voices.iter_mut() {
            voice.schedule_release(after_frames);
        }
        self.voices.len()
    }

    /// Mixes all voices into the output buffer and drops finished ones.
    pub fn render(&mut self, output: &mut [f32], channel_count: usize) {
        for voice in self.voices.iter_mut() {
            voice.render(output, channel_count);
        }
        self.voices.retain(|v| !v.finished);
    }

    /// Returns the current number of active voices.
    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Returns the IDs of the active voices, oldest first.
    pub fn active_ids(&self) -> Vec<u64> {
        self.voices.iter().map(|v| v.id).collect()
    }

    /// Clears all voices immediately.
    pub fn clear(&mut self) {
        self.voices.clear();
    }
}

impl std::fmt::Debug for VoiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceManager")
            .field("active_voices", &self.voices.len())
            .field("max_voices", &self.max_voices)
            .finish()
    }
}
