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

//! The note-triggered sampler.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use super::error::SamplerError;
use super::loader::{local_path, LoadedSample, SampleLoader};
use super::voice::{Envelope, Voice, VoiceManager};
use crate::config::sampler::{SamplerConfig, DEFAULT_MAX_VOICES};
use crate::note::{interval_to_ratio, Note};

/// Default output sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default number of output channels.
pub const DEFAULT_CHANNEL_COUNT: u16 = 2;

/// How far, in semitones, to search for a buffer to repitch.
const MAX_INTERVAL: i16 = 96;

/// Default release time of the drum kit.
const DRUM_KIT_RELEASE: Duration = Duration::from_millis(100);

/// Creates the drum kit sampler: kick, snare and hi-hat mapped to C3, D3 and E3,
/// with files under `/samples/`. Nothing is loaded until [`Sampler::load`] is called.
pub fn create_drum_sampler() -> Sampler {
    let config = SamplerConfig::drum_kit();
    let urls = BTreeMap::from([
        (Note::C3, config.resolve_url("kick.mp3")),
        (Note::D3, config.resolve_url("snare.mp3")),
        (Note::E3, config.resolve_url("hihat.mp3")),
    ]);

    Sampler::assemble(
        config,
        urls,
        Duration::ZERO,
        DRUM_KIT_RELEASE,
        1.0,
        DEFAULT_MAX_VOICES,
    )
}

/// Plays loaded buffers in response to note events, repitching the nearest
/// buffer for notes that have none of their own.
pub struct Sampler {
    config: SamplerConfig,
    /// Resolved sample URL per note.
    urls: BTreeMap<Note, String>,
    /// Loaded buffers per note.
    buffers: BTreeMap<Note, LoadedSample>,
    voices: VoiceManager,
    attack: Duration,
    release: Duration,
    volume: f32,
    sample_rate: u32,
    channel_count: u16,
}

impl Sampler {
    /// Creates a sampler from a configuration, validating note names and durations.
    pub fn new(config: SamplerConfig) -> Result<Sampler, SamplerError> {
        let urls = config.notes()?.into_iter().collect();
        let attack = config.attack()?;
        let release = config.release()?;
        let volume = config.volume();
        let max_voices = config.max_voices();

        Ok(Sampler::assemble(config, urls, attack, release, volume, max_voices))
    }

    fn assemble(
        config: SamplerConfig,
        urls: BTreeMap<Note, String>,
        attack: Duration,
        release: Duration,
        volume: f32,
        max_voices: u32,
    ) -> Sampler {
        Sampler {
            config,
            urls,
            buffers: BTreeMap::new(),
            voices: VoiceManager::new(max_voices),
            attack,
            release,
            volume,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channel_count: DEFAULT_CHANNEL_COUNT,
        }
    }

    /// Sets the output format used by [`Sampler::render`]. A channel count of zero is
    /// treated as mono.
    pub fn with_output(mut self, sample_rate: u32, channel_count: u16) -> Self {
        self.sample_rate = sample_rate.max(1);
        self.channel_count = channel_count.max(1);
        self
    }

    /// Returns the configuration this sampler was built from.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Returns the resolved URL of every mapped note, in ascending note order.
    pub fn urls(&self) -> Vec<(Note, &str)> {
        self.urls
            .iter()
            .map(|(note, url)| (*note, url.as_str()))
            .collect()
    }

    /// Returns the output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of output channels.
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Converts a duration to a whole number of output frames.
    pub fn frames_for(&self, duration: Duration) -> usize {
        (duration.as_secs_f64() * self.sample_rate as f64).round() as usize
    }

    /// Loads every mapped sample through the loader. Absolute sample paths are
    /// re-rooted under `root` when one is given.
    pub fn load(
        &mut self,
        loader: &mut SampleLoader,
        root: Option<&Path>,
    ) -> Result<(), SamplerError> {
        for (note, url) in self.urls.iter() {
            let path = local_path(root, url)?;
            let sample = loader.load(&path)?;
            debug!(note = %note, path = ?path, "Buffer ready");
            self.buffers.insert(*note, sample);
        }

        info!(buffers = self.buffers.len(), "Sampler loaded");
        Ok(())
    }

    /// Returns true once every mapped note has a buffer.
    pub fn loaded(&self) -> bool {
        self.urls.keys().all(|note| self.buffers.contains_key(note))
    }

    /// Adds (or replaces) the buffer for a note.
    pub fn add(&mut self, note: Note, sample: LoadedSample) {
        self.buffers.insert(note, sample);
    }

    /// Returns true if a buffer is loaded for exactly this note.
    pub fn has(&self, note: Note) -> bool {
        self.buffers.contains_key(&note)
    }

    /// Returns the buffer for a note, if one is loaded.
    pub fn buffer(&self, note: Note) -> Option<&LoadedSample> {
        self.buffers.get(&note)
    }

    /// Finds the loaded note closest to the requested one, preferring the higher
    /// note when two are equally far. Returns that note and the interval in
    /// semitones from it to the requested note.
    pub fn find_closest(&self, note: Note) -> Result<(Note, i16), SamplerError> {
        for interval in 0..MAX_INTERVAL {
            if let Some(above) = note.transpose(interval) {
                if self.buffers.contains_key(&above) {
                    return Ok((above, -interval));
                }
            }
            if let Some(below) = note.transpose(-interval) {
                if self.buffers.contains_key(&below) {
                    return Ok((below, interval));
                }
            }
        }

        Err(SamplerError::NoBuffer(note))
    }

    /// Starts a voice for the note after `offset_frames` output frames. Velocity
    /// (0.0 to 1.0) scales the voice's gain.
    pub fn trigger_attack(
        &mut self,
        note: Note,
        velocity: f32,
        offset_frames: usize,
    ) -> Result<(), SamplerError> {
        self.start_voice(note, velocity, offset_frames)?;
        Ok(())
    }

    fn start_voice(
        &mut self,
        note: Note,
        velocity: f32,
        offset_frames: usize,
    ) -> Result<u64, SamplerError> {
        let (buffer_note, difference) = self.find_closest(note)?;
        let sample = self
            .buffers
            .get(&buffer_note)
            .cloned()
            .ok_or(SamplerError::NoBuffer(note))?;

        let step = interval_to_ratio(difference as f64) * sample.sample_rate() as f64
            / self.sample_rate as f64;
        let gain = velocity.clamp(0.0, 1.0) * self.volume;
        let envelope = Envelope {
            attack_frames: self.frames_for(self.attack),
            release_frames: self.frames_for(self.release),
        };

        debug!(
            note = %note,
            buffer = %buffer_note,
            difference,
            step,
            gain,
            "Triggering attack"
        );

        let (id, _) = self.voices.add_voice(Voice::new(
            note,
            sample,
            step,
            gain,
            envelope,
            offset_frames,
        ));
        Ok(id)
    }

    /// Starts the release of every voice triggered by the note, after
    /// `offset_frames` output frames. Returns the number of voices released.
    pub fn trigger_release(&mut self, note: Note, offset_frames: usize) -> usize {
        self.voices.release(note, offset_frames)
    }

    /// Starts a voice and schedules its release `duration_frames` after it starts.
    pub fn trigger_attack_release(
        &mut self,
        note: Note,
        duration_frames: usize,
        velocity: f32,
        offset_frames: usize,
    ) -> Result<(), SamplerError> {
        let id = self.start_voice(note, velocity, offset_frames)?;
        self.voices.release_voice(id, offset_frames + duration_frames);
        Ok(())
    }

    /// Releases every active voice after `offset_frames` output frames.
    pub fn release_all(&mut self, offset_frames: usize) -> usize {
        self.voices.release_all(offset_frames)
    }

    /// Stops every voice immediately.
    pub fn stop_all(&mut self) {
        self.voices.clear();
    }

    /// Returns the number of active voices.
    pub fn active_voices(&self) -> usize {
        self.voices.active_count()
    }

    /// Renders the next block of audio into an interleaved buffer, overwriting its
    /// contents. The buffer length must be a multiple of the channel count.
    pub fn render(&mut self, output: &mut [f32]) -> Result<(), SamplerError> {
        let channels = self.channel_count as usize;
        if output.len() % channels != 0 {
            return Err(SamplerError::BufferSize {
                len: output.len(),
                channels: self.channel_count,
            });
        }

        output.fill(0.0);
        self.voices.render(output, channels);
        Ok(())
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("urls", &self.urls)
            .field("buffers", &self.buffers.len())
            .field("voices", &self.voices)
            .field("sample_rate", &self.sample_rate)
            .field("channel_count", &self.channel_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::ConfigError;
    use crate::testutil::{constant_sample, write_wav_i16};

    fn mono_sampler() -> Sampler {
        create_drum_sampler().with_output(48000, 1)
    }

    #[test]
    fn test_create_drum_sampler() {
        let sampler = create_drum_sampler();
        let urls = sampler.urls();

        assert_eq!(
            urls,
            vec![
                (Note::C3, "/samples/kick.mp3"),
                (Note::D3, "/samples/snare.mp3"),
                (Note::E3, "/samples/hihat.mp3"),
            ]
        );
        assert!(!sampler.loaded());
        assert_eq!(sampler.active_voices(), 0);
    }

    #[test]
    fn test_drum_sampler_matches_config() {
        let from_config = Sampler::new(SamplerConfig::drum_kit()).unwrap();
        let factory = create_drum_sampler();
        assert_eq!(from_config.urls(), factory.urls());
        assert_eq!(from_config.release, factory.release);
        assert_eq!(from_config.attack, factory.attack);
        assert_eq!(factory.config(), &SamplerConfig::drum_kit());
    }

    #[test]
    fn test_new_rejects_duplicate_spellings() {
        let config = SamplerConfig::new(
            BTreeMap::from([
                ("C3".to_string(), "kick.wav".to_string()),
                ("48".to_string(), "kick2.wav".to_string()),
            ]),
            "/samples/",
        );
        assert!(matches!(
            Sampler::new(config),
            Err(SamplerError::Config(ConfigError::DuplicateNote { .. }))
        ));
    }

    #[test]
    fn test_new_rejects_bad_notes() {
        let config = SamplerConfig::new(
            BTreeMap::from([("Q3".to_string(), "bad.wav".to_string())]),
            "/samples/",
        );
        assert!(matches!(
            Sampler::new(config),
            Err(SamplerError::Config(_))
        ));
    }

    #[test]
    fn test_find_closest() {
        let mut sampler = mono_sampler();
        sampler.add(Note::C3, constant_sample(1.0, 10, 48000));
        sampler.add(Note::E3, constant_sample(1.0, 10, 48000));

        assert_eq!(sampler.find_closest(Note::C3).unwrap(), (Note::C3, 0));
        // C#3 is one semitone above C3.
        let c_sharp = Note::from_midi(49).unwrap();
        assert_eq!(sampler.find_closest(c_sharp).unwrap(), (Note::C3, 1));
        // D3 is equidistant; the higher buffer wins.
        assert_eq!(sampler.find_closest(Note::D3).unwrap(), (Note::E3, -2));
        let b2 = Note::from_midi(47).unwrap();
        assert_eq!(sampler.find_closest(b2).unwrap(), (Note::C3, -1));
    }

    #[test]
    fn test_find_closest_without_buffers() {
        let sampler = mono_sampler();
        assert!(matches!(
            sampler.find_closest(Note::C3),
            Err(SamplerError::NoBuffer(_))
        ));

        let mut sampler = mono_sampler();
        sampler.add(Note::from_midi(0).unwrap(), constant_sample(1.0, 10, 48000));
        assert!(matches!(
            sampler.find_closest(Note::from_midi(127).unwrap()),
            Err(SamplerError::NoBuffer(_))
        ));
    }

    #[test]
    fn test_trigger_repitches_by_interval() {
        let mut sampler = mono_sampler();
        sampler.add(Note::C3, constant_sample(1.0, 100, 48000));

        let c4 = Note::from_midi(60).unwrap();
        sampler.trigger_attack(c4, 1.0, 0).unwrap();

        // An octave up plays the buffer twice as fast, so it lasts half as long.
        let mut output = vec![0.0; 100];
        sampler.render(&mut output).unwrap();
        assert!(output[..50].iter().all(|s| *s > 0.0));
        assert!(output[50..].iter().all(|s| *s == 0.0));
        assert_eq!(sampler.active_voices(), 0);
    }

    #[test]
    fn test_trigger_accounts_for_buffer_sample_rate() {
        let mut sampler = mono_sampler();
        sampler.add(Note::C3, constant_sample(1.0, 24, 24000));

        sampler.trigger_attack(Note::C3, 1.0, 0).unwrap();

        let mut output = vec![0.0; 64];
        sampler.render(&mut output).unwrap();
        let sounding = output.iter().filter(|s| **s > 0.0).count();
        assert_eq!(sounding, 48);
    }

    #[test]
    fn test_velocity_and_volume_scale_gain() {
        let config = SamplerConfig::drum_kit().with_volume(0.5);
        let mut sampler = Sampler::new(config).unwrap().with_output(48000, 2);
        sampler.add(Note::D3, constant_sample(1.0, 10, 48000));

        sampler.trigger_attack(Note::D3, 0.5, 0).unwrap();
        let mut output = vec![0.0; 4];
        sampler.render(&mut output).unwrap();

        assert_eq!(output, vec![0.25; 4]);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let mut sampler = mono_sampler();
        sampler.add(Note::C3, constant_sample(1.0, 10, 48000));

        sampler.trigger_attack(Note::C3, 3.0, 0).unwrap();
        let mut output = vec![0.0; 2];
        sampler.render(&mut output).unwrap();
        assert_eq!(output, vec![1.0; 2]);
    }

    #[test]
    fn test_trigger_attack_release_with_offset() {
        let config = SamplerConfig::drum_kit().with_release("0s");
        let mut sampler = Sampler::new(config).unwrap().with_output(48000, 1);
        sampler.add(Note::C3, constant_sample(1.0, 1000, 48000));

        sampler.trigger_attack_release(Note::C3, 4, 1.0, 2).unwrap();
        let mut output = vec![0.0; 10];
        sampler.render(&mut output).unwrap();

        assert_eq!(
            output,
            vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(sampler.active_voices(), 0);
    }

    #[test]
    fn test_trigger_release_spans_blocks() {
        let config = SamplerConfig::drum_kit().with_release("0s");
        let mut sampler = Sampler::new(config).unwrap().with_output(48000, 1);
        sampler.add(Note::C3, constant_sample(1.0, 1000, 48000));

        sampler.trigger_attack(Note::C3, 1.0, 0).unwrap();
        let mut block = vec![0.0; 8];
        sampler.render(&mut block).unwrap();
        assert_eq!(sampler.active_voices(), 1);

        assert_eq!(sampler.trigger_release(Note::C3, 3), 1);
        sampler.render(&mut block).unwrap();
        assert_eq!(block, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(sampler.active_voices(), 0);
    }

    #[test]
    fn test_release_all_and_stop_all() {
        let mut sampler = mono_sampler();
        sampler.add(Note::C3, constant_sample(1.0, 100_000, 48000));
        sampler.trigger_attack(Note::C3, 1.0, 0).unwrap();
        sampler.trigger_attack(Note::E3, 1.0, 0).unwrap();
        assert_eq!(sampler.active_voices(), 2);

        assert_eq!(sampler.release_all(0), 2);
        // The default 100ms release is 4800 frames at 48kHz.
        let mut output = vec![0.0; 4801];
        sampler.render(&mut output).unwrap();
        assert_eq!(sampler.active_voices(), 0);

        sampler.trigger_attack(Note::C3, 1.0, 0).unwrap();
        sampler.stop_all();
        assert_eq!(sampler.active_voices(), 0);
    }

    #[test]
    fn test_render_rejects_partial_frames() {
        let mut sampler = create_drum_sampler().with_output(48000, 2);
        let mut output = vec![0.0; 3];
        assert!(matches!(
            sampler.render(&mut output),
            Err(SamplerError::BufferSize { len: 3, channels: 2 })
        ));
    }

    #[test]
    fn test_load_from_root() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let samples_dir = dir.path().join("samples");
        std::fs::create_dir(&samples_dir)?;
        let config = SamplerConfig::new(
            BTreeMap::from([
                ("C3".to_string(), "kick.wav".to_string()),
                ("D3".to_string(), "snare.wav".to_string()),
            ]),
            "/samples/",
        );
        write_wav_i16(&samples_dir.join("kick.wav"), &[[8192i16]; 480], 48000)?;
        write_wav_i16(&samples_dir.join("snare.wav"), &[[4096i16, 4096]; 480], 48000)?;

        let mut sampler = Sampler::new(config)?.with_output(48000, 2);
        let mut loader = SampleLoader::new(48000);
        sampler.load(&mut loader, Some(dir.path()))?;

        assert!(sampler.loaded());
        assert!(sampler.has(Note::C3));
        assert!(sampler.has(Note::D3));
        assert!(!sampler.has(Note::E3));
        assert_eq!(sampler.buffer(Note::D3).map(|b| b.channel_count()), Some(2));
        Ok(())
    }

    #[test]
    fn test_load_missing_samples_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sampler = create_drum_sampler();
        let mut loader = SampleLoader::new(48000);

        let result = sampler.load(&mut loader, Some(dir.path()));
        assert!(matches!(result, Err(SamplerError::Load { .. })));
        assert!(!sampler.loaded());
    }
}
