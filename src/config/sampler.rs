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
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use config::{Config, File};
use duration_string::DurationString;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ConfigError;
use crate::note::Note;

/// Default maximum number of concurrent voices.
pub const DEFAULT_MAX_VOICES: u32 = 32;

/// Default attack time.
const DEFAULT_ATTACK: Duration = Duration::ZERO;

/// Default release time.
const DEFAULT_RELEASE: Duration = Duration::from_millis(100);

/// Base path that the drum kit samples live under.
pub const DRUM_KIT_BASE_URL: &str = "/samples/";

/// The fixed note to file mappings of the drum kit.
pub const DRUM_KIT_URLS: [(&str, &str); 3] = [
    ("C3", "kick.mp3"),
    ("D3", "snare.mp3"),
    ("E3", "hihat.mp3"),
];

/// A YAML representation of a sampler.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SamplerConfig {
    /// Note name to sample file mappings.
    urls: BTreeMap<String, String>,

    /// The path or URL prefix that relative sample files are resolved against.
    #[serde(default)]
    base_url: String,

    /// How long a voice takes to fade in, e.g. "5ms".
    #[serde(skip_serializing_if = "Option::is_none")]
    attack: Option<String>,

    /// How long a voice takes to fade out after release, e.g. "100ms".
    #[serde(skip_serializing_if = "Option::is_none")]
    release: Option<String>,

    /// Linear output gain applied to every voice.
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<f32>,

    /// Maximum number of concurrent voices.
    #[serde(skip_serializing_if = "Option::is_none")]
    max_voices: Option<u32>,
}

impl SamplerConfig {
    /// Creates a new sampler configuration.
    pub fn new(urls: BTreeMap<String, String>, base_url: &str) -> SamplerConfig {
        SamplerConfig {
            urls,
            base_url: base_url.to_string(),
            attack: None,
            release: None,
            volume: None,
            max_voices: None,
        }
    }

    /// The drum kit: kick, snare and hi-hat on C3, D3 and E3.
    pub fn drum_kit() -> SamplerConfig {
        SamplerConfig::new(
            DRUM_KIT_URLS
                .iter()
                .map(|(note, file)| (note.to_string(), file.to_string()))
                .collect(),
            DRUM_KIT_BASE_URL,
        )
    }

    /// Parses a sampler configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<SamplerConfig, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<SamplerConfig>()?)
    }

    /// Serializes and saves this configuration to the given path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = serde_yml::to_string(self)?;
        info!(path = ?path, "Saving sampler config");

        let mut file = std::fs::File::create(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }

    /// Builder-style setter for the attack time.
    pub fn with_attack(mut self, attack: &str) -> Self {
        self.attack = Some(attack.to_string());
        self
    }

    /// Builder-style setter for the release time.
    pub fn with_release(mut self, release: &str) -> Self {
        self.release = Some(release.to_string());
        self
    }

    /// Builder-style setter for the volume.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Builder-style setter for the voice limit.
    pub fn with_max_voices(mut self, max_voices: u32) -> Self {
        self.max_voices = Some(max_voices);
        self
    }

    /// Gets the raw note name to file mappings.
    pub fn urls(&self) -> &BTreeMap<String, String> {
        &self.urls
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Gets the attack time.
    pub fn attack(&self) -> Result<Duration, ConfigError> {
        parse_duration("attack", self.attack.as_deref(), DEFAULT_ATTACK)
    }

    /// Gets the release time.
    pub fn release(&self) -> Result<Duration, ConfigError> {
        parse_duration("release", self.release.as_deref(), DEFAULT_RELEASE)
    }

    /// Gets the output volume.
    pub fn volume(&self) -> f32 {
        self.volume.unwrap_or(1.0)
    }

    /// Gets the voice limit.
    pub fn max_voices(&self) -> u32 {
        self.max_voices.unwrap_or(DEFAULT_MAX_VOICES)
    }

    /// Parses every mapped note name, returning the notes with their resolved files
    /// in ascending note order. Two spellings of the same note are an error.
    pub fn notes(&self) -> Result<Vec<(Note, String)>, ConfigError> {
        let mut names: BTreeMap<Note, &str> = BTreeMap::new();
        let mut notes = Vec::with_capacity(self.urls.len());
        for (name, file) in &self.urls {
            let note = name.parse::<Note>()?;
            if let Some(first) = names.insert(note, name) {
                return Err(ConfigError::DuplicateNote {
                    note,
                    first: first.to_string(),
                    second: name.clone(),
                });
            }
            notes.push((note, self.resolve_url(file)));
        }
        notes.sort_by_key(|(note, _)| *note);
        Ok(notes)
    }

    /// Resolves a sample file against the base URL. Absolute paths and URLs with a
    /// scheme are returned unchanged.
    pub fn resolve_url(&self, file: &str) -> String {
        if file.starts_with('/') || file.contains("://") || self.base_url.is_empty() {
            return file.to_string();
        }

        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, file)
        } else {
            format!("{}/{}", self.base_url, file)
        }
    }

    /// Merges another configuration into this one. Mappings in `other` override
    /// mappings for the same note however it is spelled, and any settings it
    /// specifies win. Names that don't parse are kept for `notes` to report.
    pub fn merge(&mut self, other: SamplerConfig) {
        for (name, file) in other.urls {
            if let Ok(note) = name.parse::<Note>() {
                self.urls
                    .retain(|existing, _| existing.parse::<Note>().ok() != Some(note));
            }
            self.urls.insert(name, file);
        }
        if !other.base_url.is_empty() {
            self.base_url = other.base_url;
        }
        if other.attack.is_some() {
            self.attack = other.attack;
        }
        if other.release.is_some() {
            self.release = other.release;
        }
        if other.volume.is_some() {
            self.volume = other.volume;
        }
        if other.max_voices.is_some() {
            self.max_voices = other.max_voices;
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig::drum_kit()
    }
}

fn parse_duration(
    field: &'static str,
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => Ok(DurationString::from_string(value.to_string())
            .map_err(|e| ConfigError::Duration {
                field,
                value: value.to_string(),
                reason: e.to_string(),
            })?
            .into()),
        None => Ok(default),
    }
}
