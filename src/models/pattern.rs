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
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{load_file, ModelError};

/// A drum pattern descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrumPattern {
    pub id: String,
    pub name: String,
    /// Tempo in beats per minute.
    pub bpm: f64,
    /// Time signature such as "4/4".
    pub time_signature: String,
}

impl DrumPattern {
    /// Reads a pattern from a JSON or YAML file.
    pub fn load(path: &Path) -> Result<DrumPattern, ModelError> {
        load_file(path)
    }

    /// The length of one beat, or None if the tempo is not a positive number.
    pub fn beat_duration(&self) -> Option<Duration> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(60.0 / self.bpm).ok()
    }

    /// Parses the time signature.
    pub fn parse_time_signature(&self) -> Result<TimeSignature, ModelError> {
        self.time_signature.parse()
    }

    /// The length of one bar. Beats are counted as quarter notes, so 6/8 at
    /// 120 BPM lasts 1.5 seconds.
    pub fn bar_duration(&self) -> Option<Duration> {
        let beat = self.beat_duration()?;
        let signature = self.parse_time_signature().ok()?;
        Some(beat.mul_f64(signature.quarter_notes_per_bar()))
    }
}

/// A parsed time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    /// Beats per bar.
    pub beats: u32,
    /// The note value of one beat (4 for quarter notes).
    pub unit: u32,
}

impl TimeSignature {
    /// Bar length measured in quarter notes.
    pub fn quarter_notes_per_bar(&self) -> f64 {
        self.beats as f64 * 4.0 / self.unit as f64
    }
}

impl FromStr for TimeSignature {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::TimeSignature(s.to_string());
        let (beats, unit) = s.split_once('/').ok_or_else(invalid)?;
        let beats: u32 = beats.trim().parse().map_err(|_| invalid())?;
        let unit: u32 = unit.trim().parse().map_err(|_| invalid())?;

        if beats == 0 || !unit.is_power_of_two() {
            return Err(invalid());
        }

        Ok(TimeSignature { beats, unit })
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.unit)
    }
}
