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

//! Note names and MIDI note numbers.
//!
//! Note names use scientific pitch notation with middle C written as `C4`
//! (MIDI note 60), so the drum kit's `C3` is MIDI note 48.

use std::fmt;
use std::str::FromStr;

/// The highest valid MIDI note number.
pub const MAX_MIDI_NOTE: u8 = 127;

/// Sharp spellings of the twelve pitch classes, starting at C.
const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Errors produced when parsing a note name.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("Empty note name")]
    Empty,

    #[error("Invalid note name '{0}'")]
    InvalidName(String),

    #[error("Note '{0}' is outside the MIDI range 0-127")]
    OutOfRange(String),
}

/// A single note, stored as its MIDI note number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Note(u8);

impl Note {
    /// C3, the drum kit's kick.
    pub const C3: Note = Note(48);
    /// D3, the drum kit's snare.
    pub const D3: Note = Note(50);
    /// E3, the drum kit's hi-hat.
    pub const E3: Note = Note(52);

    /// Creates a note from a MIDI note number.
    pub fn from_midi(midi: u8) -> Result<Note, NoteError> {
        if midi > MAX_MIDI_NOTE {
            return Err(NoteError::OutOfRange(midi.to_string()));
        }
        Ok(Note(midi))
    }

    /// Returns the MIDI note number.
    pub fn midi(&self) -> u8 {
        self.0
    }

    /// Returns the octave in scientific pitch notation.
    pub fn octave(&self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Returns the canonical (sharp) spelling of this note, e.g. `C#3`.
    pub fn name(&self) -> String {
        format!("{}{}", PITCH_NAMES[(self.0 % 12) as usize], self.octave())
    }

    /// Returns the equal-tempered frequency of this note with A4 at 440Hz.
    pub fn frequency(&self) -> f64 {
        440.0 * interval_to_ratio(self.0 as f64 - 69.0)
    }

    /// Returns this note shifted by the given number of semitones, if the result
    /// is still a valid MIDI note.
    pub fn transpose(&self, semitones: i16) -> Option<Note> {
        let shifted = self.0 as i16 + semitones;
        if (0..=MAX_MIDI_NOTE as i16).contains(&shifted) {
            Some(Note(shifted as u8))
        } else {
            None
        }
    }
}

/// Converts an interval in semitones to a frequency (playback rate) ratio.
pub fn interval_to_ratio(semitones: f64) -> f64 {
    2f64.powf(semitones / 12.0)
}

impl FromStr for Note {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(NoteError::Empty);
        }

        // Bare MIDI note numbers are accepted as-is.
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            let midi: u16 = trimmed
                .parse()
                .map_err(|_| NoteError::OutOfRange(trimmed.to_string()))?;
            if midi > MAX_MIDI_NOTE as u16 {
                return Err(NoteError::OutOfRange(trimmed.to_string()));
            }
            return Ok(Note(midi as u8));
        }

        let mut chars = trimmed.chars().peekable();
        let pitch_class: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(NoteError::InvalidName(trimmed.to_string())),
        };

        let mut accidentals: i32 = 0;
        while let Some(&c) = chars.peek() {
            match c {
                '#' => accidentals += 1,
                'b' => accidentals -= 1,
                _ => break,
            }
            chars.next();
        }

        let octave_str: String = chars.collect();
        let octave: i32 = octave_str
            .parse()
            .map_err(|_| NoteError::InvalidName(trimmed.to_string()))?;

        let midi = octave
            .checked_add(1)
            .and_then(|o| o.checked_mul(12))
            .and_then(|m| m.checked_add(pitch_class + accidentals))
            .filter(|m| (0..=MAX_MIDI_NOTE as i32).contains(m))
            .ok_or_else(|| NoteError::OutOfRange(trimmed.to_string()))?;

        Ok(Note(midi as u8))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drum_kit_notes() {
        assert_eq!("C3".parse::<Note>().unwrap().midi(), 48);
        assert_eq!("D3".parse::<Note>().unwrap().midi(), 50);
        assert_eq!("E3".parse::<Note>().unwrap().midi(), 52);
        assert_eq!("C4".parse::<Note>().unwrap().midi(), 60);
        assert_eq!("A4".parse::<Note>().unwrap().midi(), 69);
    }

    #[test]
    fn test_named_constants_match_parsing() {
        assert_eq!("C3".parse::<Note>().unwrap(), Note::C3);
        assert_eq!("D3".parse::<Note>().unwrap(), Note::D3);
        assert_eq!("E3".parse::<Note>().unwrap(), Note::E3);
    }

    #[test]
    fn test_parse_accidentals_and_case() {
        assert_eq!("c#3".parse::<Note>().unwrap().midi(), 49);
        assert_eq!("Db3".parse::<Note>().unwrap().midi(), 49);
        assert_eq!("C##3".parse::<Note>().unwrap().midi(), 50);
        assert_eq!("Cb4".parse::<Note>().unwrap().midi(), 59);
    }

    #[test]
    fn test_parse_negative_octave_and_midi_numbers() {
        assert_eq!("C-1".parse::<Note>().unwrap().midi(), 0);
        assert_eq!("G9".parse::<Note>().unwrap().midi(), 127);
        assert_eq!("36".parse::<Note>().unwrap().midi(), 36);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Note>(), Err(NoteError::Empty));
        assert!(matches!(
            "H3".parse::<Note>(),
            Err(NoteError::InvalidName(_))
        ));
        assert!(matches!("C".parse::<Note>(), Err(NoteError::InvalidName(_))));
        assert!(matches!(
            "G#9".parse::<Note>(),
            Err(NoteError::OutOfRange(_))
        ));
        assert!(matches!("128".parse::<Note>(), Err(NoteError::OutOfRange(_))));
        assert!(matches!(
            "Cb-1".parse::<Note>(),
            Err(NoteError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_huge_octave_is_out_of_range() {
        for name in ["C2147483647", "C2147483646", "B-2147483648", "C178956970"] {
            assert!(
                matches!(name.parse::<Note>(), Err(NoteError::OutOfRange(_))),
                "{} should be out of range",
                name
            );
        }
        assert!(matches!(
            "C99999999999".parse::<Note>(),
            Err(NoteError::InvalidName(_))
        ));
    }

    #[test]
    fn test_name_and_display() {
        let note = Note::from_midi(49).unwrap();
        assert_eq!(note.name(), "C#3");
        assert_eq!(note.to_string(), "C#3");
        assert_eq!(Note::from_midi(0).unwrap().name(), "C-1");
        assert!(Note::from_midi(128).is_err());
    }

    #[test]
    fn test_frequency() {
        let a4: Note = "A4".parse().unwrap();
        assert!((a4.frequency() - 440.0).abs() < 1e-9);
        let a3: Note = "A3".parse().unwrap();
        assert!((a3.frequency() - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_transpose_and_ratio() {
        let c3: Note = "C3".parse().unwrap();
        assert_eq!(c3.transpose(12).unwrap().midi(), 60);
        assert!(Note::from_midi(120).unwrap().transpose(8).is_none());
        assert!(Note::from_midi(2).unwrap().transpose(-3).is_none());
        assert!((interval_to_ratio(12.0) - 2.0).abs() < 1e-12);
        assert!((interval_to_ratio(-12.0) - 0.5).abs() < 1e-12);
        assert!((interval_to_ratio(0.0) - 1.0).abs() < 1e-12);
    }
}
