use crate::error::{Result, SongError};
use std::fmt;
use std::str::FromStr;

/// Letter names in staff order, starting from C
const LETTERS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// Semitone offset of each natural letter above C
const NATURAL_SEMITONES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// A spelled pitch class: a letter plus accidentals, without octave.
///
/// Spelling matters for display: the third of Bb major is D, and the third of
/// D# minor is F#, so chords and scales are built by letter arithmetic and
/// not from bare semitone numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchName {
    letter: u8,     // 0-6 index into LETTERS
    accidental: i8, // +1 per sharp, -1 per flat
}

/// A spelled interval: how many letters to move and how many semitones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub steps: u8,
    pub semitones: u8,
}

impl Interval {
    pub const fn new(steps: u8, semitones: u8) -> Self {
        Interval { steps, semitones }
    }
}

impl PitchName {
    /// Create a pitch from a letter index (0=C .. 6=B) and accidental count
    pub fn new(letter: u8, accidental: i8) -> Result<Self> {
        if letter > 6 {
            return Err(SongError::InvalidPitch(format!("letter index {}", letter)));
        }
        Ok(PitchName { letter, accidental })
    }

    /// Chromatic pitch class (0-11), C = 0
    pub fn semitone(&self) -> u8 {
        (NATURAL_SEMITONES[self.letter as usize] as i16 + self.accidental as i16).rem_euclid(12)
            as u8
    }

    pub fn letter(&self) -> char {
        LETTERS[self.letter as usize]
    }

    pub fn accidental(&self) -> i8 {
        self.accidental
    }

    /// Same sounding pitch regardless of spelling (C# and Db are enharmonic)
    pub fn is_enharmonic(&self, other: &PitchName) -> bool {
        self.semitone() == other.semitone()
    }

    /// Move up by a spelled interval, keeping correct letter names
    pub fn transpose(&self, interval: Interval) -> PitchName {
        let letter = (self.letter + interval.steps) % 7;
        let target = (self.semitone() as i16 + interval.semitones as i16).rem_euclid(12);
        let natural = NATURAL_SEMITONES[letter as usize] as i16;
        // Smallest signed distance from the natural letter to the target
        let accidental = (target - natural + 6).rem_euclid(12) - 6;

        PitchName {
            letter,
            accidental: accidental as i8,
        }
    }

    /// Note name with an octave number appended, as instrument voices expect
    pub fn with_octave(&self, octave: i8) -> String {
        format!("{}{}", self, octave)
    }
}

impl FromStr for PitchName {
    type Err = SongError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();

        let letter = chars
            .next()
            .and_then(|c| LETTERS.iter().position(|&l| l == c.to_ascii_uppercase()))
            .ok_or_else(|| SongError::InvalidPitch(trimmed.to_string()))?;

        // Everything after the letter must be accidentals
        let mut accidental: i8 = 0;
        for c in chars {
            match c {
                '#' | '♯' => accidental += 1,
                'b' | '♭' => accidental -= 1,
                _ => return Err(SongError::InvalidPitch(trimmed.to_string())),
            }
        }

        if accidental.abs() > 2 {
            return Err(SongError::InvalidPitch(trimmed.to_string()));
        }

        Ok(PitchName {
            letter: letter as u8,
            accidental,
        })
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())?;
        let mark = if self.accidental > 0 { "#" } else { "b" };
        for _ in 0..self.accidental.unsigned_abs() {
            write!(f, "{}", mark)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PitchName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PitchName {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
