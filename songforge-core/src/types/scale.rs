use crate::error::SongError;
use crate::types::chord::{ChordQuality, ScaleDegreeChord};
use crate::types::note::{Interval, PitchName};
use crate::types::roman_numeral::ScaleDegree;
use std::fmt;
use std::str::FromStr;

/// Diatonic scale family of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScaleType {
    #[default]
    Major,
    /// Natural minor (aeolian)
    Minor,
}

impl ScaleType {
    /// Semitones of each degree above the tonic
    fn semitones(&self) -> [u8; 7] {
        match self {
            ScaleType::Major => [0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// Default triad quality on each degree
    pub fn triad_quality(&self, degree: ScaleDegree) -> ChordQuality {
        let n = degree.number();
        match self {
            ScaleType::Major => match n {
                2 | 3 | 6 => ChordQuality::Minor,
                7 => ChordQuality::Diminished,
                _ => ChordQuality::Major,
            },
            ScaleType::Minor => match n {
                1 | 4 | 5 => ChordQuality::Minor,
                2 => ChordQuality::Diminished,
                _ => ChordQuality::Major,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::Minor => "minor",
        }
    }
}

impl FromStr for ScaleType {
    type Err = SongError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" | "maj" | "ionian" => Ok(ScaleType::Major),
            "minor" | "min" | "aeolian" => Ok(ScaleType::Minor),
            other => Err(SongError::UnknownScale(other.to_string())),
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Spelled notes of the scale, tonic first
pub fn scale_notes(root: PitchName, scale: ScaleType) -> Vec<PitchName> {
    scale
        .semitones()
        .iter()
        .enumerate()
        .map(|(step, &semitones)| root.transpose(Interval::new(step as u8, semitones)))
        .collect()
}

/// The seven diatonic triads of a key, degree I first.
///
/// Returns an empty list when the root is not a valid note name; callers are
/// expected to carry on with no chords rather than fail.
pub fn scale_chords(root: &str, scale: ScaleType) -> Vec<ScaleDegreeChord> {
    let Ok(tonic) = root.parse::<PitchName>() else {
        log::warn!("Cannot build a {} scale on '{}'", scale, root);
        return Vec::new();
    };

    scale_notes(tonic, scale)
        .into_iter()
        .zip(ScaleDegree::ALL)
        .map(|(note, degree)| ScaleDegreeChord::new(note, scale.triad_quality(degree), degree, scale))
        .collect()
}

/// String-typed entry point: unknown scale names also yield no chords
pub fn scale_chords_named(root: &str, scale: &str) -> Vec<ScaleDegreeChord> {
    match scale.parse::<ScaleType>() {
        Ok(scale) => scale_chords(root, scale),
        Err(e) => {
            log::warn!("{}", e);
            Vec::new()
        }
    }
}
