//! Rational beat durations and note-value tokens
//!
//! Chord lengths are kept as exact rationals so that a half-beat is exactly
//! 1/2 and duration lookups never suffer from float comparison.

use num_rational::Ratio;
use num_traits::ToPrimitive;
use std::fmt;

/// Exact duration in beats (quarter notes)
pub type Beats = Ratio<i64>;

/// Helper to create Beats from a ratio n/d
#[inline]
pub fn beats_ratio(n: i64, d: i64) -> Beats {
    Ratio::new(n, d)
}

/// Create Beats from a whole number of beats
#[inline]
pub fn beats(n: i64) -> Beats {
    Ratio::from_integer(n)
}

/// Convert beats to f64 for timeline arithmetic
#[inline]
pub fn to_f64(b: Beats) -> f64 {
    b.to_f64().unwrap_or(0.0)
}

/// Convert an f64 beat count to an exact ratio (for user input like "0.5")
pub fn from_f64(f: f64) -> Beats {
    // 96 divides every subdivision offered (whole down to 32nd triplets)
    let denom = 96i64;
    let numer = (f * denom as f64).round() as i64;
    Ratio::new(numer, denom)
}

/// Note-value token understood by instrument voices ("1n", "8n", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteValue {
    #[default]
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl NoteValue {
    /// Map a chord duration to the token used for its audio release.
    ///
    /// Only the four chord lengths the editor offers have a token; anything
    /// else is rendered as a whole note.
    pub fn from_beats(duration: Beats) -> NoteValue {
        if duration == beats(4) {
            NoteValue::Whole
        } else if duration == beats(2) {
            NoteValue::Half
        } else if duration == beats(1) {
            NoteValue::Quarter
        } else if duration == beats_ratio(1, 2) {
            NoteValue::Eighth
        } else {
            NoteValue::Whole
        }
    }

    /// Length of this note value in beats
    pub fn beats(&self) -> Beats {
        match self {
            NoteValue::Whole => beats(4),
            NoteValue::Half => beats(2),
            NoteValue::Quarter => beats(1),
            NoteValue::Eighth => beats_ratio(1, 2),
            NoteValue::Sixteenth => beats_ratio(1, 4),
            NoteValue::ThirtySecond => beats_ratio(1, 8),
        }
    }

    /// Length in seconds at the given tempo
    pub fn seconds(&self, bpm: f64) -> f64 {
        to_f64(self.beats()) * 60.0 / bpm
    }

    pub fn token(&self) -> &'static str {
        match self {
            NoteValue::Whole => "1n",
            NoteValue::Half => "2n",
            NoteValue::Quarter => "4n",
            NoteValue::Eighth => "8n",
            NoteValue::Sixteenth => "16n",
            NoteValue::ThirtySecond => "32n",
        }
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_lookup() {
        assert_eq!(NoteValue::from_beats(beats(4)), NoteValue::Whole);
        assert_eq!(NoteValue::from_beats(beats(2)), NoteValue::Half);
        assert_eq!(NoteValue::from_beats(beats(1)), NoteValue::Quarter);
        assert_eq!(NoteValue::from_beats(beats_ratio(1, 2)), NoteValue::Eighth);
    }

    #[test]
    fn test_unknown_duration_defaults_to_whole() {
        assert_eq!(NoteValue::from_beats(beats(3)), NoteValue::Whole);
        assert_eq!(NoteValue::from_beats(beats_ratio(1, 4)), NoteValue::Whole);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(from_f64(0.5), beats_ratio(1, 2));
        assert_eq!(from_f64(4.0), beats(4));
        assert_eq!(to_f64(beats_ratio(3, 4)), 0.75);
    }

    #[test]
    fn test_note_value_seconds() {
        assert_eq!(NoteValue::Half.seconds(120.0), 1.0);
        assert_eq!(NoteValue::ThirtySecond.token(), "32n");
    }
}
