//! Drum sounds, pattern names and the one-bar onset generator
//!
//! A pattern is a pure function of tempo, complexity and a start time, except
//! for the funk hi-hats whose velocities are randomized to humanize the groove.
//! `onsets_with_rng` takes the RNG explicitly so that part can be seeded.

use crate::error::SongError;
use crate::types::time::NoteValue;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Pitch the kick drum is tuned to
pub const KICK_PITCH: &str = "C1";

/// Percussion voice an onset is played on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrumSound {
    /// Membrane voice
    Kick,
    /// Noise voice
    Snare,
    /// Metal voice
    HiHat,
}

impl DrumSound {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "kick" | "k" | "bd" => Some(DrumSound::Kick),
            "snare" | "s" | "sd" => Some(DrumSound::Snare),
            "hihat" | "hh" | "h" => Some(DrumSound::HiHat),
            _ => None,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            DrumSound::Kick => "kick",
            DrumSound::Snare => "snare",
            DrumSound::HiHat => "hh",
        }
    }

    /// Volume offset from the kit volume, in dB
    pub fn volume_offset_db(&self) -> f64 {
        match self {
            DrumSound::Kick => 0.0,
            DrumSound::Snare => -5.0,
            DrumSound::HiHat => -15.0,
        }
    }
}

impl fmt::Display for DrumSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Named groove played under each chord
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DrumPattern {
    #[default]
    Basic,
    Rock,
    Jazz,
    Funk,
}

impl DrumPattern {
    pub const ALL: [DrumPattern; 4] = [
        DrumPattern::Basic,
        DrumPattern::Rock,
        DrumPattern::Jazz,
        DrumPattern::Funk,
    ];

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Some(DrumPattern::Basic),
            "rock" => Some(DrumPattern::Rock),
            "jazz" | "swing" => Some(DrumPattern::Jazz),
            "funk" => Some(DrumPattern::Funk),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DrumPattern::Basic => "basic",
            DrumPattern::Rock => "rock",
            DrumPattern::Jazz => "jazz",
            DrumPattern::Funk => "funk",
        }
    }
}

impl FromStr for DrumPattern {
    type Err = SongError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrumPattern::from_name(s).ok_or_else(|| SongError::UnknownDrumPattern(s.trim().to_string()))
    }
}

impl fmt::Display for DrumPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One percussion hit, at an absolute transport time in seconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrumOnset {
    pub sound: DrumSound,
    /// Only the kick is pitched
    pub pitch: Option<&'static str>,
    pub note_value: NoteValue,
    pub time: f64,
    pub velocity: f64,
}

/// Collects onsets for one bar starting at `base` seconds
struct Bar {
    base: f64,
    beat: f64,
    onsets: Vec<DrumOnset>,
}

impl Bar {
    fn new(bpm: f64, base: f64) -> Self {
        Bar {
            base,
            beat: 60.0 / bpm,
            onsets: Vec::new(),
        }
    }

    fn hit(&mut self, sound: DrumSound, at_beat: f64, note_value: NoteValue, velocity: f64) {
        let pitch = match sound {
            DrumSound::Kick => Some(KICK_PITCH),
            _ => None,
        };
        self.onsets.push(DrumOnset {
            sound,
            pitch,
            note_value,
            time: self.base + at_beat * self.beat,
            velocity,
        });
    }

    fn kick(&mut self, at_beat: f64, note_value: NoteValue) {
        self.hit(DrumSound::Kick, at_beat, note_value, 1.0);
    }

    fn snare(&mut self, at_beat: f64, note_value: NoteValue) {
        self.hit(DrumSound::Snare, at_beat, note_value, 1.0);
    }

    fn hihat(&mut self, at_beat: f64, velocity: f64) {
        self.hit(DrumSound::HiHat, at_beat, NoteValue::ThirtySecond, velocity);
    }
}

/// Onsets for one bar using the thread-local RNG for funk humanization
pub fn onsets(bpm: f64, pattern: DrumPattern, complexity: f64, base_time: f64) -> Vec<DrumOnset> {
    onsets_with_rng(bpm, pattern, complexity, base_time, &mut rand::thread_rng())
}

/// Onsets for one bar of `pattern`.
///
/// `complexity` is on a 0..=100 scale; values outside it are clamped. Beat
/// positions are converted to seconds at `bpm` and offset by `base_time`.
pub fn onsets_with_rng<R: Rng + ?Sized>(
    bpm: f64,
    pattern: DrumPattern,
    complexity: f64,
    base_time: f64,
    rng: &mut R,
) -> Vec<DrumOnset> {
    use NoteValue::{Eighth, Sixteenth};

    let c = complexity.clamp(0.0, 100.0) / 100.0;
    let mut bar = Bar::new(bpm, base_time);

    match pattern {
        DrumPattern::Basic => {
            bar.kick(0.0, Eighth);
            bar.kick(2.0, Eighth);
            bar.snare(1.0, Eighth);
            bar.snare(3.0, Eighth);
            if c > 0.2 {
                for i in 0..4 {
                    bar.hihat(i as f64, 1.0);
                }
            }
        }
        DrumPattern::Rock => {
            bar.kick(0.0, Eighth);
            bar.kick(2.0, Eighth);
            if c > 0.5 {
                bar.kick(2.5, Sixteenth);
            }
            bar.snare(1.0, Eighth);
            bar.snare(3.0, Eighth);
            if c > 0.7 {
                bar.hit(DrumSound::Snare, 3.75, Sixteenth, 0.2);
            }
            for i in 0..8 {
                let on_beat = i % 2 == 0;
                if on_beat || c > 0.3 {
                    bar.hihat(i as f64 * 0.5, if on_beat { 1.0 } else { 0.5 });
                }
            }
        }
        DrumPattern::Jazz => {
            bar.hit(DrumSound::Kick, 0.0, Eighth, 0.5);
            for beat in [0.0, 1.0, 2.0, 3.0] {
                bar.hihat(beat, 1.0);
            }
            if c > 0.3 {
                bar.hihat(0.66, 1.0);
                bar.hihat(2.66, 1.0);
            }
            bar.hit(DrumSound::Snare, 3.66, Eighth, 0.3);
            if c > 0.6 {
                bar.hit(DrumSound::Snare, 1.66, Eighth, 0.2);
            }
        }
        DrumPattern::Funk => {
            bar.kick(0.0, Eighth);
            bar.kick(2.5, Eighth);
            if c > 0.4 {
                bar.kick(3.5, Sixteenth);
            }
            bar.snare(1.0, Eighth);
            bar.snare(3.0, Eighth);
            for i in 0..16 {
                let dense = i % 4 == 0 || (c > 0.5 && i % 2 == 0) || c > 0.8;
                if dense && i % 4 != 2 {
                    let velocity = rng.gen_range(0.2..0.7);
                    bar.hihat(i as f64 * 0.25, velocity);
                }
            }
        }
    }

    bar.onsets
}
