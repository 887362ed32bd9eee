//! Playback settings shared by the scheduler and the REPL
//!
//! Pure data with clamping setters. With the `serde` feature the whole struct
//! can be loaded from a JSON file; missing fields take their defaults and
//! out-of-range values are clamped by `sanitized()`.

use crate::types::chord::NotationSystem;
use crate::types::drum::DrumPattern;
use std::fmt;
use std::time::Duration;

pub const MIN_TEMPO: f64 = 40.0;
pub const MAX_TEMPO: f64 = 240.0;
pub const DEFAULT_TEMPO: f64 = 120.0;

/// Longest a play waits for instrument voices to load
pub const MAX_LOAD_TIMEOUT: Duration = Duration::from_secs(60);

pub const MIN_DRUM_VOLUME_DB: f64 = -60.0;
pub const MAX_DRUM_VOLUME_DB: f64 = 0.0;

/// Clamp a tempo to the supported range
pub fn clamp_tempo(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return DEFAULT_TEMPO;
    }
    bpm.clamp(MIN_TEMPO, MAX_TEMPO)
}

/// Which chord voice plays the progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InstrumentKind {
    #[default]
    Piano,
    /// Strummed: notes of a chord start slightly apart
    Guitar,
}

impl InstrumentKind {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "piano" | "keys" => Some(InstrumentKind::Piano),
            "guitar" | "gtr" => Some(InstrumentKind::Guitar),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InstrumentKind::Piano => "piano",
            InstrumentKind::Guitar => "guitar",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DrumSettings {
    pub pattern: DrumPattern,
    complexity: f64,
    volume_db: f64,
}

impl Default for DrumSettings {
    fn default() -> Self {
        DrumSettings {
            pattern: DrumPattern::Basic,
            complexity: 50.0,
            volume_db: -10.0,
        }
    }
}

impl DrumSettings {
    /// Pattern density on a 0..=100 scale
    pub fn complexity(&self) -> f64 {
        self.complexity
    }

    pub fn set_complexity(&mut self, complexity: f64) {
        self.complexity = if complexity.is_nan() { 0.0 } else { complexity.clamp(0.0, 100.0) };
    }

    /// Kit volume; the kick plays at this level
    pub fn volume_db(&self) -> f64 {
        self.volume_db
    }

    pub fn set_volume_db(&mut self, db: f64) {
        self.volume_db = if db.is_nan() {
            MIN_DRUM_VOLUME_DB
        } else {
            db.clamp(MIN_DRUM_VOLUME_DB, MAX_DRUM_VOLUME_DB)
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlaybackSettings {
    tempo: f64,
    pub drums_enabled: bool,
    pub drums: DrumSettings,
    pub instrument: InstrumentKind,
    pub notation: NotationSystem,
    /// How long warm-up waits for instrument voices to load
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub load_timeout: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        PlaybackSettings {
            tempo: DEFAULT_TEMPO,
            drums_enabled: true,
            drums: DrumSettings::default(),
            instrument: InstrumentKind::default(),
            notation: NotationSystem::default(),
            load_timeout: Duration::from_secs(5),
        }
    }
}

impl PlaybackSettings {
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        self.tempo = clamp_tempo(bpm);
    }

    /// Re-apply every clamp; used after deserializing user-supplied values
    pub fn sanitized(mut self) -> Self {
        self.set_tempo(self.tempo);
        let drums = self.drums;
        self.drums.set_complexity(drums.complexity);
        self.drums.set_volume_db(drums.volume_db);
        self.load_timeout = self.load_timeout.min(MAX_LOAD_TIMEOUT);
        self
    }
}

#[cfg(feature = "serde")]
mod duration_secs {
    use super::MAX_LOAD_TIMEOUT;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        // Out-of-range values clamp like every other setting
        let secs = if secs.is_nan() {
            0.0
        } else {
            secs.clamp(0.0, MAX_LOAD_TIMEOUT.as_secs_f64())
        };
        Ok(Duration::from_secs_f64(secs))
    }
}
