use crate::error::{Result, SongError};
use crate::types::note::{Interval, PitchName};
use crate::types::roman_numeral::{harmonic_function, roman_numeral, HarmonicFunction, ScaleDegree};
use crate::types::scale::ScaleType;
use crate::types::time::{beats, Beats, NoteValue};
#[cfg(feature = "colored")]
use colored::*;
use std::fmt;
use std::str::FromStr;

/// Chord type, written as the short token that follows the root in a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChordQuality {
    /// "" (plain major triad)
    #[default]
    Major,
    /// "m"
    Minor,
    /// "dim"
    Diminished,
    /// "aug"
    Augmented,
    /// "5" (root and fifth only)
    Power,
    Sus2,
    Sus4,
    Add9,
    /// "maj7"
    Major7,
    /// "m7"
    Minor7,
    /// "7"
    Dominant7,
    /// "m9"
    Minor9,
    /// "maj9"
    Major9,
    /// "13"
    Dominant13,
}

impl ChordQuality {
    /// Every quality the editor offers, in display order
    pub const ALL: [ChordQuality; 14] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Dominant7,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
        ChordQuality::Add9,
        ChordQuality::Power,
        ChordQuality::Minor9,
        ChordQuality::Major9,
        ChordQuality::Dominant13,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Power => "5",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Add9 => "add9",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Minor9 => "m9",
            ChordQuality::Major9 => "maj9",
            ChordQuality::Dominant13 => "13",
        }
    }

    /// Human-readable label for menus
    pub fn label(&self) -> &'static str {
        match self {
            ChordQuality::Major => "Major",
            ChordQuality::Minor => "Minor",
            ChordQuality::Diminished => "Diminished",
            ChordQuality::Augmented => "Augmented",
            ChordQuality::Power => "Power",
            ChordQuality::Sus2 => "Sus2",
            ChordQuality::Sus4 => "Sus4",
            ChordQuality::Add9 => "Add9",
            ChordQuality::Major7 => "Maj7",
            ChordQuality::Minor7 => "Min7",
            ChordQuality::Dominant7 => "Dom7",
            ChordQuality::Minor9 => "Min9",
            ChordQuality::Major9 => "Maj9",
            ChordQuality::Dominant13 => "Dom13",
        }
    }

    /// Chord tones above the root as spelled intervals
    pub fn intervals(&self) -> &'static [Interval] {
        const R: Interval = Interval::new(0, 0);
        const M2: Interval = Interval::new(1, 2);
        const M3: Interval = Interval::new(2, 4);
        const MI3: Interval = Interval::new(2, 3);
        const P4: Interval = Interval::new(3, 5);
        const D5: Interval = Interval::new(4, 6);
        const P5: Interval = Interval::new(4, 7);
        const A5: Interval = Interval::new(4, 8);
        const MI7: Interval = Interval::new(6, 10);
        const M7: Interval = Interval::new(6, 11);
        const M9: Interval = Interval::new(8, 14);
        const M13: Interval = Interval::new(12, 21);

        match self {
            ChordQuality::Major => &[R, M3, P5],
            ChordQuality::Minor => &[R, MI3, P5],
            ChordQuality::Diminished => &[R, MI3, D5],
            ChordQuality::Augmented => &[R, M3, A5],
            ChordQuality::Power => &[R, P5],
            ChordQuality::Sus2 => &[R, M2, P5],
            ChordQuality::Sus4 => &[R, P4, P5],
            ChordQuality::Add9 => &[R, M3, P5, M9],
            ChordQuality::Major7 => &[R, M3, P5, M7],
            ChordQuality::Minor7 => &[R, MI3, P5, MI7],
            ChordQuality::Dominant7 => &[R, M3, P5, MI7],
            ChordQuality::Minor9 => &[R, MI3, P5, MI7, M9],
            ChordQuality::Major9 => &[R, M3, P5, M7, M9],
            ChordQuality::Dominant13 => &[R, M3, P5, MI7, M9, M13],
        }
    }
}

impl FromStr for ChordQuality {
    type Err = SongError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        ChordQuality::ALL
            .iter()
            .copied()
            .find(|q| q.token() == token)
            .or(match token {
                "M" | "maj" => Some(ChordQuality::Major),
                "min" => Some(ChordQuality::Minor),
                _ => None,
            })
            .ok_or_else(|| SongError::UnknownQuality(token.to_string()))
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Spelled notes of a chord, bass first when one is given.
///
/// A bass that is already a chord tone rotates the voicing (an inversion);
/// any other bass is added below the chord (a slash chord).
pub fn chord_notes(root: PitchName, quality: ChordQuality, bass: Option<PitchName>) -> Vec<PitchName> {
    let mut notes: Vec<PitchName> = quality
        .intervals()
        .iter()
        .map(|&interval| root.transpose(interval))
        .collect();

    if let Some(bass) = bass {
        match notes.iter().position(|n| n.is_enharmonic(&bass)) {
            Some(pos) => notes.rotate_left(pos),
            None => notes.insert(0, bass),
        }
    }

    notes
}

/// How a chord is labelled on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NotationSystem {
    #[default]
    Roman,
    Standard,
    Function,
}

impl NotationSystem {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "roman" | "numeral" => Some(NotationSystem::Roman),
            "standard" | "symbol" => Some(NotationSystem::Standard),
            "function" | "functional" => Some(NotationSystem::Function),
            _ => None,
        }
    }
}

/// A chord built on a scale degree, with its derived notation.
///
/// Symbol, notes and roman numeral are always re-derived from root, quality,
/// bass and degree, so they can never drift apart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleDegreeChord {
    root: PitchName,
    quality: ChordQuality,
    symbol: String,
    degree: ScaleDegree,
    function: HarmonicFunction,
    roman: String,
    notes: Vec<PitchName>,
    duration: Beats,
    bass: Option<PitchName>,
}

impl ScaleDegreeChord {
    /// Build a whole-note chord on a degree of the given scale
    pub fn new(root: PitchName, quality: ChordQuality, degree: ScaleDegree, scale: ScaleType) -> Self {
        let mut chord = ScaleDegreeChord {
            root,
            quality,
            symbol: String::new(),
            degree,
            function: harmonic_function(degree, scale),
            roman: String::new(),
            notes: Vec::new(),
            duration: beats(4),
            bass: None,
        };
        chord.rederive();
        chord
    }

    fn rederive(&mut self) {
        self.symbol = match self.bass {
            Some(bass) => format!("{}{}/{}", self.root, self.quality.token(), bass),
            None => format!("{}{}", self.root, self.quality.token()),
        };
        self.roman = roman_numeral(self.degree, self.quality);
        self.notes = chord_notes(self.root, self.quality, self.bass);
    }

    pub fn root(&self) -> PitchName {
        self.root
    }

    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn degree(&self) -> ScaleDegree {
        self.degree
    }

    pub fn function(&self) -> HarmonicFunction {
        self.function
    }

    pub fn roman(&self) -> &str {
        &self.roman
    }

    /// Spelled pitch set, bass first
    pub fn notes(&self) -> &[PitchName] {
        &self.notes
    }

    pub fn duration(&self) -> Beats {
        self.duration
    }

    pub fn bass(&self) -> Option<PitchName> {
        self.bass
    }

    /// Token used when releasing this chord on an instrument voice
    pub fn note_value(&self) -> NoteValue {
        NoteValue::from_beats(self.duration)
    }

    pub fn set_quality(&mut self, quality: ChordQuality) {
        self.quality = quality;
        self.rederive();
    }

    pub fn set_root(&mut self, root: PitchName) {
        self.root = root;
        self.rederive();
    }

    pub fn set_bass(&mut self, bass: Option<PitchName>) {
        self.bass = bass;
        self.rederive();
    }

    pub fn set_duration(&mut self, duration: Beats) -> Result<()> {
        if duration <= beats(0) {
            return Err(SongError::InvalidDuration(duration.to_string()));
        }
        self.duration = duration;
        Ok(())
    }

    /// Builder-style quality change, used by the generator
    pub fn with_quality(mut self, quality: ChordQuality) -> Self {
        self.set_quality(quality);
        self
    }

    /// Apply an editor change; untouched fields stay as they are
    pub fn apply(&mut self, edit: &ChordEdit) -> Result<()> {
        if let Some(duration) = edit.duration {
            self.set_duration(duration)?;
        }
        if let Some(root) = edit.root {
            self.root = root;
        }
        if let Some(quality) = edit.quality {
            self.quality = quality;
        }
        if let Some(bass) = edit.bass {
            self.bass = bass;
        }
        self.rederive();
        Ok(())
    }

    /// Label for the chosen notation system
    pub fn label(&self, notation: NotationSystem) -> String {
        match notation {
            NotationSystem::Roman => self.roman.clone(),
            NotationSystem::Standard => self.symbol.clone(),
            NotationSystem::Function => self.function.name().to_string(),
        }
    }
}

/// A partial chord update, as produced by the chord editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordEdit {
    pub root: Option<PitchName>,
    pub quality: Option<ChordQuality>,
    /// `Some(None)` clears the bass, `None` leaves it alone
    pub bass: Option<Option<PitchName>>,
    pub duration: Option<Beats>,
}

#[cfg(feature = "colored")]
impl fmt::Display for ScaleDegreeChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let notes: Vec<String> = self.notes.iter().map(|n| n.to_string()).collect();
        let symbol = match self.quality {
            ChordQuality::Minor | ChordQuality::Minor7 | ChordQuality::Minor9 => {
                self.symbol.red().bold()
            }
            ChordQuality::Diminished => self.symbol.purple().bold(),
            ChordQuality::Augmented => self.symbol.bright_red().bold(),
            ChordQuality::Sus2 | ChordQuality::Sus4 => self.symbol.yellow().bold(),
            ChordQuality::Major7 | ChordQuality::Dominant7 => self.symbol.green().bold(),
            _ => self.symbol.blue().bold(),
        };
        write!(
            f,
            "{} ({}) [{}]",
            symbol,
            self.roman.bright_black(),
            notes.join(", ").cyan()
        )
    }
}

// Plain Display impl for builds without terminal colors
#[cfg(not(feature = "colored"))]
impl fmt::Display for ScaleDegreeChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let notes: Vec<String> = self.notes.iter().map(|n| n.to_string()).collect();
        write!(f, "{} ({}) [{}]", self.symbol, self.roman, notes.join(", "))
    }
}
