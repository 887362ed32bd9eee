//! Genre catalog: progression templates and quality palettes

use crate::error::SongError;
use crate::types::chord::ChordQuality;
use crate::types::roman_numeral::ScaleDegree;
use std::fmt;
use std::str::FromStr;

/// A named chord pattern given as scale-degree numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionTemplate {
    pub degrees: &'static [u8],
    pub name: &'static str,
    /// Song or style the pattern is known from
    pub reference: &'static str,
}

/// Static description of a genre.
///
/// A palette entry of `None` stands for "keep the diatonic quality": drawing
/// it leaves the chord unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenreDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub progressions: &'static [ProgressionTemplate],
    pub quality_palette: &'static [Option<ChordQuality>],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Genre {
    #[default]
    Pop,
    Rock,
    /// Ballad
    Emotional,
    /// Jazz / R&B
    Complex,
}

const POP: GenreDescriptor = GenreDescriptor {
    name: "Pop",
    description: "Classic pop progressions",
    progressions: &[
        ProgressionTemplate { degrees: &[1, 5, 6, 4], name: "Axis (I-V-vi-IV)", reference: "Pachelbel's Canon" },
        ProgressionTemplate { degrees: &[1, 6, 4, 5], name: "Fifties (I-vi-IV-V)", reference: "Stand By Me" },
        ProgressionTemplate { degrees: &[6, 4, 1, 5], name: "Sensitive (vi-IV-I-V)", reference: "Apologize" },
        ProgressionTemplate { degrees: &[1, 4, 5, 4], name: "Basic (I-IV-V-IV)", reference: "Simple Pop" },
    ],
    quality_palette: &[None, Some(ChordQuality::Sus2), Some(ChordQuality::Add9)],
};

const ROCK: GenreDescriptor = GenreDescriptor {
    name: "Rock",
    description: "Power chords and rock progressions",
    progressions: &[
        ProgressionTemplate { degrees: &[1, 6, 3, 7], name: "Minor rock (i-VI-III-VII)", reference: "Green Day Style" },
        ProgressionTemplate { degrees: &[1, 4, 1, 5], name: "Power (I-IV-I-V)", reference: "Classic Rock" },
        ProgressionTemplate { degrees: &[1, 7, 6, 7], name: "Descending (I-VII-vi-VII)", reference: "Alternative" },
        ProgressionTemplate { degrees: &[6, 4, 1, 5], name: "Epic (vi-IV-I-V)", reference: "Epic Rock" },
    ],
    quality_palette: &[None, Some(ChordQuality::Power), Some(ChordQuality::Sus2)],
};

const EMOTIONAL: GenreDescriptor = GenreDescriptor {
    name: "Ballad",
    description: "Expressive ballad harmony",
    progressions: &[
        ProgressionTemplate { degrees: &[6, 5, 4, 5], name: "Sad loop (vi-V-IV-V)", reference: "Sad Ballad" },
        ProgressionTemplate { degrees: &[1, 3, 6, 4], name: "Golden (I-iii-vi-IV)", reference: "Emotional Pop" },
        ProgressionTemplate { degrees: &[4, 1, 5, 6], name: "Hopeful (IV-I-V-vi)", reference: "Hopeful" },
    ],
    quality_palette: &[
        None,
        Some(ChordQuality::Major7),
        Some(ChordQuality::Sus2),
        Some(ChordQuality::Add9),
    ],
};

const COMPLEX: GenreDescriptor = GenreDescriptor {
    name: "Jazz / R&B",
    description: "Extended jazz chords and ii-V-I motion",
    progressions: &[
        ProgressionTemplate { degrees: &[2, 5, 1, 6], name: "Two-five-one (ii-V-I-vi)", reference: "Jazz Standard" },
        ProgressionTemplate { degrees: &[4, 5, 3, 6], name: "Neo soul (IV-V-iii-vi)", reference: "Neo Soul" },
        ProgressionTemplate { degrees: &[1, 4, 2, 5], name: "Turnaround (I-IV-ii-V)", reference: "Jazz Turnaround" },
    ],
    quality_palette: &[
        Some(ChordQuality::Major7),
        Some(ChordQuality::Minor7),
        Some(ChordQuality::Dominant7),
        Some(ChordQuality::Sus4),
        Some(ChordQuality::Minor9),
        Some(ChordQuality::Major9),
        Some(ChordQuality::Dominant13),
    ],
};

impl Genre {
    pub const ALL: [Genre; 4] = [Genre::Pop, Genre::Rock, Genre::Emotional, Genre::Complex];

    pub fn descriptor(&self) -> &'static GenreDescriptor {
        match self {
            Genre::Pop => &POP,
            Genre::Rock => &ROCK,
            Genre::Emotional => &EMOTIONAL,
            Genre::Complex => &COMPLEX,
        }
    }

    /// Quality this genre always uses on a degree, overriding any palette draw.
    ///
    /// Only the jazz genre has fixed seventh-chord colors; its seventh degree
    /// keeps whatever the palette produced.
    pub fn forced_quality(&self, degree: ScaleDegree) -> Option<ChordQuality> {
        match self {
            Genre::Complex => match degree {
                ScaleDegree::II | ScaleDegree::III | ScaleDegree::VI => Some(ChordQuality::Minor7),
                ScaleDegree::I | ScaleDegree::IV => Some(ChordQuality::Major7),
                ScaleDegree::V => Some(ChordQuality::Dominant7),
                ScaleDegree::VII => None,
            },
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Genre::Pop => "pop",
            Genre::Rock => "rock",
            Genre::Emotional => "emotional",
            Genre::Complex => "complex",
        }
    }
}

impl FromStr for Genre {
    type Err = SongError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pop" => Ok(Genre::Pop),
            "rock" => Ok(Genre::Rock),
            "emotional" | "ballad" => Ok(Genre::Emotional),
            "complex" | "jazz" | "rnb" | "r&b" => Ok(Genre::Complex),
            other => Err(SongError::UnknownGenre(other.to_string())),
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor().name)
    }
}
