// songforge-core/src/types/roman_numeral.rs
use crate::types::chord::ChordQuality;
use crate::types::scale::ScaleType;
use std::fmt;

/// Position (1-7) of a chord root within a diatonic scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaleDegree {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
}

impl ScaleDegree {
    pub const ALL: [ScaleDegree; 7] = [
        ScaleDegree::I,
        ScaleDegree::II,
        ScaleDegree::III,
        ScaleDegree::IV,
        ScaleDegree::V,
        ScaleDegree::VI,
        ScaleDegree::VII,
    ];

    /// Degree from its 1-based number; anything outside 1..=7 is None
    pub fn from_number(n: u8) -> Option<ScaleDegree> {
        match n {
            1..=7 => Some(Self::ALL[(n - 1) as usize]),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    /// Zero-based index into a seven-note scale
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Upper-case numeral without decoration
    pub fn numeral(&self) -> &'static str {
        match self {
            ScaleDegree::I => "I",
            ScaleDegree::II => "II",
            ScaleDegree::III => "III",
            ScaleDegree::IV => "IV",
            ScaleDegree::V => "V",
            ScaleDegree::VI => "VI",
            ScaleDegree::VII => "VII",
        }
    }
}

impl fmt::Display for ScaleDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.numeral())
    }
}

/// Classical tonal role of a scale-degree chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HarmonicFunction {
    Tonic,
    Supertonic,
    Mediant,
    Subdominant,
    Dominant,
    Submediant,
    LeadingTone,
}

impl HarmonicFunction {
    pub fn name(&self) -> &'static str {
        match self {
            HarmonicFunction::Tonic => "Tonic",
            HarmonicFunction::Supertonic => "Supertonic",
            HarmonicFunction::Mediant => "Mediant",
            HarmonicFunction::Subdominant => "Subdominant",
            HarmonicFunction::Dominant => "Dominant",
            HarmonicFunction::Submediant => "Submediant",
            HarmonicFunction::LeadingTone => "Leading Tone",
        }
    }
}

impl fmt::Display for HarmonicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Harmonic function of a degree.
///
/// Minor keys use the same table; the seventh degree is still called the
/// leading tone even though natural minor has a subtonic there.
pub fn harmonic_function(degree: ScaleDegree, _scale: ScaleType) -> HarmonicFunction {
    match degree {
        ScaleDegree::I => HarmonicFunction::Tonic,
        ScaleDegree::II => HarmonicFunction::Supertonic,
        ScaleDegree::III => HarmonicFunction::Mediant,
        ScaleDegree::IV => HarmonicFunction::Subdominant,
        ScaleDegree::V => HarmonicFunction::Dominant,
        ScaleDegree::VI => HarmonicFunction::Submediant,
        ScaleDegree::VII => HarmonicFunction::LeadingTone,
    }
}

/// Roman numeral label for a degree played with the given quality.
///
/// Case and decoration come from the quality token alone: minor tokens (but
/// not `maj` ones) lower-case the numeral, `dim` lower-cases and adds `°`,
/// `aug` adds `+`, and any token mentioning a seventh gets a trailing `7`.
pub fn roman_numeral(degree: ScaleDegree, quality: ChordQuality) -> String {
    let token = quality.token();
    let mut numeral = degree.numeral().to_string();

    if token.contains('m') && !token.contains("maj") {
        numeral = numeral.to_lowercase();
    }
    if token.contains("dim") {
        numeral = numeral.to_lowercase() + "°";
    }
    if token.contains("aug") {
        numeral.push('+');
    }
    if token.contains('7') {
        numeral.push('7');
    }

    numeral
}
