use crate::error::{Result, SongError};
use crate::types::chord::{ChordEdit, ScaleDegreeChord};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Allowed range for how many times a section repeats
pub const MIN_LOOP_COUNT: u8 = 1;
pub const MAX_LOOP_COUNT: u8 = 8;

static NEXT_SECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique section identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionId(u64);

impl SectionId {
    pub fn next() -> Self {
        SectionId(NEXT_SECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Keep ids minted from now on clear of one loaded from elsewhere
    #[cfg(feature = "serde")]
    fn reserve(self) -> Self {
        NEXT_SECTION_ID.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
        self
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectionType {
    Intro,
    Verse,
    #[cfg_attr(feature = "serde", serde(rename = "Pre-Chorus"))]
    PreChorus,
    Chorus,
    Bridge,
    Outro,
}

impl SectionType {
    pub fn label(&self) -> &'static str {
        match self {
            SectionType::Intro => "Intro",
            SectionType::Verse => "Verse",
            SectionType::PreChorus => "Pre-Chorus",
            SectionType::Chorus => "Chorus",
            SectionType::Bridge => "Bridge",
            SectionType::Outro => "Outro",
        }
    }
}

impl FromStr for SectionType {
    type Err = SongError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "intro" => Ok(SectionType::Intro),
            "verse" => Ok(SectionType::Verse),
            "prechorus" => Ok(SectionType::PreChorus),
            "chorus" => Ok(SectionType::Chorus),
            "bridge" => Ok(SectionType::Bridge),
            "outro" => Ok(SectionType::Outro),
            _ => Err(SongError::UnknownSectionType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A named segment of a song with its own chords and repeat count.
///
/// The bar count is always the number of chords; it is computed on demand
/// rather than stored, so chord edits cannot leave it stale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "SectionData"))]
pub struct Section {
    id: SectionId,
    pub name: String,
    pub section_type: SectionType,
    chords: Vec<ScaleDegreeChord>,
    loop_count: u8,
}

/// Wire form of a section, validated on the way in
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SectionData {
    id: SectionId,
    name: String,
    section_type: SectionType,
    #[serde(default)]
    chords: Vec<ScaleDegreeChord>,
    #[serde(default)]
    loop_count: Option<i64>,
}

#[cfg(feature = "serde")]
impl From<SectionData> for Section {
    fn from(data: SectionData) -> Self {
        let mut section = Section {
            id: data.id.reserve(),
            name: data.name,
            section_type: data.section_type,
            chords: data.chords,
            loop_count: MIN_LOOP_COUNT,
        };
        section.set_loop_count(data.loop_count.unwrap_or(MIN_LOOP_COUNT as i64));
        section
    }
}

impl Section {
    /// A section named after its type, played once
    pub fn new(section_type: SectionType, chords: Vec<ScaleDegreeChord>) -> Self {
        Section {
            id: SectionId::next(),
            name: section_type.label().to_string(),
            section_type,
            chords,
            loop_count: MIN_LOOP_COUNT,
        }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn chords(&self) -> &[ScaleDegreeChord] {
        &self.chords
    }

    pub fn chord(&self, index: usize) -> Option<&ScaleDegreeChord> {
        self.chords.get(index)
    }

    pub fn bars(&self) -> usize {
        self.chords.len()
    }

    pub fn loop_count(&self) -> u8 {
        self.loop_count
    }

    /// Set the repeat count, clamped to 1..=8
    pub fn set_loop_count(&mut self, count: i64) {
        self.loop_count = count.clamp(MIN_LOOP_COUNT as i64, MAX_LOOP_COUNT as i64) as u8;
    }

    pub fn push_chord(&mut self, chord: ScaleDegreeChord) {
        self.chords.push(chord);
    }

    /// Insert a chord before `index`; `index == bars()` appends
    pub fn insert_chord(&mut self, index: usize, chord: ScaleDegreeChord) -> Result<()> {
        if index > self.chords.len() {
            return Err(self.chord_out_of_range(index));
        }
        self.chords.insert(index, chord);
        Ok(())
    }

    pub fn remove_chord(&mut self, index: usize) -> Result<ScaleDegreeChord> {
        if index >= self.chords.len() {
            return Err(self.chord_out_of_range(index));
        }
        Ok(self.chords.remove(index))
    }

    pub fn edit_chord(&mut self, index: usize, edit: &ChordEdit) -> Result<()> {
        let len = self.chords.len();
        match self.chords.get_mut(index) {
            Some(chord) => chord.apply(edit),
            None => Err(SongError::ChordOutOfRange { index, len }),
        }
    }

    fn chord_out_of_range(&self, index: usize) -> SongError {
        SongError::ChordOutOfRange {
            index,
            len: self.chords.len(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.chords.iter().map(|c| c.symbol()).collect();
        write!(f, "{} [{}]", self.name, symbols.join(" | "))?;
        if self.loop_count > 1 {
            write!(f, " x{}", self.loop_count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::scale::{scale_chords, ScaleType};

    fn verse() -> Section {
        let chords = scale_chords("C", ScaleType::Major);
        Section::new(SectionType::Verse, chords[..4].to_vec())
    }

    #[test]
    fn test_section_ids_are_unique() {
        let a = Section::new(SectionType::Intro, vec![]);
        let b = Section::new(SectionType::Intro, vec![]);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name, "Intro");
    }

    #[test]
    fn test_bars_track_chord_count() {
        let mut section = verse();
        assert_eq!(section.bars(), 4);

        let extra = section.chords()[0].clone();
        section.push_chord(extra.clone());
        assert_eq!(section.bars(), 5);

        section.insert_chord(0, extra).unwrap();
        assert_eq!(section.bars(), 6);

        section.remove_chord(2).unwrap();
        assert_eq!(section.bars(), section.chords().len());
        assert_eq!(section.bars(), 5);

        assert!(section.remove_chord(5).is_err());
        assert_eq!(section.bars(), 5);
    }

    #[test]
    fn test_loop_count_clamped() {
        let mut section = verse();
        assert_eq!(section.loop_count(), 1);
        section.set_loop_count(0);
        assert_eq!(section.loop_count(), 1);
        section.set_loop_count(12);
        assert_eq!(section.loop_count(), 8);
        section.set_loop_count(3);
        assert_eq!(section.loop_count(), 3);
    }

    #[test]
    fn test_section_type_parsing() {
        assert_eq!("pre-chorus".parse::<SectionType>().unwrap(), SectionType::PreChorus);
        assert_eq!("PreChorus".parse::<SectionType>().unwrap(), SectionType::PreChorus);
        assert_eq!(SectionType::PreChorus.to_string(), "Pre-Chorus");
        assert!("coda".parse::<SectionType>().is_err());
    }

    #[test]
    fn test_display() {
        let mut section = verse();
        section.set_loop_count(2);
        assert_eq!(section.to_string(), "Verse [C | Dm | Em | F] x2");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_loaded_section_is_validated() {
        let json = r#"{"id": 1000000, "name": "Coda", "section_type": "Outro", "loop_count": 40}"#;
        let loaded: Section = serde_json::from_str(json).unwrap();
        assert_eq!(loaded.loop_count(), MAX_LOOP_COUNT);
        assert_eq!(loaded.bars(), 0);
        assert!(Section::new(SectionType::Verse, Vec::new()).id() > loaded.id());

        let original = verse();
        let copy: Section = serde_json::from_str(&serde_json::to_string(&original).unwrap()).unwrap();
        assert_eq!(copy, original);
    }
}
