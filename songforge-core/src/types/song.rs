use crate::error::{Result, SongError};
use crate::generator::{Chooser, ProgressionGenerator};
use crate::types::chord::{ChordEdit, ScaleDegreeChord};
use crate::types::genre::Genre;
use crate::types::scale::ScaleType;
use crate::types::section::{Section, SectionType};
use std::fmt;

/// Name given to sections added by hand
pub const NEW_SECTION_NAME: &str = "New Section";

/// A key, a genre, and the ordered sections generated for them.
///
/// All edits go through index-checked methods so that callers get a typed
/// error instead of a panic on a stale index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Song {
    pub key_root: String,
    pub scale: ScaleType,
    pub genre: Genre,
    sections: Vec<Section>,
}

impl Song {
    pub fn new(key_root: impl Into<String>, scale: ScaleType, genre: Genre) -> Self {
        Song {
            key_root: key_root.into(),
            scale,
            genre,
            sections: Vec::new(),
        }
    }

    /// Build a song and fill it with freshly generated sections
    pub fn generate<C: Chooser>(
        generator: &mut ProgressionGenerator<C>,
        key_root: impl Into<String>,
        scale: ScaleType,
        genre: Genre,
    ) -> Self {
        let mut song = Song::new(key_root, scale, genre);
        song.regenerate(generator);
        song
    }

    /// Replace every section with a new generation in the current key
    pub fn regenerate<C: Chooser>(&mut self, generator: &mut ProgressionGenerator<C>) {
        self.sections = generator.generate(&self.key_root, self.scale, self.genre);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Result<&Section> {
        let len = self.sections.len();
        self.sections
            .get(index)
            .ok_or(SongError::SectionOutOfRange { index, len })
    }

    fn section_mut(&mut self, index: usize) -> Result<&mut Section> {
        let len = self.sections.len();
        self.sections
            .get_mut(index)
            .ok_or(SongError::SectionOutOfRange { index, len })
    }

    /// Total chord count across sections, ignoring repeats
    pub fn total_bars(&self) -> usize {
        self.sections.iter().map(|s| s.bars()).sum()
    }

    /// Append an empty verse and return its index
    pub fn add_section(&mut self) -> usize {
        let mut section = Section::new(SectionType::Verse, Vec::new());
        section.name = NEW_SECTION_NAME.to_string();
        self.sections.push(section);
        self.sections.len() - 1
    }

    pub fn remove_section(&mut self, index: usize) -> Result<Section> {
        self.section(index)?;
        Ok(self.sections.remove(index))
    }

    /// Move a section to a new position.
    ///
    /// A target outside the list leaves the song unchanged; only the source
    /// index is a hard error.
    pub fn move_section(&mut self, from: usize, to: usize) -> Result<()> {
        self.section(from)?;
        if to >= self.sections.len() || from == to {
            return Ok(());
        }
        let section = self.sections.remove(from);
        self.sections.insert(to, section);
        Ok(())
    }

    pub fn rename_section(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.section_mut(index)?.name = name.into();
        Ok(())
    }

    pub fn set_section_type(&mut self, index: usize, section_type: SectionType) -> Result<()> {
        self.section_mut(index)?.section_type = section_type;
        Ok(())
    }

    /// Set a section's repeat count; the value is clamped to 1..=8
    pub fn set_loop_count(&mut self, index: usize, count: i64) -> Result<u8> {
        let section = self.section_mut(index)?;
        section.set_loop_count(count);
        Ok(section.loop_count())
    }

    pub fn add_chord(&mut self, section: usize, chord: ScaleDegreeChord) -> Result<()> {
        self.section_mut(section)?.push_chord(chord);
        Ok(())
    }

    pub fn insert_chord(&mut self, section: usize, index: usize, chord: ScaleDegreeChord) -> Result<()> {
        self.section_mut(section)?.insert_chord(index, chord)
    }

    pub fn remove_chord(&mut self, section: usize, index: usize) -> Result<ScaleDegreeChord> {
        self.section_mut(section)?.remove_chord(index)
    }

    pub fn edit_chord(&mut self, section: usize, index: usize, edit: &ChordEdit) -> Result<()> {
        self.section_mut(section)?.edit_chord(index, edit)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} ({})", self.key_root, self.scale, self.genre)?;
        for (i, section) in self.sections.iter().enumerate() {
            writeln!(f, "  {:>2}. {}", i + 1, section)?;
        }
        Ok(())
    }
}
