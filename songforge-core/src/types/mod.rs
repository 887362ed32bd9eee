// songforge-core/src/types/mod.rs

pub mod chord;
pub mod drum;
pub mod genre;
pub mod note;
pub mod roman_numeral;
pub mod scale;
pub mod section;
pub mod settings;
pub mod song;
pub mod time;

pub use chord::{ChordEdit, ChordQuality, NotationSystem, ScaleDegreeChord};
pub use drum::{DrumOnset, DrumPattern, DrumSound};
pub use genre::Genre;
pub use note::PitchName;
pub use roman_numeral::*;
pub use scale::ScaleType;
pub use section::{Section, SectionId, SectionType};
pub use settings::{DrumSettings, InstrumentKind, PlaybackSettings};
pub use song::Song;
pub use time::{Beats, NoteValue};
