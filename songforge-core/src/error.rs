use std::fmt;

/// Errors reported by the song model and the event compiler.
///
/// Recoverable audio-backend problems never surface here; these are caller
/// mistakes such as indexing a section that does not exist.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SongError {
    /// A note name such as `H#` that cannot be spelled
    InvalidPitch(String),
    /// A chord quality token outside the supported set
    UnknownQuality(String),
    UnknownScale(String),
    UnknownGenre(String),
    UnknownDrumPattern(String),
    UnknownSectionType(String),
    /// A chord duration that is zero or negative
    InvalidDuration(String),
    SectionOutOfRange { index: usize, len: usize },
    ChordOutOfRange { index: usize, len: usize },
}

impl fmt::Display for SongError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongError::InvalidPitch(s) => write!(f, "Invalid note name: {}", s),
            SongError::UnknownQuality(s) => write!(f, "Unknown chord quality: '{}'", s),
            SongError::UnknownScale(s) => write!(f, "Unknown scale type: {}", s),
            SongError::UnknownGenre(s) => write!(f, "Unknown genre: {}", s),
            SongError::UnknownDrumPattern(s) => write!(f, "Unknown drum pattern: {}", s),
            SongError::UnknownSectionType(s) => write!(f, "Unknown section type: {}", s),
            SongError::InvalidDuration(s) => {
                write!(f, "Chord duration must be a positive number of beats, got {}", s)
            }
            SongError::SectionOutOfRange { index, len } => {
                write!(f, "Section {} does not exist (song has {} sections)", index, len)
            }
            SongError::ChordOutOfRange { index, len } => {
                write!(f, "Chord {} does not exist (section has {} chords)", index, len)
            }
        }
    }
}

impl std::error::Error for SongError {}

pub type Result<T> = std::result::Result<T, SongError>;
