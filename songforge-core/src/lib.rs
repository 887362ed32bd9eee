//! # Songforge Core
//!
//! Music theory, song generation and event compilation for Songforge.
//! Pure logic: no audio, no terminal I/O.
//!
//! ## Features
//!
//! - **serde**: Enable JSON (de)serialization of songs and settings
//! - **colored**: Enable colored terminal output for chord display
//!
//! ## Example
//!
//! ```ignore
//! use songforge_core::generator::ProgressionGenerator;
//! use songforge_core::compiler::{compile, PlaybackTarget};
//! use songforge_core::types::{Genre, ScaleType, Song};
//!
//! let mut generator = ProgressionGenerator::seeded(7);
//! let song = Song::generate(&mut generator, "D", ScaleType::Minor, Genre::Rock);
//! let timeline = compile(song.sections(), PlaybackTarget::Song, 110.0, true)?;
//! ```

pub mod compiler;
pub mod error;
pub mod generator;
pub mod types;

// Re-export commonly used types
pub use compiler::{compile, PlaybackEvent, PlaybackTarget, Timeline};
pub use error::SongError;
pub use generator::{Chooser, ProgressionGenerator};
pub use types::{Genre, ScaleDegreeChord, ScaleType, Section, Song};
