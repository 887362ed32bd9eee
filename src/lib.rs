//! # Songforge
//!
//! Generates multi-section songs from a key, scale and genre, and plays them
//! back with chords and drums on a shared transport timeline.
//!
//! The music theory, generator and event compiler live in `songforge-core`;
//! this crate adds the playback side and the interactive front end.
//!
//! ## Modules
//!
//! - `audio`: the transport abstraction, instrument voice contracts and the
//!   `TransportScheduler` that owns a playback session.
//! - `commands`: the REPL command registry and handlers.
//! - `repl`: the Read-Eval-Print Loop tying commands to a live scheduler.

pub mod audio;
pub mod commands;
pub mod repl;

// Re-export commonly used types for convenience
pub use crate::audio::{
    ManualTransport, PlaybackMonitor, PlaybackState, RealtimeTransport, Transport,
    TransportScheduler, Voices,
};
pub use songforge_core::{compile, Genre, PlaybackTarget, ScaleType, Song, SongError};
