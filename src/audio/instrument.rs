//! Instrument voice contracts and the logging console voices
//!
//! Sound generation lives outside this crate. A voice only has to accept
//! triggers at transport times; the console voices log them instead.

use songforge_core::types::drum::{DrumOnset, DrumSound};
use songforge_core::types::time::NoteValue;
use std::time::Duration;

/// A pitched, polyphonic voice (piano or guitar sampler)
pub trait InstrumentVoice: Send {
    /// Sound `notes` (with octaves, e.g. "C4") at transport time `at`
    fn attack_release(&mut self, notes: &[String], duration: NoteValue, at: f64);
    /// Silence every sounding note immediately
    fn release_all(&mut self);
    fn is_loaded(&self) -> bool;
    /// Block until loaded or until `timeout` passes; true when loaded
    fn wait_until_loaded(&mut self, timeout: Duration) -> bool;
}

/// A single drum voice (membrane, noise or metal synth)
pub trait PercussionVoice: Send {
    fn attack_release(&mut self, pitch: Option<&str>, duration: NoteValue, at: f64, velocity: f64);
    fn set_volume(&mut self, db: f64);
    fn release_all(&mut self) {}
}

/// Kick, snare and hi-hat voices with their relative levels
pub struct DrumKit {
    pub kick: Box<dyn PercussionVoice>,
    pub snare: Box<dyn PercussionVoice>,
    pub hihat: Box<dyn PercussionVoice>,
}

impl DrumKit {
    pub fn new(
        kick: Box<dyn PercussionVoice>,
        snare: Box<dyn PercussionVoice>,
        hihat: Box<dyn PercussionVoice>,
    ) -> Self {
        DrumKit { kick, snare, hihat }
    }

    pub fn console() -> Self {
        DrumKit::new(
            Box::new(ConsolePercussion::new("kick")),
            Box::new(ConsolePercussion::new("snare")),
            Box::new(ConsolePercussion::new("hihat")),
        )
    }

    fn voice_mut(&mut self, sound: DrumSound) -> &mut Box<dyn PercussionVoice> {
        match sound {
            DrumSound::Kick => &mut self.kick,
            DrumSound::Snare => &mut self.snare,
            DrumSound::HiHat => &mut self.hihat,
        }
    }

    /// Set the kit level; snare and hi-hat sit below the kick
    pub fn set_volume(&mut self, db: f64) {
        for sound in [DrumSound::Kick, DrumSound::Snare, DrumSound::HiHat] {
            self.voice_mut(sound).set_volume(db + sound.volume_offset_db());
        }
    }

    pub fn play(&mut self, onset: &DrumOnset) {
        self.voice_mut(onset.sound)
            .attack_release(onset.pitch, onset.note_value, onset.time, onset.velocity);
    }

    pub fn release_all(&mut self) {
        self.kick.release_all();
        self.snare.release_all();
        self.hihat.release_all();
    }
}

/// Chord voice that logs every trigger
#[derive(Debug, Clone)]
pub struct ConsoleVoice {
    name: &'static str,
    sounding: usize,
}

impl ConsoleVoice {
    pub fn new(name: &'static str) -> Self {
        ConsoleVoice { name, sounding: 0 }
    }
}

impl InstrumentVoice for ConsoleVoice {
    fn attack_release(&mut self, notes: &[String], duration: NoteValue, at: f64) {
        self.sounding += notes.len();
        log::debug!("[{}] {:>8.3}s {} ({})", self.name, at, notes.join(" "), duration);
    }

    fn release_all(&mut self) {
        if self.sounding > 0 {
            log::trace!("[{}] release {} notes", self.name, self.sounding);
        }
        self.sounding = 0;
    }

    fn is_loaded(&self) -> bool {
        true
    }

    fn wait_until_loaded(&mut self, _timeout: Duration) -> bool {
        true
    }
}

/// Drum voice that logs every hit
#[derive(Debug, Clone)]
pub struct ConsolePercussion {
    name: &'static str,
    volume_db: f64,
}

impl ConsolePercussion {
    pub fn new(name: &'static str) -> Self {
        ConsolePercussion {
            name,
            volume_db: 0.0,
        }
    }
}

impl PercussionVoice for ConsolePercussion {
    fn attack_release(&mut self, pitch: Option<&str>, duration: NoteValue, at: f64, velocity: f64) {
        log::trace!(
            "[{}] {:>8.3}s {} ({}) vel {:.2} @ {:.1} dB",
            self.name,
            at,
            pitch.unwrap_or("-"),
            duration,
            velocity,
            self.volume_db
        );
    }

    fn set_volume(&mut self, db: f64) {
        self.volume_db = db;
    }
}
