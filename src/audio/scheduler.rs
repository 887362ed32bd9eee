//! Transport scheduler: owns the playback session
//!
//! A session goes Idle -> Priming -> Scheduled -> Running and back to Idle,
//! either when the terminal cue fires or when `stop()` is called. At most one
//! session is ever armed: `play` always stops the previous one first, and
//! every cue carries the number of the session that armed it.

use crate::audio::instrument::{ConsoleVoice, DrumKit, InstrumentVoice};
use crate::audio::transport::{Cue, Transport};
use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use songforge_core::compiler::{compile, PlaybackEvent, PlaybackTarget};
use songforge_core::types::chord::ScaleDegreeChord;
use songforge_core::types::drum::onsets;
use songforge_core::types::section::Section;
use songforge_core::types::settings::{InstrumentKind, PlaybackSettings};
use songforge_core::types::time::NoteValue;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Octave given to bare pitch names before they reach a voice
pub const DEFAULT_OCTAVE: i8 = 4;
/// Delay between successive notes of a strummed chord
pub const STRUM_SPACING_SECONDS: f64 = 0.05;
/// How far after "now" a previewed chord sounds
pub const PREVIEW_DELAY_SECONDS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// Warming up the audio context and waiting for voices
    Priming,
    /// Cues armed, transport not yet started
    Scheduled,
    Running,
    /// Inside `stop()`
    Cancelling,
}

/// Notification pushed to monitor subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackUpdate {
    Position { section: usize, chord: usize },
    Stopped,
}

/// Section and chord indices packed into one word so readers never see a
/// half-written position. Each half is an `i32`; -1 means idle.
const IDLE_POSITION: u64 = u64::MAX;

fn pack_position(section: i64, chord: i64) -> u64 {
    ((section as i32 as u32 as u64) << 32) | (chord as i32 as u32 as u64)
}

fn unpack_position(packed: u64) -> (i64, i64) {
    ((packed >> 32) as u32 as i32 as i64, packed as u32 as i32 as i64)
}

/// Read-only view of the playback position.
///
/// Cloning is cheap; every clone observes the same scheduler. Only the
/// scheduler that created the monitor writes to it.
#[derive(Debug, Clone)]
pub struct PlaybackMonitor {
    position: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    subscribers: Arc<Mutex<Vec<Sender<PlaybackUpdate>>>>,
}

impl PlaybackMonitor {
    fn new() -> Self {
        PlaybackMonitor {
            position: Arc::new(AtomicU64::new(IDLE_POSITION)),
            playing: Arc::new(AtomicBool::new(false)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Index of the sounding section, -1 when idle
    pub fn section_index(&self) -> i64 {
        self.indices().0
    }

    /// Index of the sounding chord within its section, -1 when idle
    pub fn chord_index(&self) -> i64 {
        self.indices().1
    }

    fn indices(&self) -> (i64, i64) {
        unpack_position(self.position.load(Ordering::Acquire))
    }

    pub fn position(&self) -> Option<(usize, usize)> {
        let (section, chord) = self.indices();
        Some((usize::try_from(section).ok()?, usize::try_from(chord).ok()?))
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Receive every position change and stop from now on
    pub fn subscribe(&self) -> Receiver<PlaybackUpdate> {
        let (tx, rx) = unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    fn publish_position(&self, section: usize, chord: usize) {
        self.position
            .store(pack_position(section as i64, chord as i64), Ordering::Release);
        self.notify(PlaybackUpdate::Position { section, chord });
    }

    fn reset(&self) {
        self.position.store(IDLE_POSITION, Ordering::Release);
        self.set_playing(false);
    }

    fn notify(&self, update: PlaybackUpdate) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            // Drop subscribers whose receiver has gone away
            subscribers.retain(|tx| tx.send(update).is_ok());
        }
    }
}

/// The chord voices a scheduler can play through
pub struct Voices {
    pub piano: Box<dyn InstrumentVoice>,
    pub guitar: Box<dyn InstrumentVoice>,
    pub drums: DrumKit,
}

impl Voices {
    pub fn console() -> Self {
        Voices {
            piano: Box::new(ConsoleVoice::new("piano")),
            guitar: Box::new(ConsoleVoice::new("guitar")),
            drums: DrumKit::console(),
        }
    }

    fn chord_voice(&mut self, kind: InstrumentKind) -> &mut Box<dyn InstrumentVoice> {
        match kind {
            InstrumentKind::Piano => &mut self.piano,
            InstrumentKind::Guitar => &mut self.guitar,
        }
    }

    fn release_all(&mut self) {
        self.piano.release_all();
        self.guitar.release_all();
        self.drums.release_all();
    }
}

/// Schedules compiled chord events onto a transport and fires them
pub struct TransportScheduler<T: Transport> {
    transport: T,
    voices: Voices,
    settings: PlaybackSettings,
    state: PlaybackState,
    session: u64,
    monitor: PlaybackMonitor,
}

impl<T: Transport> TransportScheduler<T> {
    pub fn new(transport: T, voices: Voices, settings: PlaybackSettings) -> Self {
        TransportScheduler {
            transport,
            voices,
            settings,
            state: PlaybackState::Idle,
            session: 0,
            monitor: PlaybackMonitor::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn monitor(&self) -> PlaybackMonitor {
        self.monitor.clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Settings changes take effect from the next `play`
    pub fn settings_mut(&mut self) -> &mut PlaybackSettings {
        &mut self.settings
    }

    /// Number of the current (or last) session
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn play_all(&mut self, sections: &[Section]) -> Result<()> {
        self.play(sections, PlaybackTarget::Song)
    }

    pub fn play_section(&mut self, sections: &[Section], index: usize) -> Result<()> {
        self.play(sections, PlaybackTarget::Section(index))
    }

    /// Start a new session, replacing any running one
    pub fn play(&mut self, sections: &[Section], target: PlaybackTarget) -> Result<()> {
        self.stop();

        let tempo = self.settings.tempo();
        let timeline = compile(sections, target, tempo, self.settings.drums_enabled)?;

        self.state = PlaybackState::Priming;
        self.prime();

        self.state = PlaybackState::Scheduled;
        self.session += 1;
        self.transport.set_bpm(tempo);
        self.voices.drums.set_volume(self.settings.drums.volume_db());

        let count = timeline.events.len();
        for event in timeline.events {
            self.transport
                .schedule(event.offset_seconds, self.session, Cue::Chord(event));
        }
        self.transport
            .schedule(timeline.total_duration_seconds, self.session, Cue::End);

        self.transport.start();
        self.monitor.set_playing(true);
        self.state = PlaybackState::Running;
        log::info!(
            "Session {}: {} chords, {:.2}s at {} BPM",
            self.session,
            count,
            timeline.total_duration_seconds,
            tempo
        );
        Ok(())
    }

    /// Warm up the transport and wait for voices; problems only degrade output
    fn prime(&mut self) {
        if let Err(e) = self.transport.warm_up() {
            log::warn!("Audio warm-up failed, continuing without sound: {:#}", e);
        }

        let timeout = self.settings.load_timeout;
        let voice = self.voices.chord_voice(self.settings.instrument);
        if !voice.is_loaded() && !voice.wait_until_loaded(timeout) {
            log::warn!(
                "{} voice not loaded after {:?}, continuing",
                self.settings.instrument,
                timeout
            );
        }
    }

    /// Halt playback and return to Idle. Safe to call in any state.
    pub fn stop(&mut self) {
        let was_playing = self.monitor.is_playing();
        self.state = PlaybackState::Cancelling;

        self.transport.stop();
        self.transport.cancel_from(0.0);
        self.voices.release_all();
        self.monitor.reset();

        self.state = PlaybackState::Idle;
        if was_playing {
            log::info!("Session {} stopped", self.session);
            self.monitor.notify(PlaybackUpdate::Stopped);
        }
    }

    /// Fire every due cue. Returns the number of chord cues fired.
    pub fn tick(&mut self) -> usize {
        if self.state != PlaybackState::Running {
            return 0;
        }

        let mut fired = 0;
        for scheduled in self.transport.take_due() {
            if scheduled.session != self.session {
                log::trace!("Dropping cue from session {}", scheduled.session);
                continue;
            }
            match scheduled.cue {
                Cue::Chord(event) => {
                    self.fire(&event);
                    fired += 1;
                }
                Cue::End => {
                    self.stop();
                    break;
                }
            }
        }
        fired
    }

    fn fire(&mut self, event: &PlaybackEvent) {
        self.monitor
            .publish_position(event.section_index, event.chord_index);
        log::debug!(
            "{:>8.3}s section {} chord {}: {}",
            event.offset_seconds,
            event.section_index,
            event.chord_index,
            event.chord.symbol()
        );

        let notes = voiced_notes(&event.chord);
        self.sound_chord(&notes, event.note_value, event.offset_seconds);

        if event.drum_trigger {
            let drums = self.settings.drums;
            for onset in onsets(
                self.transport.bpm(),
                drums.pattern,
                drums.complexity(),
                event.offset_seconds,
            ) {
                self.voices.drums.play(&onset);
            }
        }
    }

    fn sound_chord(&mut self, notes: &[String], duration: NoteValue, at: f64) {
        let kind = self.settings.instrument;
        let voice = self.voices.chord_voice(kind);
        match kind {
            InstrumentKind::Piano => voice.attack_release(notes, duration, at),
            InstrumentKind::Guitar => {
                for (i, note) in notes.iter().enumerate() {
                    let strum_at = at + i as f64 * STRUM_SPACING_SECONDS;
                    voice.attack_release(std::slice::from_ref(note), duration, strum_at);
                }
            }
        }
    }

    /// Audition one chord shortly after now, outside any session
    pub fn preview(&mut self, chord: &ScaleDegreeChord) {
        self.prime();
        let at = self.transport.now() + PREVIEW_DELAY_SECONDS;
        let notes = voiced_notes(chord);
        self.sound_chord(&notes, NoteValue::Half, at);
    }
}

impl<T: Transport + Default> TransportScheduler<T> {
    /// Scheduler on a fresh transport with logging voices
    pub fn with_console_voices(settings: PlaybackSettings) -> Self {
        Self::new(T::default(), Voices::console(), settings)
    }
}

/// Chord pitches with the default octave appended
pub fn voiced_notes(chord: &ScaleDegreeChord) -> Vec<String> {
    chord
        .notes()
        .iter()
        .map(|n| n.with_octave(DEFAULT_OCTAVE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::transport::ManualTransport;
    use songforge_core::types::scale::{scale_chords, ScaleType};
    use songforge_core::types::section::SectionType;

    fn sections() -> Vec<Section> {
        let chords = scale_chords("C", ScaleType::Major);
        vec![
            Section::new(SectionType::Verse, chords[..2].to_vec()),
            Section::new(SectionType::Chorus, chords[3..5].to_vec()),
        ]
    }

    fn scheduler() -> TransportScheduler<ManualTransport> {
        TransportScheduler::with_console_voices(PlaybackSettings::default())
    }

    #[test]
    fn test_voiced_notes() {
        let chord = scale_chords("A", ScaleType::Minor).remove(0);
        assert_eq!(voiced_notes(&chord), ["A4", "C4", "E4"]);
    }

    #[test]
    fn test_position_packing() {
        assert_eq!(unpack_position(IDLE_POSITION), (-1, -1));
        assert_eq!(unpack_position(pack_position(-1, -1)), (-1, -1));
        assert_eq!(unpack_position(pack_position(3, 12)), (3, 12));
        assert_eq!(unpack_position(pack_position(0, 0)), (0, 0));
    }

    #[test]
    fn test_position_is_never_torn() {
        use std::thread;

        let monitor = PlaybackMonitor::new();
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let monitor = monitor.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut torn = 0;
                while !done.load(Ordering::Acquire) {
                    if let Some(position) = monitor.position() {
                        if position != (0, 5) && position != (1, 0) {
                            torn += 1;
                        }
                    }
                }
                torn
            })
        };

        for _ in 0..100_000 {
            monitor.publish_position(0, 5);
            monitor.publish_position(1, 0);
        }
        done.store(true, Ordering::Release);

        assert_eq!(reader.join().unwrap(), 0);
        assert_eq!(monitor.position(), Some((1, 0)));
    }

    #[test]
    fn test_state_transitions() {
        let mut s = scheduler();
        assert_eq!(s.state(), PlaybackState::Idle);

        s.play_all(&sections()).unwrap();
        assert_eq!(s.state(), PlaybackState::Running);
        // four chords plus the terminal cue
        assert_eq!(s.transport().pending(), 5);

        s.stop();
        assert_eq!(s.state(), PlaybackState::Idle);
        assert_eq!(s.transport().pending(), 0);
    }

    #[test]
    fn test_position_follows_cues() {
        let mut s = scheduler();
        let monitor = s.monitor();
        s.play_all(&sections()).unwrap();
        assert!(monitor.is_playing());
        assert_eq!(monitor.position(), None);

        assert_eq!(s.tick(), 1);
        assert_eq!(monitor.position(), Some((0, 0)));

        // each whole note is two seconds at 120 BPM
        s.transport_mut().advance(4.0);
        assert_eq!(s.tick(), 2);
        assert_eq!(monitor.position(), Some((1, 0)));

        s.transport_mut().advance(4.0);
        assert_eq!(s.tick(), 1);
        assert_eq!(s.state(), PlaybackState::Idle);
        assert!(!monitor.is_playing());
        assert_eq!((monitor.section_index(), monitor.chord_index()), (-1, -1));
    }

    #[test]
    fn test_bad_section_leaves_scheduler_idle() {
        let mut s = scheduler();
        assert!(s.play_section(&sections(), 9).is_err());
        assert_eq!(s.state(), PlaybackState::Idle);
        assert_eq!(s.transport().pending(), 0);
    }
}
