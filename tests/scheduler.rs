//! Session behavior of the transport scheduler on virtual time

use songforge::audio::transport::Cue;
use songforge::audio::{
    DrumKit, InstrumentVoice, ManualTransport, PercussionVoice, PlaybackState, PlaybackUpdate,
    Transport, TransportScheduler, Voices,
};
use songforge_core::types::drum::DrumPattern;
use songforge_core::types::scale::{scale_chords, ScaleType};
use songforge_core::types::section::{Section, SectionType};
use songforge_core::types::settings::{InstrumentKind, PlaybackSettings};
use songforge_core::types::time::NoteValue;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Triggers = Arc<Mutex<Vec<(Vec<String>, NoteValue, f64)>>>;

#[derive(Clone, Default)]
struct RecordingVoice {
    triggers: Triggers,
    releases: Arc<Mutex<usize>>,
    waits: Arc<Mutex<Vec<Duration>>>,
    unloaded: bool,
}

impl InstrumentVoice for RecordingVoice {
    fn attack_release(&mut self, notes: &[String], duration: NoteValue, at: f64) {
        self.triggers.lock().unwrap().push((notes.to_vec(), duration, at));
    }

    fn release_all(&mut self) {
        *self.releases.lock().unwrap() += 1;
    }

    fn is_loaded(&self) -> bool {
        !self.unloaded
    }

    fn wait_until_loaded(&mut self, timeout: Duration) -> bool {
        self.waits.lock().unwrap().push(timeout);
        !self.unloaded
    }
}

#[derive(Clone, Default)]
struct RecordingDrum {
    hits: Arc<Mutex<Vec<f64>>>,
    volumes: Arc<Mutex<Vec<f64>>>,
}

impl PercussionVoice for RecordingDrum {
    fn attack_release(&mut self, _pitch: Option<&str>, _duration: NoteValue, at: f64, _velocity: f64) {
        self.hits.lock().unwrap().push(at);
    }

    fn set_volume(&mut self, db: f64) {
        self.volumes.lock().unwrap().push(db);
    }
}

struct Rig {
    piano: RecordingVoice,
    guitar: RecordingVoice,
    kick: RecordingDrum,
    snare: RecordingDrum,
    hihat: RecordingDrum,
}

impl Rig {
    fn new() -> Self {
        Rig {
            piano: RecordingVoice::default(),
            guitar: RecordingVoice::default(),
            kick: RecordingDrum::default(),
            snare: RecordingDrum::default(),
            hihat: RecordingDrum::default(),
        }
    }

    fn voices(&self) -> Voices {
        Voices {
            piano: Box::new(self.piano.clone()),
            guitar: Box::new(self.guitar.clone()),
            drums: DrumKit::new(
                Box::new(self.kick.clone()),
                Box::new(self.snare.clone()),
                Box::new(self.hihat.clone()),
            ),
        }
    }

    fn scheduler(&self, settings: PlaybackSettings) -> TransportScheduler<ManualTransport> {
        TransportScheduler::new(ManualTransport::new(), self.voices(), settings)
    }
}

/// Verse: C Dm, Chorus: F G; whole notes, two seconds each at 120 BPM
fn sections() -> Vec<Section> {
    let chords = scale_chords("C", ScaleType::Major);
    vec![
        Section::new(SectionType::Verse, chords[..2].to_vec()),
        Section::new(SectionType::Chorus, chords[3..5].to_vec()),
    ]
}

fn quiet() -> PlaybackSettings {
    let mut settings = PlaybackSettings::default();
    settings.drums_enabled = false;
    settings
}

#[test]
fn stop_is_idempotent() {
    let rig = Rig::new();
    let mut s = rig.scheduler(quiet());
    let updates = s.monitor().subscribe();

    s.stop();
    s.stop();
    assert_eq!(s.state(), PlaybackState::Idle);
    // nothing was playing, so nobody hears about it
    assert!(updates.try_recv().is_err());

    s.play_all(&sections()).unwrap();
    s.stop();
    s.stop();
    assert_eq!(updates.try_recv(), Ok(PlaybackUpdate::Stopped));
    assert!(updates.try_recv().is_err());
}

#[test]
fn replay_keeps_a_single_session() {
    let rig = Rig::new();
    let mut s = rig.scheduler(quiet());
    let songs = sections();

    s.play_all(&songs).unwrap();
    s.transport_mut().advance(1.0);
    assert_eq!(s.tick(), 1);

    s.play_section(&songs, 1).unwrap();
    assert_eq!(s.session(), 2);
    // two chords plus the terminal cue; the first session's cues are gone
    assert_eq!(s.transport().pending(), 3);
    assert_eq!(s.transport().now(), 0.0);

    assert_eq!(s.tick(), 1);
    assert_eq!(s.monitor().position(), Some((1, 0)));
}

#[test]
fn stale_cues_are_ignored() {
    let rig = Rig::new();
    let mut s = rig.scheduler(quiet());
    s.play_all(&sections()).unwrap();
    s.play_all(&sections()).unwrap();

    let stale = s.session() - 1;
    s.transport_mut().schedule(0.0, stale, Cue::End);

    assert_eq!(s.tick(), 1);
    assert_eq!(s.state(), PlaybackState::Running);
    assert!(s.monitor().is_playing());
}

#[test]
fn failed_warm_up_still_schedules() {
    let rig = Rig::new();
    let mut s = TransportScheduler::new(
        ManualTransport::failing_warm_up("no audio device"),
        rig.voices(),
        quiet(),
    );

    s.play_all(&sections()).unwrap();
    assert_eq!(s.state(), PlaybackState::Running);
    assert_eq!(s.transport().pending(), 5);

    // warm-up is attempted again on the next play
    s.play_all(&sections()).unwrap();
    assert_eq!(s.transport().warm_up_calls(), 2);
}

#[test]
fn unloaded_voice_times_out_and_plays_on() {
    let mut rig = Rig::new();
    rig.piano.unloaded = true;
    let mut settings = quiet();
    settings.load_timeout = Duration::from_millis(10);
    let mut s = rig.scheduler(settings);

    s.play_all(&sections()).unwrap();
    assert_eq!(*rig.piano.waits.lock().unwrap(), [Duration::from_millis(10)]);
    assert_eq!(s.state(), PlaybackState::Running);
    assert_eq!(s.tick(), 1);
    assert_eq!(rig.piano.triggers.lock().unwrap().len(), 1);
}

#[test]
fn piano_plays_chords_as_blocks() {
    let rig = Rig::new();
    let mut s = rig.scheduler(quiet());
    s.play_all(&sections()).unwrap();
    s.tick();

    let triggers = rig.piano.triggers.lock().unwrap();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].0, ["C4", "E4", "G4"]);
    assert_eq!(triggers[0].1, NoteValue::Whole);
    assert_eq!(triggers[0].2, 0.0);
    assert!(rig.guitar.triggers.lock().unwrap().is_empty());
}

#[test]
fn guitar_strums_chords() {
    let rig = Rig::new();
    let mut settings = quiet();
    settings.instrument = InstrumentKind::Guitar;
    let mut s = rig.scheduler(settings);

    s.play_all(&sections()).unwrap();
    s.transport_mut().advance(2.0);
    assert_eq!(s.tick(), 2);

    let triggers = rig.guitar.triggers.lock().unwrap();
    let notes: Vec<&str> = triggers.iter().map(|t| t.0[0].as_str()).collect();
    assert_eq!(notes, ["C4", "E4", "G4", "D4", "F4", "A4"]);

    let expected = [0.0, 0.05, 0.1, 2.0, 2.05, 2.1];
    for (trigger, at) in triggers.iter().zip(expected) {
        assert_eq!(trigger.0.len(), 1);
        assert!((trigger.2 - at).abs() < 1e-9, "{} != {}", trigger.2, at);
    }
}

#[test]
fn drum_kit_volume_is_applied_on_play() {
    let rig = Rig::new();
    let mut s = rig.scheduler(PlaybackSettings::default());
    s.play_all(&sections()).unwrap();

    assert_eq!(*rig.kick.volumes.lock().unwrap(), [-10.0]);
    assert_eq!(*rig.snare.volumes.lock().unwrap(), [-15.0]);
    assert_eq!(*rig.hihat.volumes.lock().unwrap(), [-25.0]);
}

#[test]
fn drums_follow_each_chord() {
    let rig = Rig::new();
    let mut settings = PlaybackSettings::default();
    settings.drums.pattern = DrumPattern::Basic;
    settings.drums.set_complexity(0.0);
    let mut s = rig.scheduler(settings);

    s.play_all(&sections()).unwrap();
    s.transport_mut().advance(2.0);
    s.tick();

    // half a second per beat; the groove restarts with the second chord
    assert_eq!(*rig.kick.hits.lock().unwrap(), [0.0, 1.0, 2.0, 3.0]);
    assert_eq!(*rig.snare.hits.lock().unwrap(), [0.5, 1.5, 2.5, 3.5]);
    assert!(rig.hihat.hits.lock().unwrap().is_empty());
}

#[test]
fn no_drums_when_disabled() {
    let rig = Rig::new();
    let mut s = rig.scheduler(quiet());
    s.play_all(&sections()).unwrap();
    s.transport_mut().advance(8.0);
    s.tick();

    assert!(rig.kick.hits.lock().unwrap().is_empty());
    assert!(rig.snare.hits.lock().unwrap().is_empty());
}

#[test]
fn stop_releases_voices() {
    let rig = Rig::new();
    let mut s = rig.scheduler(quiet());
    s.play_all(&sections()).unwrap();
    let before = *rig.piano.releases.lock().unwrap();

    s.tick();
    s.stop();
    assert_eq!(*rig.piano.releases.lock().unwrap(), before + 1);
    assert_eq!(*rig.guitar.releases.lock().unwrap(), before + 1);
    assert_eq!(s.transport().pending(), 0);
}

#[test]
fn preview_sounds_a_half_note_shortly_after_now() {
    let rig = Rig::new();
    let mut s = rig.scheduler(quiet());
    let chord = scale_chords("C", ScaleType::Major).remove(4);

    s.preview(&chord);
    let triggers = rig.piano.triggers.lock().unwrap();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].0, ["G4", "B4", "D4"]);
    assert_eq!(triggers[0].1, NoteValue::Half);
    assert!((triggers[0].2 - 0.05).abs() < 1e-9);
    assert_eq!(s.state(), PlaybackState::Idle);
    assert!(!s.monitor().is_playing());
}

#[test]
fn subscribers_follow_a_whole_session() {
    let rig = Rig::new();
    let mut s = rig.scheduler(quiet());
    let updates = s.monitor().subscribe();
    let verse = vec![sections().remove(0)];

    s.play_all(&verse).unwrap();
    s.tick();
    s.transport_mut().advance(2.0);
    s.tick();
    s.transport_mut().advance(2.0);
    s.tick();

    let received: Vec<PlaybackUpdate> = updates.try_iter().collect();
    assert_eq!(
        received,
        [
            PlaybackUpdate::Position { section: 0, chord: 0 },
            PlaybackUpdate::Position { section: 0, chord: 1 },
            PlaybackUpdate::Stopped,
        ]
    );
    assert_eq!(s.state(), PlaybackState::Idle);
}
