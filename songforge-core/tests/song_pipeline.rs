//! End-to-end checks: generate a song, edit it, compile it for playback.

use songforge_core::compiler::{compile, PlaybackTarget};
use songforge_core::generator::{ProgressionGenerator, ScriptedChooser};
use songforge_core::types::chord::{ChordEdit, ChordQuality};
use songforge_core::types::drum::{onsets, DrumPattern};
use songforge_core::types::time::beats_ratio;
use songforge_core::types::{Genre, ScaleType, SectionType, Song};

#[test]
fn test_generated_song_compiles_in_order() {
    for genre in Genre::ALL {
        let mut generator = ProgressionGenerator::seeded(2024);
        let song = Song::generate(&mut generator, "Bb", ScaleType::Major, genre);
        let timeline = compile(song.sections(), PlaybackTarget::Song, 96.0, true).unwrap();

        assert_eq!(timeline.events.len(), song.total_bars());
        assert!(timeline
            .events
            .windows(2)
            .all(|w| w[0].offset_seconds < w[1].offset_seconds));
        // every chord is a whole note at 96 BPM
        let expected = song.total_bars() as f64 * 4.0 * 60.0 / 96.0;
        assert!((timeline.total_duration_seconds - expected).abs() < 1e-9);
    }
}

#[test]
fn test_flat_keys_are_spelled_with_flats() {
    let mut generator = ProgressionGenerator::new(ScriptedChooser::new(vec![2, 0], vec![]));
    let song = Song::generate(&mut generator, "Bb", ScaleType::Major, Genre::Pop);
    let tonic = &song.sections()[0].chords()[0];
    let notes: Vec<String> = tonic.notes().iter().map(|n| n.to_string()).collect();
    assert_eq!(notes, ["Bb", "D", "F"]);
}

#[test]
fn test_edits_flow_into_the_timeline() {
    let mut generator = ProgressionGenerator::new(ScriptedChooser::new(vec![2, 0, 2], vec![]));
    let mut song = Song::generate(&mut generator, "C", ScaleType::Major, Genre::Pop);

    song.set_loop_count(0, 2).unwrap();
    song.edit_chord(
        0,
        3,
        &ChordEdit {
            quality: Some(ChordQuality::Major7),
            duration: Some(beats_ratio(1, 2)),
            ..ChordEdit::default()
        },
    )
    .unwrap();

    let timeline = compile(song.sections(), PlaybackTarget::Section(0), 120.0, false).unwrap();
    assert_eq!(timeline.events.len(), 8);
    // three whole notes plus an eighth, twice
    assert_eq!(timeline.total_duration_seconds, 2.0 * (3.0 * 2.0 + 0.25));
    assert_eq!(timeline.events[3].chord.symbol(), "Fmaj7");
    assert_eq!(timeline.events[3].note_value.token(), "8n");
    assert_eq!(timeline.events[4].chord_index, 0);
}

#[test]
fn test_manual_section_has_no_events() {
    let mut song = Song::new("E", ScaleType::Minor, Genre::Rock);
    let index = song.add_section();
    assert_eq!(song.sections()[index].section_type, SectionType::Verse);
    let timeline = compile(song.sections(), PlaybackTarget::Section(index), 120.0, true).unwrap();
    assert!(timeline.is_empty());
}

#[test]
fn test_drum_bar_lines_up_with_chord_offsets() {
    let mut generator = ProgressionGenerator::seeded(5);
    let song = Song::generate(&mut generator, "A", ScaleType::Minor, Genre::Rock);
    let timeline = compile(song.sections(), PlaybackTarget::Section(0), 100.0, true).unwrap();

    for event in &timeline.events {
        let bar = onsets(100.0, DrumPattern::Rock, 50.0, event.offset_seconds);
        let first = bar.iter().map(|o| o.time).fold(f64::INFINITY, f64::min);
        assert_eq!(first, event.offset_seconds);
    }
}
