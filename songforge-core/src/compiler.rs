//! Turns sections into a flat, timed list of playback events
//!
//! Offsets are seconds from the start of the session. Each chord occurrence
//! (including loop repeats) becomes one event; the drum pattern restarts on
//! every chord.

use crate::error::{Result, SongError};
use crate::types::chord::ScaleDegreeChord;
use crate::types::section::Section;
use crate::types::settings::clamp_tempo;
use crate::types::time::{to_f64, NoteValue};

/// What a play request covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    Song,
    Section(usize),
}

/// One chord onset on the transport timeline
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    pub offset_seconds: f64,
    pub section_index: usize,
    pub chord_index: usize,
    pub chord: ScaleDegreeChord,
    pub note_value: NoteValue,
    /// Play one bar of the drum pattern starting at this event
    pub drum_trigger: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    pub events: Vec<PlaybackEvent>,
    pub total_duration_seconds: f64,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Seconds per beat at a (clamped) tempo
pub fn beat_seconds(tempo_bpm: f64) -> f64 {
    60.0 / clamp_tempo(tempo_bpm)
}

/// Compile the targeted sections into events.
///
/// Section indices in the events always refer to positions in `sections`,
/// also when a single section is targeted.
pub fn compile(
    sections: &[Section],
    target: PlaybackTarget,
    tempo_bpm: f64,
    drums: bool,
) -> Result<Timeline> {
    let range = match target {
        PlaybackTarget::Song => 0..sections.len(),
        PlaybackTarget::Section(index) if index < sections.len() => index..index + 1,
        PlaybackTarget::Section(index) => {
            return Err(SongError::SectionOutOfRange {
                index,
                len: sections.len(),
            })
        }
    };

    let beat = beat_seconds(tempo_bpm);
    let mut offset = 0.0;
    let mut events = Vec::new();

    for section_index in range {
        let section = &sections[section_index];
        for _ in 0..section.loop_count() {
            for (chord_index, chord) in section.chords().iter().enumerate() {
                events.push(PlaybackEvent {
                    offset_seconds: offset,
                    section_index,
                    chord_index,
                    chord: chord.clone(),
                    note_value: chord.note_value(),
                    drum_trigger: drums,
                });
                offset += beat * to_f64(chord.duration());
            }
        }
    }

    log::debug!(
        "Compiled {} events, {:.3}s at {} BPM",
        events.len(),
        offset,
        clamp_tempo(tempo_bpm)
    );

    Ok(Timeline {
        events,
        total_duration_seconds: offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::scale::{scale_chords, ScaleType};
    use crate::types::section::SectionType;
    use crate::types::time::{beats, beats_ratio};

    fn section_with_durations(durations: &[(i64, i64)]) -> Section {
        let diatonic = scale_chords("C", ScaleType::Major);
        let chords = durations
            .iter()
            .zip(diatonic)
            .map(|(&(n, d), mut chord)| {
                chord.set_duration(beats_ratio(n, d)).unwrap();
                chord
            })
            .collect();
        Section::new(SectionType::Verse, chords)
    }

    #[test]
    fn test_mixed_durations_total() {
        let section = section_with_durations(&[(4, 1), (2, 1), (1, 1), (1, 2)]);
        let timeline = compile(&[section], PlaybackTarget::Song, 120.0, true).unwrap();

        assert_eq!(timeline.total_duration_seconds, 3.75);
        let offsets: Vec<f64> = timeline.events.iter().map(|e| e.offset_seconds).collect();
        assert_eq!(offsets, [0.0, 2.0, 3.0, 3.5]);
        let tokens: Vec<&str> = timeline.events.iter().map(|e| e.note_value.token()).collect();
        assert_eq!(tokens, ["1n", "2n", "4n", "8n"]);
        assert!(timeline.events.iter().all(|e| e.drum_trigger));
    }

    #[test]
    fn test_loops_repeat_chords() {
        let mut section = section_with_durations(&[(4, 1), (4, 1)]);
        section.set_loop_count(3);
        let timeline = compile(&[section], PlaybackTarget::Song, 60.0, false).unwrap();

        assert_eq!(timeline.events.len(), 6);
        let chord_indices: Vec<usize> = timeline.events.iter().map(|e| e.chord_index).collect();
        assert_eq!(chord_indices, [0, 1, 0, 1, 0, 1]);
        assert_eq!(timeline.total_duration_seconds, 24.0);
        assert!(timeline.events.iter().all(|e| !e.drum_trigger));
    }

    #[test]
    fn test_single_section_keeps_song_index() {
        let sections = vec![
            section_with_durations(&[(4, 1)]),
            section_with_durations(&[(2, 1), (2, 1)]),
        ];
        let timeline = compile(&sections, PlaybackTarget::Section(1), 120.0, true).unwrap();
        assert_eq!(timeline.events.len(), 2);
        assert!(timeline.events.iter().all(|e| e.section_index == 1));
        assert_eq!(timeline.events[0].offset_seconds, 0.0);
        assert_eq!(timeline.total_duration_seconds, 2.0);
    }

    #[test]
    fn test_out_of_range_section() {
        let sections = vec![section_with_durations(&[(4, 1)])];
        assert_eq!(
            compile(&sections, PlaybackTarget::Section(3), 120.0, true),
            Err(SongError::SectionOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_tempo_is_clamped() {
        let section = section_with_durations(&[(4, 1)]);
        let fast = compile(std::slice::from_ref(&section), PlaybackTarget::Song, 1000.0, true).unwrap();
        assert_eq!(fast.total_duration_seconds, 1.0);
        let slow = compile(&[section], PlaybackTarget::Song, 1.0, true).unwrap();
        assert_eq!(slow.total_duration_seconds, 6.0);
    }

    #[test]
    fn test_odd_durations_play_as_whole_notes() {
        let mut section = section_with_durations(&[(3, 1)]);
        section.push_chord(scale_chords("C", ScaleType::Major).remove(0));
        let timeline = compile(&[section], PlaybackTarget::Song, 120.0, true).unwrap();
        assert_eq!(timeline.events[0].note_value, NoteValue::Whole);
        assert_eq!(timeline.events[0].chord.duration(), beats(3));
        assert_eq!(timeline.events[1].offset_seconds, 1.5);
    }

    #[test]
    fn test_empty_sections() {
        let timeline = compile(&[], PlaybackTarget::Song, 120.0, true).unwrap();
        assert!(timeline.is_empty());
        assert_eq!(timeline.total_duration_seconds, 0.0);
    }
}
