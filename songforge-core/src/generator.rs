//! Song structure and chord progression generation
//!
//! A song is built from one of a few fixed structure templates. Every distinct
//! section type gets one randomly chosen progression from the genre, so all
//! choruses (for example) start out identical, but each section owns its own
//! copy of the chords and can be edited independently afterwards.

use crate::types::chord::ScaleDegreeChord;
use crate::types::genre::Genre;
use crate::types::roman_numeral::ScaleDegree;
use crate::types::scale::{scale_chords, ScaleType};
use crate::types::section::{Section, SectionType};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, VecDeque};

/// Probability that a chord's quality is swapped for a palette entry
pub const SUBSTITUTION_PROBABILITY: f64 = 0.3;

use SectionType::*;

/// Fixed catalog of song layouts
pub const SONG_STRUCTURES: [&[SectionType]; 3] = [
    &[Intro, Verse, Chorus, Verse, Chorus, Bridge, Chorus, Outro],
    &[Intro, Verse, PreChorus, Chorus, Verse, PreChorus, Chorus, Bridge, Chorus, Outro],
    &[Verse, Chorus, Verse, Chorus, Outro],
];

/// Source of every random decision made while generating a song
pub trait Chooser {
    /// Uniform index in `0..len`; `len` is never zero
    fn pick(&mut self, len: usize) -> usize;
    /// True with the given probability
    fn chance(&mut self, probability: f64) -> bool;
}

/// Chooser backed by a real RNG
pub struct RngChooser<R: Rng> {
    rng: R,
}

impl<R: Rng> RngChooser<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

/// The production chooser: ChaCha8, seeded or from OS entropy
pub type SeededChooser = RngChooser<ChaCha8Rng>;

impl RngChooser<ChaCha8Rng> {
    /// Reproducible chooser: the same seed always yields the same song
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> Chooser for RngChooser<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}

/// Chooser that replays fixed answers, for exact-output tests.
///
/// Once a script runs dry it answers 0 and false.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChooser {
    picks: VecDeque<usize>,
    chances: VecDeque<bool>,
}

impl ScriptedChooser {
    pub fn new(picks: Vec<usize>, chances: Vec<bool>) -> Self {
        Self {
            picks: picks.into(),
            chances: chances.into(),
        }
    }
}

impl Chooser for ScriptedChooser {
    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0).min(len.saturating_sub(1))
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }
}

/// Turns (key, scale, genre) requests into section lists
pub struct ProgressionGenerator<C: Chooser> {
    chooser: C,
}

impl ProgressionGenerator<SeededChooser> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(RngChooser::seeded(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(RngChooser::from_entropy())
    }
}

impl<C: Chooser> ProgressionGenerator<C> {
    pub fn new(chooser: C) -> Self {
        Self { chooser }
    }

    /// Generate a full song on a randomly chosen structure template
    pub fn generate(&mut self, key_root: &str, scale: ScaleType, genre: Genre) -> Vec<Section> {
        let template = SONG_STRUCTURES[self.chooser.pick(SONG_STRUCTURES.len())];
        self.generate_with_template(template, key_root, scale, genre)
    }

    /// Generate a song on the given structure
    pub fn generate_with_template(
        &mut self,
        template: &[SectionType],
        key_root: &str,
        scale: ScaleType,
        genre: Genre,
    ) -> Vec<Section> {
        let diatonic = scale_chords(key_root, scale);
        if diatonic.is_empty() {
            log::warn!(
                "No diatonic chords for {} {}; sections will be empty",
                key_root,
                scale
            );
        }

        // One progression per distinct type, in order of first appearance
        let mut progressions: HashMap<SectionType, Vec<ScaleDegreeChord>> = HashMap::new();
        for &section_type in template {
            if !progressions.contains_key(&section_type) {
                let chords = self.progression(&diatonic, genre);
                progressions.insert(section_type, chords);
            }
        }

        log::debug!(
            "Generated {} sections ({} distinct) in {} {} / {}",
            template.len(),
            progressions.len(),
            key_root,
            scale,
            genre.key()
        );

        template
            .iter()
            .map(|section_type| {
                let chords = progressions.get(section_type).cloned().unwrap_or_default();
                Section::new(*section_type, chords)
            })
            .collect()
    }

    /// Pick one of the genre's progressions and realize it in the key
    fn progression(&mut self, diatonic: &[ScaleDegreeChord], genre: Genre) -> Vec<ScaleDegreeChord> {
        let descriptor = genre.descriptor();
        let template = descriptor.progressions[self.chooser.pick(descriptor.progressions.len())];
        let palette = descriptor.quality_palette;

        let mut chords = Vec::with_capacity(template.degrees.len());
        for &number in template.degrees {
            let Some(degree) = ScaleDegree::from_number(number) else {
                continue;
            };
            let Some(base) = diatonic.get(degree.index()) else {
                continue;
            };
            let mut chord = base.clone();

            if !palette.is_empty() && self.chooser.chance(SUBSTITUTION_PROBABILITY) {
                if let Some(quality) = palette[self.chooser.pick(palette.len())] {
                    if quality != chord.quality() {
                        // Symbol, notes and numeral follow the new quality (ii -> ii7);
                        // degree and function stay on the diatonic chord.
                        chord.set_quality(quality);
                    }
                }
            }

            if let Some(quality) = genre.forced_quality(degree) {
                chord.set_quality(quality);
            }

            chords.push(chord);
        }
        chords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::chord::ChordQuality;

    fn symbols(section: &Section) -> Vec<&str> {
        section.chords().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_scripted_generation_is_exact() {
        // template 2 (short), Verse -> progression 0, Chorus -> progression 2
        let chooser = ScriptedChooser::new(vec![2, 0, 2], vec![]);
        let sections = ProgressionGenerator::new(chooser).generate("C", ScaleType::Major, Genre::Pop);

        let types: Vec<SectionType> = sections.iter().map(|s| s.section_type).collect();
        assert_eq!(types, [Verse, Chorus, Verse, Chorus, Outro]);
        assert_eq!(symbols(&sections[0]), ["C", "G", "Am", "F"]);
        assert_eq!(symbols(&sections[1]), ["Am", "F", "C", "G"]);
        // Outro drew pick 0 from the exhausted script
        assert_eq!(symbols(&sections[4]), ["C", "G", "Am", "F"]);
    }

    #[test]
    fn test_substitution_rederives_chord() {
        // short template, then Verse: progression 0, first chord substituted with add9
        let chooser = ScriptedChooser::new(vec![2, 0, 2], vec![true]);
        let sections = ProgressionGenerator::new(chooser).generate("C", ScaleType::Major, Genre::Pop);
        let first = &sections[0].chords()[0];
        assert_eq!(first.quality(), ChordQuality::Add9);
        assert_eq!(first.symbol(), "Cadd9");
        let notes: Vec<String> = first.notes().iter().map(|n| n.to_string()).collect();
        assert_eq!(notes, ["C", "E", "G", "D"]);
        assert_eq!(first.degree(), ScaleDegree::I);
        assert_eq!(first.roman(), "I");
    }

    #[test]
    fn test_keep_entry_leaves_quality() {
        // Palette entry 0 of pop means "keep": A minor stays A minor
        let chooser = ScriptedChooser::new(vec![2, 2, 0], vec![true]);
        let sections = ProgressionGenerator::new(chooser).generate("C", ScaleType::Major, Genre::Pop);
        assert_eq!(sections[0].chords()[0].symbol(), "Am");
    }

    #[test]
    fn test_same_type_sections_are_equal_but_independent() {
        let mut generator = ProgressionGenerator::seeded(7);
        let mut sections = generator.generate("G", ScaleType::Major, Genre::Emotional);

        let choruses: Vec<usize> = sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.section_type == Chorus)
            .map(|(i, _)| i)
            .collect();
        assert!(choruses.len() >= 2);
        assert_eq!(sections[choruses[0]].chords(), sections[choruses[1]].chords());

        sections[choruses[0]].remove_chord(0).unwrap();
        assert_ne!(sections[choruses[0]].bars(), sections[choruses[1]].bars());
    }

    #[test]
    fn test_bars_and_loop_count_defaults() {
        let mut generator = ProgressionGenerator::seeded(42);
        for section in generator.generate("D", ScaleType::Minor, Genre::Rock) {
            assert_eq!(section.bars(), section.chords().len());
            assert_eq!(section.loop_count(), 1);
            assert_eq!(section.name, section.section_type.label());
        }
    }

    #[test]
    fn test_jazz_overrides_always_win() {
        for seed in 0..50 {
            let mut generator = ProgressionGenerator::seeded(seed);
            for section in generator.generate("Eb", ScaleType::Major, Genre::Complex) {
                for chord in section.chords() {
                    let expected = match chord.degree().number() {
                        1 | 4 => Some(ChordQuality::Major7),
                        2 | 3 | 6 => Some(ChordQuality::Minor7),
                        5 => Some(ChordQuality::Dominant7),
                        _ => None,
                    };
                    if let Some(quality) = expected {
                        assert_eq!(chord.quality(), quality, "seed {}", seed);
                    }
                }
            }
        }
    }

    #[test]
    fn test_invalid_key_gives_empty_sections() {
        let mut generator = ProgressionGenerator::seeded(1);
        let sections = generator.generate("Q", ScaleType::Major, Genre::Pop);
        assert!(!sections.is_empty());
        assert!(sections.iter().all(|s| s.bars() == 0));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = ProgressionGenerator::seeded(99).generate("A", ScaleType::Minor, Genre::Pop);
        let b = ProgressionGenerator::seeded(99).generate("A", ScaleType::Minor, Genre::Pop);
        let a: Vec<Vec<&str>> = a.iter().map(symbols).collect();
        let b: Vec<Vec<&str>> = b.iter().map(symbols).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_templates_cover_short_and_long_layouts() {
        assert!(SONG_STRUCTURES.iter().any(|t| t.len() == 5));
        assert!(SONG_STRUCTURES
            .iter()
            .any(|t| (8..=10).contains(&t.len()) && t.contains(&PreChorus)));
    }
}
