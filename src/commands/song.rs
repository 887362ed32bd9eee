//! Song commands: generation, display and editing

use crate::commands::{parse_index, CommandContext, CommandResult};
use colored::*;
use songforge_core::types::chord::{ChordEdit, ChordQuality, NotationSystem, ScaleDegreeChord};
use songforge_core::types::note::PitchName;
use songforge_core::types::scale::scale_chords;
use songforge_core::types::section::SectionType;
use songforge_core::types::time::from_f64;
use songforge_core::types::{Genre, ScaleType, Song};

/// Handle `generate [key] [scale] [genre]`; omitted parts keep their values
pub fn cmd_generate(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let mut key_root = ctx.song.key_root.clone();
    let mut scale = ctx.song.scale;
    let mut genre = ctx.song.genre;

    if let Some(key) = parts.next() {
        match key.parse::<PitchName>() {
            Ok(pitch) => key_root = pitch.to_string(),
            Err(e) => return CommandResult::Error(e.to_string()),
        }
    }
    if let Some(s) = parts.next() {
        match s.parse::<ScaleType>() {
            Ok(parsed) => scale = parsed,
            Err(e) => return CommandResult::Error(e.to_string()),
        }
    }
    if let Some(g) = parts.next() {
        match g.parse::<Genre>() {
            Ok(parsed) => genre = parsed,
            Err(e) => return CommandResult::Error(e.to_string()),
        }
    }

    // The old sections are about to disappear
    if let Err(e) = ctx.with_player(|p| p.stop()) {
        return CommandResult::Error(e);
    }
    ctx.song = Song::generate(&mut ctx.generator, key_root, scale, genre);
    CommandResult::Message(render_song(ctx))
}

/// Handle `show`
pub fn cmd_show(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Message(render_song(ctx))
}

/// Handle `chords`: list the diatonic chords of the current key
pub fn cmd_chords(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let chords = scale_chords(&ctx.song.key_root, ctx.song.scale);
    if chords.is_empty() {
        return CommandResult::Error(format!("No chords for key '{}'", ctx.song.key_root));
    }
    let lines: Vec<String> = chords
        .iter()
        .map(|c| {
            format!(
                "  {} {:<5} {:<6} {}",
                c.degree().number().to_string().bright_black(),
                c.roman().cyan(),
                c.symbol(),
                c.function().name().bright_black()
            )
        })
        .collect();
    CommandResult::Message(lines.join("\n"))
}

/// Handle `notation [roman|standard|function]`
pub fn cmd_notation(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return match ctx.with_player(|p| p.settings().notation) {
            Ok(n) => CommandResult::Message(format!("Notation: {:?}", n).to_lowercase()),
            Err(e) => CommandResult::Error(e),
        };
    }
    let Some(notation) = NotationSystem::from_name(args) else {
        return CommandResult::Error("Notation must be roman, standard or function".to_string());
    };
    match ctx.with_player(|p| p.settings_mut().notation = notation) {
        Ok(()) => CommandResult::Message(render_song(ctx)),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `section add`
pub fn cmd_section_add(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let index = ctx.song.add_section();
    CommandResult::Message(format!("Added section {}", index + 1).bright_green().to_string())
}

/// Handle `section remove <n>`
pub fn cmd_section_remove(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let index = match parse_index(args.split_whitespace().next(), "section") {
        Ok(i) => i,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.song.remove_section(index) {
        Ok(section) => CommandResult::Message(format!("Removed {}", section.name)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `section move <from> <to>`
pub fn cmd_section_move(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let from = parse_index(parts.next(), "section");
    let to = parse_index(parts.next(), "target");
    let (from, to) = match (from, to) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return CommandResult::Error(e),
    };
    match ctx.song.move_section(from, to) {
        Ok(()) => CommandResult::Message(render_song(ctx)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `section rename <n> <name...>`
pub fn cmd_section_rename(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (index, name) = match args.split_once(' ') {
        Some((index, name)) if !name.trim().is_empty() => (index, name.trim()),
        _ => return CommandResult::Error("Usage: section rename <n> <name>".to_string()),
    };
    let index = match parse_index(Some(index), "section") {
        Ok(i) => i,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.song.rename_section(index, name) {
        Ok(()) => CommandResult::Success,
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `section type <n> <type>`
pub fn cmd_section_type(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let index = match parse_index(parts.next(), "section") {
        Ok(i) => i,
        Err(e) => return CommandResult::Error(e),
    };
    let section_type = match parts.next().map(str::parse::<SectionType>) {
        Some(Ok(t)) => t,
        Some(Err(e)) => return CommandResult::Error(e.to_string()),
        None => return CommandResult::Error("Usage: section type <n> <type>".to_string()),
    };
    match ctx.song.set_section_type(index, section_type) {
        Ok(()) => CommandResult::Success,
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `loop <section> <count>`; the count is clamped to 1-8
pub fn cmd_loop(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let index = match parse_index(parts.next(), "section") {
        Ok(i) => i,
        Err(e) => return CommandResult::Error(e),
    };
    let Some(Ok(count)) = parts.next().map(str::parse::<i64>) else {
        return CommandResult::Error("Usage: loop <section> <count>".to_string());
    };
    match ctx.song.set_loop_count(index, count) {
        Ok(applied) => CommandResult::Message(format!("Section {} plays {}x", index + 1, applied)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Diatonic chord on degree `arg` (1-7) of the song's key
fn diatonic_chord(song: &Song, arg: Option<&str>) -> Result<ScaleDegreeChord, String> {
    let degree = parse_index(arg, "degree")?;
    scale_chords(&song.key_root, song.scale)
        .into_iter()
        .nth(degree)
        .ok_or_else(|| format!("Degree must be between 1 and 7, got {}", degree + 1))
}

/// Handle `chord add <section> <degree>`
pub fn cmd_chord_add(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let section = match parse_index(parts.next(), "section") {
        Ok(i) => i,
        Err(e) => return CommandResult::Error(e),
    };
    let chord = match diatonic_chord(&ctx.song, parts.next()) {
        Ok(c) => c,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.song.add_chord(section, chord) {
        Ok(()) => CommandResult::Message(render_song(ctx)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `chord insert <section> <position> <degree>`
pub fn cmd_chord_insert(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let section = parse_index(parts.next(), "section");
    let position = parse_index(parts.next(), "chord");
    let (section, position) = match (section, position) {
        (Ok(s), Ok(p)) => (s, p),
        (Err(e), _) | (_, Err(e)) => return CommandResult::Error(e),
    };
    let chord = match diatonic_chord(&ctx.song, parts.next()) {
        Ok(c) => c,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.song.insert_chord(section, position, chord) {
        Ok(()) => CommandResult::Message(render_song(ctx)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `chord remove <section> <chord>`
pub fn cmd_chord_remove(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let section = parse_index(parts.next(), "section");
    let chord = parse_index(parts.next(), "chord");
    let (section, chord) = match (section, chord) {
        (Ok(s), Ok(c)) => (s, c),
        (Err(e), _) | (_, Err(e)) => return CommandResult::Error(e),
    };
    match ctx.song.remove_chord(section, chord) {
        Ok(removed) => CommandResult::Message(format!("Removed {}", removed.symbol())),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Parse `key=value` edit fields: root, quality, bass (or "none"), duration in beats
fn parse_edit(fields: &[&str]) -> Result<ChordEdit, String> {
    let mut edit = ChordEdit::default();
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            return Err(format!("Expected key=value, got '{}'", field));
        };
        match key {
            "root" => edit.root = Some(value.parse::<PitchName>().map_err(|e| e.to_string())?),
            "quality" => {
                edit.quality = Some(value.parse::<ChordQuality>().map_err(|e| e.to_string())?)
            }
            "bass" if value == "none" => edit.bass = Some(None),
            "bass" => edit.bass = Some(Some(value.parse::<PitchName>().map_err(|e| e.to_string())?)),
            "duration" => {
                let beats: f64 = value
                    .parse()
                    .map_err(|_| format!("Invalid duration: '{}'", value))?;
                edit.duration = Some(from_f64(beats));
            }
            other => return Err(format!("Unknown chord field '{}'", other)),
        }
    }
    Ok(edit)
}

/// Handle `chord edit <section> <chord> key=value...`
pub fn cmd_chord_edit(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 {
        return CommandResult::Error(
            "Usage: chord edit <section> <chord> [root=X] [quality=Q] [bass=X|none] [duration=beats]"
                .to_string(),
        );
    }
    let section = parse_index(Some(parts[0]), "section");
    let chord = parse_index(Some(parts[1]), "chord");
    let (section, chord) = match (section, chord) {
        (Ok(s), Ok(c)) => (s, c),
        (Err(e), _) | (_, Err(e)) => return CommandResult::Error(e),
    };
    let edit = match parse_edit(&parts[2..]) {
        Ok(edit) => edit,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.song.edit_chord(section, chord, &edit) {
        Ok(()) => CommandResult::Message(render_song(ctx)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Render the song with chords labelled in the current notation
fn render_song(ctx: &CommandContext) -> String {
    let notation = ctx
        .with_player(|p| p.settings().notation)
        .unwrap_or_default();
    let song = &ctx.song;

    let mut out = format!(
        "{} {} {}\n",
        song.key_root.bright_cyan().bold(),
        song.scale,
        format!("({})", song.genre).bright_black()
    );
    for (i, section) in song.sections().iter().enumerate() {
        let labels: Vec<String> = section.chords().iter().map(|c| c.label(notation)).collect();
        let repeat = if section.loop_count() > 1 {
            format!(" x{}", section.loop_count())
        } else {
            String::new()
        };
        out.push_str(&format!(
            "  {:>2}. {:<12} {}{}\n",
            i + 1,
            section.name.green(),
            labels.join(" | "),
            repeat.yellow()
        ));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::commands::create_registry;

    fn run(ctx: &mut CommandContext, line: &str) -> CommandResult {
        create_registry().execute(line, ctx)
    }

    #[test]
    fn test_generate_changes_key() {
        let mut ctx = context();
        assert!(matches!(run(&mut ctx, "generate Eb minor jazz"), CommandResult::Message(_)));
        assert_eq!(ctx.song.key_root, "Eb");
        assert_eq!(ctx.song.scale, ScaleType::Minor);
        assert_eq!(ctx.song.genre, Genre::Complex);
        assert!(!ctx.song.sections().is_empty());

        assert!(matches!(run(&mut ctx, "generate H"), CommandResult::Error(_)));
        assert_eq!(ctx.song.key_root, "Eb");
    }

    #[test]
    fn test_section_commands() {
        let mut ctx = context();
        let before = ctx.song.sections().len();
        run(&mut ctx, "section add");
        assert_eq!(ctx.song.sections().len(), before + 1);

        run(&mut ctx, &format!("section rename {} Big Finish", before + 1));
        assert_eq!(ctx.song.sections()[before].name, "Big Finish");

        run(&mut ctx, &format!("section type {} bridge", before + 1));
        assert_eq!(ctx.song.sections()[before].section_type, SectionType::Bridge);

        assert!(matches!(run(&mut ctx, "section remove 99"), CommandResult::Error(_)));
        run(&mut ctx, &format!("section remove {}", before + 1));
        assert_eq!(ctx.song.sections().len(), before);
    }

    #[test]
    fn test_loop_is_clamped() {
        let mut ctx = context();
        run(&mut ctx, "loop 1 42");
        assert_eq!(ctx.song.sections()[0].loop_count(), 8);
        assert!(matches!(run(&mut ctx, "loop 1 many"), CommandResult::Error(_)));
    }

    #[test]
    fn test_chord_commands() {
        let mut ctx = context();
        let bars = ctx.song.sections()[0].bars();

        run(&mut ctx, "chord add 1 5");
        assert_eq!(ctx.song.sections()[0].bars(), bars + 1);
        assert_eq!(ctx.song.sections()[0].chords()[bars].symbol(), "G");

        run(&mut ctx, "chord insert 1 1 2");
        assert_eq!(ctx.song.sections()[0].chords()[0].symbol(), "Dm");

        run(&mut ctx, "chord edit 1 1 quality=m7 bass=A duration=2");
        let chord = &ctx.song.sections()[0].chords()[0];
        assert_eq!(chord.symbol(), "Dm7/A");
        assert_eq!(chord.roman(), "ii7");
        assert_eq!(chord.note_value().token(), "2n");

        assert!(matches!(run(&mut ctx, "chord edit 1 1 quality=m13b5"), CommandResult::Error(_)));
        assert!(matches!(run(&mut ctx, "chord edit 1 1 duration=0"), CommandResult::Error(_)));
        assert!(matches!(run(&mut ctx, "chord add 1 9"), CommandResult::Error(_)));

        run(&mut ctx, "chord remove 1 1");
        assert_eq!(ctx.song.sections()[0].bars(), bars + 1);
    }

    #[test]
    fn test_parse_edit_fields() {
        let edit = parse_edit(&["root=F#", "bass=none"]).unwrap();
        assert_eq!(edit.root, Some("F#".parse().unwrap()));
        assert_eq!(edit.bass, Some(None));
        assert!(parse_edit(&["colour=red"]).is_err());
        assert!(parse_edit(&["root"]).is_err());
    }
}
