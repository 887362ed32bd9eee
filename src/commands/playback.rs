//! Playback commands: play, stop, preview and playback settings

use crate::commands::{parse_index, CommandContext, CommandResult};
use colored::*;
use songforge_core::types::drum::DrumPattern;
use songforge_core::types::settings::InstrumentKind;

/// Handle `play`: the whole song
pub fn cmd_play(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if !args.is_empty() {
        return CommandResult::Error("Usage: play | play section <n>".to_string());
    }
    let sections = ctx.song.sections();
    match ctx.with_player(|p| p.play_all(sections)) {
        Ok(Ok(())) => CommandResult::Message("▶ Playing song".bright_green().to_string()),
        Ok(Err(e)) => CommandResult::Error(format!("{:#}", e)),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `play section <n>`
pub fn cmd_play_section(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let index = match parse_index(args.split_whitespace().next(), "section") {
        Ok(i) => i,
        Err(e) => return CommandResult::Error(e),
    };
    let sections = ctx.song.sections();
    match ctx.with_player(|p| p.play_section(sections, index)) {
        Ok(Ok(())) => CommandResult::Message(
            format!("▶ Playing {}", sections[index].name)
                .bright_green()
                .to_string(),
        ),
        Ok(Err(e)) => CommandResult::Error(format!("{:#}", e)),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `stop`
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.with_player(|p| p.stop()) {
        Ok(()) => CommandResult::Message("■ Stopped".to_string()),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `preview <section> <chord>`
pub fn cmd_preview(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let section = parse_index(parts.next(), "section");
    let chord = parse_index(parts.next(), "chord");
    let (section, chord) = match (section, chord) {
        (Ok(s), Ok(c)) => (s, c),
        (Err(e), _) | (_, Err(e)) => return CommandResult::Error(e),
    };
    let chord = match ctx.song.section(section) {
        Ok(s) => match s.chord(chord) {
            Some(c) => c.clone(),
            None => return CommandResult::Error(format!("Chord {} does not exist", chord + 1)),
        },
        Err(e) => return CommandResult::Error(e.to_string()),
    };
    match ctx.with_player(|p| p.preview(&chord)) {
        Ok(()) => CommandResult::Message(format!("♪ {}", chord)),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `status`
pub fn cmd_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let position = match ctx.monitor.position() {
        Some((section, chord)) => {
            let symbol = ctx
                .song
                .section(section)
                .ok()
                .and_then(|s| s.chord(chord))
                .map(|c| c.symbol().to_string())
                .unwrap_or_default();
            format!("section {}, chord {} {}", section + 1, chord + 1, symbol.cyan())
        }
        None => "stopped".to_string(),
    };
    let settings = match ctx.with_player(|p| p.settings().clone()) {
        Ok(s) => s,
        Err(e) => return CommandResult::Error(e),
    };
    let drums = if settings.drums_enabled {
        format!(
            "{} (complexity {:.0}, {:.1} dB)",
            settings.drums.pattern,
            settings.drums.complexity(),
            settings.drums.volume_db()
        )
    } else {
        "off".to_string()
    };
    CommandResult::Message(format!(
        "Playback: {}\nTempo: {:.0} BPM\nInstrument: {}\nDrums: {}",
        position,
        settings.tempo(),
        settings.instrument,
        drums
    ))
}

/// Handle `tempo [bpm]`; values outside 40-240 are clamped
pub fn cmd_tempo(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return match ctx.with_player(|p| p.settings().tempo()) {
            Ok(bpm) => CommandResult::Message(format!("Current tempo: {:.0} BPM", bpm)),
            Err(e) => CommandResult::Error(e),
        };
    }
    let Ok(bpm) = args.parse::<f64>() else {
        return CommandResult::Error(format!("Invalid tempo: '{}'", args));
    };
    match ctx.with_player(|p| {
        p.settings_mut().set_tempo(bpm);
        p.settings().tempo()
    }) {
        Ok(applied) => CommandResult::Message(
            format!("🎵 Tempo set to {:.0} BPM", applied)
                .bright_green()
                .to_string(),
        ),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `drums on|off`
pub fn cmd_drums(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let enabled = match args {
        "on" => true,
        "off" => false,
        _ => return CommandResult::Error("Usage: drums on|off".to_string()),
    };
    match ctx.with_player(|p| p.settings_mut().drums_enabled = enabled) {
        Ok(()) => CommandResult::Success,
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `pattern <basic|rock|jazz|funk>`
pub fn cmd_pattern(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let pattern = match args.parse::<DrumPattern>() {
        Ok(p) => p,
        Err(e) => return CommandResult::Error(e.to_string()),
    };
    match ctx.with_player(|p| p.settings_mut().drums.pattern = pattern) {
        Ok(()) => CommandResult::Message(format!("Drum pattern: {}", pattern)),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `complexity <0-100>`
pub fn cmd_complexity(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Ok(value) = args.parse::<f64>() else {
        return CommandResult::Error("Usage: complexity <0-100>".to_string());
    };
    match ctx.with_player(|p| {
        p.settings_mut().drums.set_complexity(value);
        p.settings().drums.complexity()
    }) {
        Ok(applied) => CommandResult::Message(format!("Drum complexity: {:.0}", applied)),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `volume <dB>` for the drum kit
pub fn cmd_volume(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Ok(db) = args.parse::<f64>() else {
        return CommandResult::Error("Usage: volume <-60..0 dB>".to_string());
    };
    match ctx.with_player(|p| {
        p.settings_mut().drums.set_volume_db(db);
        p.settings().drums.volume_db()
    }) {
        Ok(applied) => CommandResult::Message(format!("Drum volume: {:.1} dB", applied)),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `instrument <piano|guitar>`
pub fn cmd_instrument(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(kind) = InstrumentKind::from_name(args) else {
        return CommandResult::Error("Usage: instrument piano|guitar".to_string());
    };
    match ctx.with_player(|p| p.settings_mut().instrument = kind) {
        Ok(()) => CommandResult::Message(format!("Instrument: {}", kind)),
        Err(e) => CommandResult::Error(e),
    }
}
