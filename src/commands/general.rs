//! General REPL commands (help, quit)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let _ = ctx.with_player(|p| p.stop());
    CommandResult::Exit
}

/// Print help information
fn print_help() {
    println!("{}", "🎵 Songforge Help".bold());
    println!("{}", "=================".bold());
    println!();
    println!("{}", "Song:".green());
    println!(
        "  {}  - New song (e.g. generate D minor rock)",
        "generate [key] [scale] [genre]".cyan()
    );
    println!("  {}                            - Show the current song", "show".cyan());
    println!("  {}                          - Diatonic chords of the key", "chords".cyan());
    println!(
        "  {}   - Chord labels",
        "notation roman|standard|function".cyan()
    );
    println!();
    println!("{}", "Sections (numbered from 1):".green());
    println!("  {}                     - Append an empty verse", "section add".cyan());
    println!("  {}              - Delete a section", "section remove <n>".cyan());
    println!("  {}      - Reorder sections", "section move <from> <to>".cyan());
    println!("  {}     - Rename a section", "section rename <n> <name>".cyan());
    println!("  {}       - Change the section type", "section type <n> <type>".cyan());
    println!("  {}           - Repeat count (1-8)", "loop <n> <count>".cyan());
    println!();
    println!("{}", "Chords:".green());
    println!(
        "  {}       - Append the chord on a degree (1-7)",
        "chord add <s> <degree>".cyan()
    );
    println!(
        "  {} - Insert before chord <c>",
        "chord insert <s> <c> <degree>".cyan()
    );
    println!("  {}         - Delete a chord", "chord remove <s> <c>".cyan());
    println!(
        "  {} - Change root, quality, bass or duration",
        "chord edit <s> <c> root=X quality=Q bass=X|none duration=beats".cyan()
    );
    println!();
    println!("{}", "Playback:".green());
    println!("  {}                            - Play the whole song", "play".cyan());
    println!("  {}                - Play one section", "play section <n>".cyan());
    println!("  {}                            - Stop playback", "stop".cyan());
    println!("  {}               - Audition one chord", "preview <s> <c>".cyan());
    println!("  {}                          - Position and settings", "status".cyan());
    println!("  {}                   - Show or set tempo (40-240)", "tempo [bpm]".cyan());
    println!("  {}                  - Toggle drums", "drums on|off".cyan());
    println!(
        "  {}   - Drum groove",
        "pattern basic|rock|jazz|funk".cyan()
    );
    println!("  {}          - Drum density", "complexity <0-100>".cyan());
    println!("  {}               - Drum level (-60..0)", "volume <dB>".cyan());
    println!(
        "  {}      - Chord instrument",
        "instrument piano|guitar".cyan()
    );
    println!();
    println!("{}", "Other Commands:".green());
    println!("  {}                            - Show this help", "help".bright_green());
    println!("  {}                            - Exit the REPL", "quit".bright_red());
}
