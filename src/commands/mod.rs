//! Command registry for REPL commands
//!
//! Every REPL line is a command: the longest registered prefix wins and the
//! rest of the line is handed to the handler as its arguments.

pub mod general;
pub mod playback;
pub mod song;

use crate::audio::driver::SharedScheduler;
use crate::audio::scheduler::{PlaybackMonitor, TransportScheduler};
use crate::audio::transport::RealtimeTransport;
use songforge_core::generator::{ProgressionGenerator, SeededChooser};
use songforge_core::types::Song;
use std::sync::Arc;
use std::sync::Mutex;

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// No registered command matches the input
    NotACommand,
    /// Error occurred
    Error(String),
}

pub type SongGenerator = ProgressionGenerator<SeededChooser>;

/// Context passed to command handlers
pub struct CommandContext {
    pub song: Song,
    pub generator: SongGenerator,
    pub player: SharedScheduler<RealtimeTransport>,
    pub monitor: PlaybackMonitor,
}

impl CommandContext {
    pub fn new(song: Song, generator: SongGenerator, player: TransportScheduler<RealtimeTransport>) -> Self {
        let monitor = player.monitor();
        Self {
            song,
            generator,
            player: Arc::new(Mutex::new(player)),
            monitor,
        }
    }

    /// Run `f` with the scheduler locked
    pub fn with_player<R>(
        &self,
        f: impl FnOnce(&mut TransportScheduler<RealtimeTransport>) -> R,
    ) -> Result<R, String> {
        let mut player = self
            .player
            .lock()
            .map_err(|_| "Playback engine is unavailable".to_string())?;
        Ok(f(&mut player))
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a 1-based index typed by the user into a 0-based one
pub fn parse_index(arg: Option<&str>, what: &str) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| format!("Missing {} number", what))?;
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Invalid {} number: '{}'", what, arg)),
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Song commands
    registry.register("generate", song::cmd_generate);
    registry.register("show", song::cmd_show);
    registry.register("chords", song::cmd_chords);
    registry.register("notation", song::cmd_notation);
    registry.register("section add", song::cmd_section_add);
    registry.register("section remove", song::cmd_section_remove);
    registry.register("section move", song::cmd_section_move);
    registry.register("section rename", song::cmd_section_rename);
    registry.register("section type", song::cmd_section_type);
    registry.register("loop", song::cmd_loop);
    registry.register("chord add", song::cmd_chord_add);
    registry.register("chord insert", song::cmd_chord_insert);
    registry.register("chord remove", song::cmd_chord_remove);
    registry.register("chord edit", song::cmd_chord_edit);

    // Playback commands
    registry.register("play section", playback::cmd_play_section);
    registry.register("play", playback::cmd_play);
    registry.register("stop", playback::cmd_stop);
    registry.register("preview", playback::cmd_preview);
    registry.register("status", playback::cmd_status);
    registry.register("tempo", playback::cmd_tempo);
    registry.register("drums", playback::cmd_drums);
    registry.register("pattern", playback::cmd_pattern);
    registry.register("complexity", playback::cmd_complexity);
    registry.register("volume", playback::cmd_volume);
    registry.register("instrument", playback::cmd_instrument);

    // General commands
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);

    registry
}
