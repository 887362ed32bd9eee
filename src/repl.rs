//! REPL (Read-Eval-Print Loop) for Songforge

use crate::audio::driver::PlaybackDriver;
use crate::audio::scheduler::{PlaybackUpdate, TransportScheduler};
use crate::commands::{create_registry, CommandContext, CommandResult, SongGenerator};
use anyhow::{Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use songforge_core::types::settings::PlaybackSettings;
use songforge_core::types::Song;
use std::thread;

/// Interactive REPL: song editing plus live playback
pub struct Repl {
    editor: DefaultEditor,
    ctx: CommandContext,
    driver: PlaybackDriver,
}

impl Repl {
    pub fn new(song: Song, generator: SongGenerator, settings: PlaybackSettings) -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to initialize line editor")?;
        let player = TransportScheduler::with_console_voices(settings);
        let ctx = CommandContext::new(song, generator, player);
        let driver = PlaybackDriver::spawn(ctx.player.clone());
        spawn_position_printer(&ctx);

        Ok(Repl { editor, ctx, driver })
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "🎵".bright_yellow(),
            "Songforge".bright_cyan().bold()
        );
        println!(
            "Try {}, {} or {}.",
            "generate G major pop".cyan(),
            "play".cyan(),
            "chord edit 1 2 quality=7".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        let registry = create_registry();
        if let CommandResult::Message(song) = registry.execute("show", &mut self.ctx) {
            println!("{}\n", song);
        }

        loop {
            let prompt = format!("{} ", "songforge>".bright_magenta().bold());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.editor.add_history_entry(line.to_owned())?;

                    match registry.execute(line, &mut self.ctx) {
                        CommandResult::Success => {}
                        CommandResult::Message(msg) => {
                            println!("{}", msg);
                        }
                        CommandResult::Exit => {
                            println!("{} 🎵", "Goodbye!".bright_cyan());
                            break;
                        }
                        CommandResult::Error(e) => {
                            println!("{} {}", "Error:".bright_red().bold(), e.red());
                        }
                        CommandResult::NotACommand => {
                            println!(
                                "{} '{}' (type {} for a list)",
                                "Unknown command:".bright_red().bold(),
                                line,
                                "help".bright_green()
                            );
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("{} 🎵", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    println!(
                        "{} {}",
                        "Error reading input:".bright_red().bold(),
                        err.to_string().red()
                    );
                }
            }
        }

        let _ = self.ctx.with_player(|p| p.stop());
        self.driver.shutdown();
        Ok(())
    }
}

/// Echo position changes while a session runs
fn spawn_position_printer(ctx: &CommandContext) {
    let updates = ctx.monitor.subscribe();
    thread::spawn(move || {
        for update in updates.iter() {
            match update {
                PlaybackUpdate::Position { section, chord } => {
                    println!(
                        "{}",
                        format!("  ♪ section {} · chord {}", section + 1, chord + 1).bright_black()
                    );
                }
                PlaybackUpdate::Stopped => {
                    println!("{}", "  ■ playback finished".bright_black());
                }
            }
        }
    });
}

/// Convenience function to start the REPL
pub fn start(song: Song, generator: SongGenerator, settings: PlaybackSettings) -> Result<()> {
    let mut repl = Repl::new(song, generator, settings)?;
    repl.run()
}
