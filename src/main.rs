//! `songforge` - generate a song and play with it in a REPL.
//!
//! Usage:
//!   songforge [key] [scale] [genre] [--seed N] [--config settings.json] [-v|-vv]

use anyhow::{Context, Result};
use songforge::repl;
use songforge_core::generator::ProgressionGenerator;
use songforge_core::types::settings::PlaybackSettings;
use songforge_core::types::{Genre, ScaleType, Song};
use std::path::Path;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let verbose: usize = args
        .iter()
        .filter(|a| a.starts_with('-') && !a.starts_with("--") && a[1..].chars().all(|c| c == 'v'))
        .map(|a| a.len() - 1)
        .sum();
    let level = match verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).context("Failed to install logger")?;

    let settings = match flag_value(&args, "--config") {
        Some(path) => load_settings(Path::new(path))?,
        None => PlaybackSettings::default(),
    };

    let seed: Option<u64> = match flag_value(&args, "--seed") {
        Some(s) => Some(s.parse().with_context(|| format!("Invalid seed '{}'", s))?),
        None => None,
    };
    let mut generator = match seed {
        Some(seed) => ProgressionGenerator::seeded(seed),
        None => ProgressionGenerator::from_entropy(),
    };

    let positional = positional_args(&args);
    let key = positional.first().copied().unwrap_or("C");
    let scale: ScaleType = positional.get(1).copied().unwrap_or("major").parse()?;
    let genre: Genre = positional.get(2).copied().unwrap_or("pop").parse()?;

    let song = Song::generate(&mut generator, key, scale, genre);
    log::debug!("Generated {} sections in {} {}", song.sections().len(), key, scale);

    repl::start(song, generator, settings)
}

/// Value following `--flag`, if present
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

/// Arguments that are neither flags nor flag values
fn positional_args(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if arg == "--seed" || arg == "--config" {
            skip_next = true;
        } else if !arg.starts_with('-') {
            out.push(arg.as_str());
        }
    }
    out
}

fn load_settings(path: &Path) -> Result<PlaybackSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    let settings: PlaybackSettings = serde_json::from_str(&text)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;
    log::info!("Loaded settings from {}", path.display());
    Ok(settings.sanitized())
}
