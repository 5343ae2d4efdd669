//! Shared CLI helpers — path expansion, output, tool catalog files, saved results.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use serde_json::{json, Value};

use ollascout_core::utils::{safe_filename, timestamp};

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print an agent answer to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "Ollascout".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}  {}",
        "Ollascout".cyan().bold(),
        version.dimmed(),
        format!("model: {model}").dimmed()
    );
    println!("{}", "Ask about Ollama models, or \"exit\" to quit.".dimmed());
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Read a tool catalog file. The content must be JSON; it is re-serialized
/// pretty so the prompt layout does not depend on the file's formatting.
pub fn load_catalog(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read tool catalog: {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("tool catalog is not valid JSON: {}", path.display()))?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Write `result` to `<dir>/<name>.json` with a save timestamp.
pub fn save_results<T: Serialize>(dir: &Path, name: &str, result: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir: {}", dir.display()))?;

    let path = dir.join(format!("{}.json", safe_filename(name)));
    let document = json!({
        "savedAt": timestamp(),
        "result": result,
    });
    fs::write(&path, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
