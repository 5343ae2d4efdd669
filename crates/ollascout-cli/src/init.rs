//! `ollascout init` — write a default config and create the output directories.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use ollascout_core::config::{get_config_path, load_config, save_config, Config};

use crate::helpers;

/// Run the init command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "Ollascout — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    let config = if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
        load_config(Some(&config_path))
    } else {
        let config = Config::default();
        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
        config
    };

    for dir in create_output_dirs(&config)? {
        println!("  {} {}", "✓".green(), dir.display());
    }

    println!();
    println!(
        "Next: start an Ollama server with `{}`, then run `{}`.",
        format!("ollama pull {}", config.agent.model).bold(),
        "ollascout ask".bold()
    );
    println!();

    Ok(())
}

/// Create `<outputDir>/search` and `<outputDir>/models`.
fn create_output_dirs(config: &Config) -> Result<Vec<std::path::PathBuf>> {
    let root = helpers::expand_tilde(&config.tools.output_dir);
    ["search", "models"]
        .iter()
        .map(|sub| {
            let dir = root.join(sub);
            ensure_dir(&dir)?;
            Ok(dir)
        })
        .collect()
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))
}
