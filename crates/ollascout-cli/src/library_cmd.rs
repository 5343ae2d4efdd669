//! `ollascout search` / `ollascout fetch` — run the library tools directly.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use ollascout_agent::tools::{render_search_results, OllamaLibrary};
use ollascout_core::config::Config;

use crate::helpers;

/// Search the library and print `name → url` lines.
pub async fn search(config: &Config, query: &str, save: bool) -> Result<()> {
    let library = OllamaLibrary::from_config(&config.tools);
    let models = library
        .search(query)
        .await
        .with_context(|| format!("search for '{query}' failed"))?;
    info!(query = %query, results = models.len(), "search complete");

    println!("{}", render_search_results(&models));

    if save {
        let dir = helpers::expand_tilde(&config.tools.output_dir).join("search");
        let path = helpers::save_results(&dir, query, &models)?;
        println!("{} {}", "Saved:".dimmed(), path.display());
    }
    Ok(())
}

/// Fetch one model page and print its metadata.
pub async fn fetch(config: &Config, url: &str, save: bool) -> Result<()> {
    let library = OllamaLibrary::from_config(&config.tools);
    let metadata = library
        .fetch_metadata(url)
        .await
        .with_context(|| format!("fetching {url} failed"))?;
    info!(model = %metadata.model, variants = metadata.variants.len(), "fetch complete");

    println!("{}", metadata.render());

    if save {
        let dir = helpers::expand_tilde(&config.tools.output_dir).join("models");
        let path = helpers::save_results(&dir, &metadata.model, &metadata)?;
        println!("{} {}", "Saved:".dimmed(), path.display());
    }
    Ok(())
}
