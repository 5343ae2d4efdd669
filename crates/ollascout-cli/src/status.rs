//! `ollascout status` — show configuration, provider, and registered tools.

use anyhow::Result;
use colored::Colorize;

use ollascout_core::config::{get_config_path, load_config};
use ollascout_providers::registry::{find_by_name, resolve_api_base, resolve_api_key};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "Ollascout Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".yellow().to_string()
        }
    );

    println!("  {:<18} {}", "Model:".bold(), config.agent.model);
    println!(
        "  {:<18} {} | {} | {}",
        "Parameters:".bold(),
        format!("max_steps: {}", config.agent.max_steps).dimmed(),
        format!("max_tokens: {}", config.agent.max_tokens).dimmed(),
        format!("temp: {}", config.agent.temperature).dimmed(),
    );

    // Provider
    println!();
    match find_by_name(&config.provider.name) {
        Some(spec) => {
            let key_status = if resolve_api_key(&config.provider, spec).is_some() {
                format!("{} (key set)", "✓".green())
            } else if spec.is_local {
                format!("{}", "· no key needed".dimmed())
            } else {
                format!("{} (set {} or provider.apiKey)", "✗ no key".red(), spec.env_key)
            };
            println!("  {:<18} {} {}", "Provider:".bold(), spec.display_name, key_status);
            println!(
                "  {:<18} {}",
                "API base:".bold(),
                resolve_api_base(&config.provider, spec)
            );
        }
        None => {
            println!(
                "  {:<18} {}",
                "Provider:".bold(),
                format!("unknown provider '{}'", config.provider.name).red()
            );
        }
    }

    // Tools
    println!();
    let registry = crate::build_registry(&config.tools);
    println!("  {}", "Tools:".bold());
    for name in registry.tool_names() {
        println!("    {name}");
    }
    println!(
        "  {:<18} {} {}",
        "Library:".bold(),
        config.tools.ollama_base_url,
        format!("(timeout {}s, max {} results)", config.tools.timeout_secs, config.tools.max_search_results).dimmed()
    );
    println!(
        "  {:<18} {}",
        "Output dir:".bold(),
        crate::helpers::expand_tilde(&config.tools.output_dir).display()
    );

    println!();

    Ok(())
}
