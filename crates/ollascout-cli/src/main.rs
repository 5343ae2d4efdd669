//! Ollascout CLI — entry point.
//!
//! # Commands
//!
//! - `ollascout ask [-q QUESTION] [--tools FILE]` — answer a question (single-shot or REPL)
//! - `ollascout search <QUERY> [--save]` — search the Ollama library directly
//! - `ollascout fetch <URL> [--save]` — fetch one model page directly
//! - `ollascout init` — write a default config and create output directories
//! - `ollascout status` — show configuration and registered tools

mod helpers;
mod init;
mod library_cmd;
mod repl;
mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ollascout_agent::tools::{FetchOllamaMetadataTool, OllamaLibrary, SearchOllamaModelsTool};
use ollascout_agent::{AgentLoop, Tool, ToolRegistry};
use ollascout_core::config::{load_config, Config, ToolsConfig};
use ollascout_providers::http_provider::create_provider;
use ollascout_providers::traits::LlmRequestConfig;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Ollascout — ask a local LLM about Ollama models, with live library lookups
#[derive(Parser)]
#[command(name = "ollascout", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the agent a question (single-shot or interactive REPL)
    Ask {
        /// Single question (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        question: Option<String>,

        /// JSON file whose content replaces the built-in tool catalog
        #[arg(long)]
        tools: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Search the Ollama library without the agent
    Search {
        /// Model name or keyword
        query: String,

        /// Write the results under the configured output directory
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Fetch metadata for one model page without the agent
    Fetch {
        /// Full model page URL, e.g. https://ollama.com/library/llama3
        url: String,

        /// Write the metadata under the configured output directory
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write a default config and create the output directories
    Init,

    /// Show configuration and registered tools
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            question,
            tools,
            logs,
        } => {
            init_logging(logs);
            run_ask(question, tools, logs).await
        }
        Commands::Search { query, save, logs } => {
            init_logging(logs);
            library_cmd::search(&load_config(None), &query, save).await
        }
        Commands::Fetch { url, save, logs } => {
            init_logging(logs);
            library_cmd::fetch(&load_config(None), &url, save).await
        }
        Commands::Init => init::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Ask command
// ─────────────────────────────────────────────

async fn run_ask(question: Option<String>, tools_file: Option<PathBuf>, show_logs: bool) -> Result<()> {
    let config = load_config(None);
    let agent_loop = build_agent_loop(&config, tools_file.as_deref())?;

    match question {
        Some(q) => {
            info!(model = %agent_loop.model(), "answering single question");
            if !show_logs {
                helpers::print_thinking();
            }
            let answer = agent_loop.run_query(&q).await;
            if !show_logs {
                helpers::clear_thinking();
            }
            helpers::print_response(&answer);
        }
        None => {
            repl::run(agent_loop, show_logs).await?;
        }
    }

    Ok(())
}

/// Register the Ollama library tools.
pub fn build_registry(tools: &ToolsConfig) -> ToolRegistry {
    let library = OllamaLibrary::from_config(tools);
    ToolRegistry::from_tools([
        Arc::new(SearchOllamaModelsTool::new(library.clone())) as Arc<dyn Tool>,
        Arc::new(FetchOllamaMetadataTool::new(library)),
    ])
}

/// Build an `AgentLoop` from the loaded configuration.
pub fn build_agent_loop(config: &Config, catalog_file: Option<&Path>) -> Result<AgentLoop> {
    let model = &config.agent.model;

    let provider = create_provider(&config.provider, model)
        .context("failed to create LLM provider")?;

    let request_config = LlmRequestConfig {
        max_tokens: config.agent.max_tokens,
        temperature: config.agent.temperature,
    };

    let agent_loop = AgentLoop::new(
        Arc::new(provider),
        Arc::new(build_registry(&config.tools)),
        Some(model.to_string()),
        Some(config.agent.max_steps),
        Some(request_config),
    );

    match catalog_file {
        Some(path) => Ok(agent_loop.with_catalog(helpers::load_catalog(path)?)),
        None => Ok(agent_loop),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("ollascout=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
