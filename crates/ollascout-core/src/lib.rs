//! Ollascout core — shared types, configuration, and small utilities.
//!
//! - **types**: tool calls, tool outputs, tool definitions, LLM wire types
//! - **config**: `~/.ollascout/config.json` schema and loader
//! - **utils**: paths, timestamps, string helpers

pub mod config;
pub mod types;
pub mod utils;

pub use config::Config;
pub use types::{LlmResponse, ToolCall, ToolDefinition, ToolOutput};
