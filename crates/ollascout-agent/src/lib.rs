//! Ollascout Agent — tool-calling loop, tools, and prompt construction.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and the Ollama library tools
//! - **extractor**: pulls a tool call out of free-form model output
//! - **prompts**: initial, followup, and final prompt text
//! - **observer**: per-transition events emitted by the loop
//! - **agent_loop**: the bounded model ↔ tool loop

pub mod tools;
pub mod extractor;
pub mod prompts;
pub mod observer;
pub mod agent_loop;

pub use agent_loop::{AgentAnswer, AgentLoop, LoopOutcome, QueryState};
pub use extractor::{extract_tool_call, ExtractionStrategy, ToolCallExtractor};
pub use observer::{LoopEvent, LoopObserver, TracingObserver};
pub use tools::{Tool, ToolRegistry};
