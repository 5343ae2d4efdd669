//! LLM provider layer for Ollascout.
//!
//! The agent loop only needs "prompt in, text out"; this crate supplies that
//! over any OpenAI-compatible `/chat/completions` endpoint (a local Ollama
//! server by default).
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — trait that all providers implement
//! - [`registry`] — static specs for the supported providers
//! - [`http_provider::HttpProvider`] — generic OpenAI-compatible HTTP client
//! - [`http_provider::create_provider`] — convenience builder from config

pub mod http_provider;
pub mod registry;
pub mod traits;

pub use http_provider::{create_provider, HttpProvider};
pub use registry::{ProviderSpec, PROVIDERS};
pub use traits::{LlmProvider, LlmRequestConfig};
