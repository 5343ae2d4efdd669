//! Tool modules for the Ollascout agent.

pub mod base;
pub mod registry;
pub mod ollama;

pub use base::{optional_i64, require_string, Tool};
pub use ollama::{
    render_search_results, FetchOllamaMetadataTool, ModelLink, ModelMetadata, ModelVariant,
    OllamaLibrary, ScrapeError, SearchOllamaModelsTool, FETCH_TOOL_NAME, SEARCH_TOOL_NAME,
};
pub use registry::ToolRegistry;
