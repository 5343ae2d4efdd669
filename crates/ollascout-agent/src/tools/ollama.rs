//! Ollama library tools — model search and model page metadata.
//!
//! Both tools scrape the public ollama.com library pages. The HTML parsing is
//! split into pure functions so it can be tested against fixtures.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use ollascout_core::config::ToolsConfig;

use super::base::{optional_i64, require_string, Tool};

/// Registered name of the search tool. Also the target of the bare-query fallback.
pub const SEARCH_TOOL_NAME: &str = "search_ollama_models";

/// Registered name of the metadata tool.
pub const FETCH_TOOL_NAME: &str = "fetch_ollama_metadata";

/// User-Agent header.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) ollascout";

/// Upper bound for the `limit` argument of a search.
const MAX_SEARCH_LIMIT: usize = 20;

/// Readme paragraphs included in the text rendering.
const MAX_README_PARAGRAPHS: usize = 12;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Failures while fetching a library page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

// ─────────────────────────────────────────────
// Result types
// ─────────────────────────────────────────────

/// One search hit: a library model and its page URL.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelLink {
    pub name: String,
    pub url: String,
}

impl fmt::Display for ModelLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.name, self.url)
    }
}

/// One row of the "Models" table on a model page (a tag such as `llama3:70b`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelVariant {
    pub name: String,
    pub size: Option<String>,
    pub context: Option<String>,
    pub input: Option<String>,
}

/// Metadata scraped from a model page.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    pub model: String,
    pub url: String,
    pub downloads: Option<String>,
    pub updated: Option<String>,
    pub description: Option<String>,
    pub variants: Vec<ModelVariant>,
    pub readme_paragraphs: Vec<String>,
}

impl ModelMetadata {
    /// Text shown to the model. The first line is always `Model: <name>`,
    /// which the followup prompt relies on to list already-fetched models.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Model: {}", self.model),
            format!("URL: {}", self.url),
            format!("Downloads: {}", or_na(&self.downloads)),
            format!("Updated: {}", or_na(&self.updated)),
            format!("Description: {}", or_na(&self.description)),
        ];

        if self.variants.is_empty() {
            lines.push("Variants: n/a".to_string());
        } else {
            lines.push("Variants:".to_string());
            for v in &self.variants {
                lines.push(format!(
                    "- {} | size {} | context {} | input {}",
                    v.name,
                    or_na(&v.size),
                    or_na(&v.context),
                    or_na(&v.input)
                ));
            }
        }

        if !self.readme_paragraphs.is_empty() {
            lines.push("Readme:".to_string());
            lines.extend(
                self.readme_paragraphs
                    .iter()
                    .take(MAX_README_PARAGRAPHS)
                    .cloned(),
            );
        }

        lines.join("\n")
    }
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("n/a")
}

/// Render search hits one per line, or `No results found.`.
pub fn render_search_results(models: &[ModelLink]) -> String {
    if models.is_empty() {
        return "No results found.".to_string();
    }
    models
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────
// OllamaLibrary (HTTP side)
// ─────────────────────────────────────────────

/// HTTP client for the Ollama model library.
#[derive(Clone, Debug)]
pub struct OllamaLibrary {
    client: Client,
    base_url: String,
    max_results: usize,
}

impl OllamaLibrary {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64, max_results: usize) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .redirect(reqwest::redirect::Policy::limited(5))
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results,
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(
            config.ollama_base_url.clone(),
            config.timeout_secs,
            config.max_search_results,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search the library, returning at most the configured number of models.
    pub async fn search(&self, query: &str) -> Result<Vec<ModelLink>, ScrapeError> {
        self.search_with_limit(query, self.max_results).await
    }

    pub async fn search_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ModelLink>, ScrapeError> {
        let url = format!("{}/search", self.base_url);
        debug!(query = %query, limit = limit, "searching ollama library");

        let resp = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|source| ScrapeError::Request {
                url: url.clone(),
                source,
            })?;
        let html = read_body(resp, &url).await?;

        Ok(parse_search_results(&html, &self.base_url, limit))
    }

    /// Fetch and parse one model page.
    pub async fn fetch_metadata(&self, url: &str) -> Result<ModelMetadata, ScrapeError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ScrapeError::InvalidUrl(url.to_string()));
        }
        debug!(url = %url, "fetching model page");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Request {
                url: url.to_string(),
                source,
            })?;
        let html = read_body(resp, url).await?;

        Ok(parse_model_page(&html, url))
    }
}

async fn read_body(resp: reqwest::Response, url: &str) -> Result<String, ScrapeError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    resp.text().await.map_err(|source| ScrapeError::Request {
        url: url.to_string(),
        source,
    })
}

// ─────────────────────────────────────────────
// HTML parsing
// ─────────────────────────────────────────────

fn sel(css: &'static str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

/// Whitespace-trimmed text of an element, text nodes joined by single spaces.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Collect `/library/<name>` links from a search page, deduplicated by name.
pub fn parse_search_results(html: &str, base_url: &str, limit: usize) -> Vec<ModelLink> {
    let document = Html::parse_document(html);
    let anchors = sel("a[href]");
    let base = base_url.trim_end_matches('/');

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for anchor in document.select(&anchors) {
        if results.len() >= limit {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.starts_with("/library/") || href.matches('/').count() != 2 {
            continue;
        }
        let name = href.rsplit('/').next().unwrap_or_default();
        if name.is_empty() || !seen.insert(name.to_string()) {
            continue;
        }
        results.push(ModelLink {
            name: name.to_string(),
            url: format!("{base}{href}"),
        });
    }

    results
}

/// Extract metadata from a model page. Missing pieces stay `None` / empty.
pub fn parse_model_page(html: &str, url: &str) -> ModelMetadata {
    let document = Html::parse_document(html);
    let model = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string();

    // "<span>9.1M</span><span>Downloads</span>" / "<span>Updated</span><span>1 year ago</span>"
    let mut downloads = None;
    let mut updated = None;
    for span in document.select(&sel("span")) {
        let label = element_text(span).to_lowercase();
        if label == "downloads" && downloads.is_none() {
            downloads = span
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "span")
                .map(element_text)
                .and_then(non_empty);
        } else if label == "updated" && updated.is_none() {
            updated = span
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "span")
                .map(element_text)
                .and_then(non_empty);
        }
    }

    let description = document
        .select(&sel("span#summary-content"))
        .next()
        .map(element_text)
        .and_then(non_empty);

    let readme_paragraphs = document
        .select(&sel("div#readme p"))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    let heading = sel("h2");
    let rows = sel("div");
    let row_name = sel("a.text-sm");
    let row_cols = sel("p.col-span-2");
    let mut variants = Vec::new();

    for section in document.select(&sel("section")) {
        let is_models = section
            .select(&heading)
            .next()
            .map(|h| element_text(h) == "Models")
            .unwrap_or(false);
        if !is_models {
            continue;
        }
        for row in section
            .select(&rows)
            .filter(|d| d.value().classes().any(|c| c == "sm:grid"))
        {
            let Some(name) = row.select(&row_name).next().map(element_text).and_then(non_empty)
            else {
                continue;
            };
            let mut cols = row.select(&row_cols).map(element_text);
            variants.push(ModelVariant {
                name,
                size: cols.next().and_then(non_empty),
                context: cols.next().and_then(non_empty),
                input: cols.next().and_then(non_empty),
            });
        }
    }

    ModelMetadata {
        model,
        url: url.to_string(),
        downloads,
        updated,
        description,
        variants,
        readme_paragraphs,
    }
}

// ─────────────────────────────────────────────
// SearchOllamaModelsTool
// ─────────────────────────────────────────────

/// Searches the Ollama library for models matching a query.
pub struct SearchOllamaModelsTool {
    library: OllamaLibrary,
}

impl SearchOllamaModelsTool {
    pub fn new(library: OllamaLibrary) -> Self {
        Self { library }
    }
}

#[async_trait]
impl Tool for SearchOllamaModelsTool {
    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search the Ollama model library. Returns matching model names with their \
         library page URLs, one per line."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Model name or keyword, e.g. \"llama3\" or \"embedding\""
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of models to return",
                    "minimum": 1,
                    "maximum": MAX_SEARCH_LIMIT
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let query = require_string(&params, "query")?;
        let limit = optional_i64(&params, "limit")
            .map(|n| n.clamp(1, MAX_SEARCH_LIMIT as i64) as usize)
            .unwrap_or(self.library.max_results);

        let models = self.library.search_with_limit(&query, limit).await?;
        Ok(render_search_results(&models))
    }
}

// ─────────────────────────────────────────────
// FetchOllamaMetadataTool
// ─────────────────────────────────────────────

/// Fetches metadata (downloads, variants, readme) from a model's library page.
pub struct FetchOllamaMetadataTool {
    library: OllamaLibrary,
}

impl FetchOllamaMetadataTool {
    pub fn new(library: OllamaLibrary) -> Self {
        Self { library }
    }
}

#[async_trait]
impl Tool for FetchOllamaMetadataTool {
    fn name(&self) -> &str {
        FETCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Fetch metadata for one Ollama model: downloads, last update, description, \
         available variants (size, context, input) and readme excerpts."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Full model page URL, e.g. https://ollama.com/library/llama3"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let url = require_string(&params, "url")?;
        let metadata = self.library.fetch_metadata(url.trim()).await?;
        Ok(metadata.render())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
