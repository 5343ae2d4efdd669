//! Tool-call extraction from free-form model output.
//!
//! Models are asked to answer with
//! `<tool_call>{"name": "...", "arguments": {...}}</tool_call>`, but smaller
//! local models drift. Three strategies are tried in strict priority order:
//!
//! 1. the tagged block;
//! 2. an inline JSON object carrying `"name"` and `"arguments"`;
//! 3. a bare `{"query": "..."}` object, treated as a search.
//!
//! A tagged block that fails to parse yields no call at all. It is never
//! demoted to the weaker strategies.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use ollascout_core::types::ToolCall;

use crate::tools::SEARCH_TOOL_NAME;

/// Opening tag of a tagged tool call.
pub const TOOL_CALL_START: &str = "<tool_call>";
/// Closing tag of a tagged tool call.
pub const TOOL_CALL_END: &str = "</tool_call>";
/// Tool synthesized by the bare-query strategy.
pub const DEFAULT_FALLBACK_TOOL: &str = SEARCH_TOOL_NAME;

/// Which strategy produced a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Tagged,
    Inline,
    BareQuery,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::Tagged => "tagged",
            ExtractionStrategy::Inline => "inline",
            ExtractionStrategy::BareQuery => "bare_query",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled extraction patterns.
pub struct ToolCallExtractor {
    tagged: Regex,
    inline: Regex,
    bare_query: Regex,
    fallback_tool: String,
}

impl ToolCallExtractor {
    pub fn new() -> Self {
        Self::with_fallback_tool(DEFAULT_FALLBACK_TOOL)
    }

    /// Use `tool` as the target of the bare-query strategy.
    pub fn with_fallback_tool(tool: impl Into<String>) -> Self {
        Self {
            tagged: Regex::new(r"(?s)<tool_call>\s*(\{.*?\})\s*</tool_call>")
                .expect("valid tagged regex"),
            inline: Regex::new(r#"(?s)\{.*?"name"\s*:\s*".+?",\s*"arguments"\s*:\s*\{"#)
                .expect("valid inline regex"),
            bare_query: Regex::new(r#"\{.*?"query"\s*:\s*"(.*?)".*?\}"#)
                .expect("valid bare query regex"),
            fallback_tool: tool.into(),
        }
    }

    /// Extract at most one tool call. Never panics.
    pub fn extract(&self, text: &str) -> Option<ToolCall> {
        self.extract_with_strategy(text).map(|(call, _)| call)
    }

    /// Like [`extract`](Self::extract), also reporting the strategy that matched.
    pub fn extract_with_strategy(&self, text: &str) -> Option<(ToolCall, ExtractionStrategy)> {
        if let Some(caps) = self.tagged.captures(text) {
            let body = caps.get(1)?.as_str();
            let value: Value = serde_json::from_str(body).ok()?;
            return call_from_value(value).map(|c| (c, ExtractionStrategy::Tagged));
        }

        if let Some(m) = self.inline.find(text) {
            // First complete JSON value from the match start; trailing prose is ignored.
            let mut stream =
                serde_json::Deserializer::from_str(&text[m.start()..]).into_iter::<Value>();
            let value = stream.next()?.ok()?;
            return call_from_value(value).map(|c| (c, ExtractionStrategy::Inline));
        }

        let caps = self.bare_query.captures(text)?;
        let raw = caps.get(1)?.as_str();
        let query = serde_json::from_str::<String>(&format!("\"{raw}\""))
            .unwrap_or_else(|_| raw.to_string());
        let mut arguments = HashMap::new();
        arguments.insert("query".to_string(), Value::String(query));
        Some((
            ToolCall::new(self.fallback_tool.clone(), arguments),
            ExtractionStrategy::BareQuery,
        ))
    }
}

impl Default for ToolCallExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// `{"name": <non-empty string>, "arguments": <object | null | absent>}`
fn call_from_value(value: Value) -> Option<ToolCall> {
    let Value::Object(mut obj) = value else {
        return None;
    };
    let name = match obj.remove("name")? {
        Value::String(s) if !s.trim().is_empty() => s,
        _ => return None,
    };
    let arguments = match obj.remove("arguments") {
        None | Some(Value::Null) => HashMap::new(),
        Some(Value::Object(map)) => map.into_iter().collect(),
        Some(_) => return None,
    };
    Some(ToolCall::new(name, arguments))
}

/// Extract a tool call using the default patterns.
pub fn extract_tool_call(text: &str) -> Option<ToolCall> {
    static EXTRACTOR: OnceLock<ToolCallExtractor> = OnceLock::new();
    EXTRACTOR.get_or_init(ToolCallExtractor::new).extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> HashMap<String, Value> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_tagged_call() {
        let text = r#"Sure.
<tool_call>{"name": "search_ollama_models", "arguments": {"query": "llama3"}}</tool_call>"#;
        let (call, strategy) = ToolCallExtractor::new().extract_with_strategy(text).unwrap();
        assert_eq!(strategy, ExtractionStrategy::Tagged);
        assert_eq!(call.name, "search_ollama_models");
        assert_eq!(call.arguments, args(json!({"query": "llama3"})));
    }

    #[test]
    fn test_tagged_call_with_whitespace_and_nesting() {
        let text = "<tool_call>\n  {\"name\": \"t\", \"arguments\": {\"filter\": {\"size\": \"8b\"}}}\n</tool_call>";
        let call = extract_tool_call(text).unwrap();
        assert_eq!(call.arguments, args(json!({"filter": {"size": "8b"}})));
    }

    #[test]
    fn test_tagged_missing_arguments_defaults_to_empty() {
        let call = extract_tool_call(r#"<tool_call>{"name": "status"}</tool_call>"#).unwrap();
        assert_eq!(call.name, "status");
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_tagged_takes_priority_over_inline() {
        let text = r#"{"name": "inline_tool", "arguments": {}}
<tool_call>{"name": "tagged_tool", "arguments": {}}</tool_call>"#;
        let (call, strategy) = ToolCallExtractor::new().extract_with_strategy(text).unwrap();
        assert_eq!(call.name, "tagged_tool");
        assert_eq!(strategy, ExtractionStrategy::Tagged);
    }

    #[test]
    fn test_malformed_tag_does_not_fall_through() {
        // The inline object and the query object would both match on their own.
        let text = r#"<tool_call>{"name": "search_ollama_models", "arguments": {"query": }</tool_call>
{"name": "other", "arguments": {"query": "x"}}"#;
        assert!(extract_tool_call(text).is_none());
    }

    #[test]
    fn test_tagged_wrong_shape_is_none() {
        assert!(extract_tool_call(r#"<tool_call>{"arguments": {}}</tool_call>"#).is_none());
        assert!(extract_tool_call(r#"<tool_call>{"name": "", "arguments": {}}</tool_call>"#).is_none());
        assert!(extract_tool_call(r#"<tool_call>{"name": 3, "arguments": {}}</tool_call>"#).is_none());
        assert!(
            extract_tool_call(r#"<tool_call>{"name": "t", "arguments": [1]}</tool_call>"#).is_none()
        );
    }

    #[test]
    fn test_inline_call() {
        let text = r#"I will call {"name": "fetch_ollama_metadata", "arguments": {"url": "https://ollama.com/library/llama3"}} now."#;
        let (call, strategy) = ToolCallExtractor::new().extract_with_strategy(text).unwrap();
        assert_eq!(strategy, ExtractionStrategy::Inline);
        assert_eq!(call.name, "fetch_ollama_metadata");
        assert_eq!(
            call.arguments,
            args(json!({"url": "https://ollama.com/library/llama3"}))
        );
    }

    #[test]
    fn test_inline_nested_arguments() {
        let text = r#"{"name": "t", "arguments": {"a": {"b": 1}, "c": [1, 2]}} trailing"#;
        let call = extract_tool_call(text).unwrap();
        assert_eq!(call.arguments, args(json!({"a": {"b": 1}, "c": [1, 2]})));
    }

    #[test]
    fn test_inline_unparseable_is_none() {
        let text = r#"{"name": "t", "arguments": {"a": oops}}"#;
        assert!(extract_tool_call(text).is_none());
    }

    #[test]
    fn test_bare_query_fallback() {
        let (call, strategy) = ToolCallExtractor::new()
            .extract_with_strategy(r#"Let me search: {"query": "llama3"}"#)
            .unwrap();
        assert_eq!(strategy, ExtractionStrategy::BareQuery);
        assert_eq!(call.name, "search_ollama_models");
        assert_eq!(call.arguments, args(json!({"query": "llama3"})));
    }

    #[test]
    fn test_bare_query_decodes_escapes() {
        let call = extract_tool_call(r#"{"query": "caf\u00e9 models"}"#).unwrap();
        assert_eq!(call.arguments["query"], json!("café models"));
    }

    #[test]
    fn test_bare_query_custom_fallback_tool() {
        let extractor = ToolCallExtractor::with_fallback_tool("my_search");
        let call = extractor.extract(r#"{"query": "phi3"}"#).unwrap();
        assert_eq!(call.name, "my_search");
    }

    #[test]
    fn test_plain_answer_is_none() {
        assert!(extract_tool_call("llama3 is a family of open models by Meta.").is_none());
        assert!(extract_tool_call("").is_none());
    }

    #[test]
    fn test_total_on_junk() {
        let junk = [
            "{",
            "}",
            "<tool_call>",
            "<tool_call></tool_call>",
            "<tool_call>{}</tool_call>",
            r#"{"name": "#,
            r#"{"query": "#,
            "\u{0}\u{1}{{{{\"name\"",
            "<tool_call>{\"name\": \"x\"",
        ];
        for text in junk {
            let _ = extract_tool_call(text);
        }
        assert!(extract_tool_call("<tool_call>{}</tool_call>").is_none());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(ExtractionStrategy::BareQuery.to_string(), "bare_query");
    }
}
