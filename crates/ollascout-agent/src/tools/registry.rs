//! Tool Registry — name → tool table built once at start-up.
//!
//! After construction the registry is shared read-only (`Arc<ToolRegistry>`)
//! and dispatches extracted tool calls by name.

use std::collections::HashMap;
use std::sync::Arc;

use ollascout_core::types::{ToolCall, ToolDefinition};
use tracing::{info, warn};

use super::base::Tool;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Build a registry from a fixed list. Later entries win on name collisions.
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool. Overwrites any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            warn!(tool = %name, "tool name registered twice, replacing previous tool");
        } else {
            info!(tool = %name, "registered tool");
        }
        self.tools.insert(name, tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Definitions for all registered tools, sorted by name.
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        defs
    }

    /// The tool catalog embedded in the initial prompt: pretty-printed definitions.
    pub fn catalog_json(&self) -> String {
        serde_json::to_string_pretty(&self.get_definitions()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Execute a call, keeping failures apart from successes.
    ///
    /// `Err` carries the error string the model will see: either an unknown
    /// tool or the tool's own failure.
    pub async fn try_dispatch(&self, call: &ToolCall) -> Result<String, String> {
        let tool = match self.tools.get(&call.name) {
            Some(t) => t,
            None => {
                warn!(tool = %call.name, "tool not found");
                return Err(format!("[ERROR] Unknown tool: {}", call.name));
            }
        };

        match tool.execute(call.arguments.clone()).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                Err(format!("[ERROR] Tool '{}' failed: {e:#}", call.name))
            }
        }
    }

    /// Execute a call. The caller always gets a `String` back, even on failure.
    pub async fn dispatch(&self, call: &ToolCall) -> String {
        self.try_dispatch(call).await.unwrap_or_else(|e| e)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Minimal test tool.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "Text to echo" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
            let text = params
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or("(empty)");
            Ok(format!("Echo: {text}"))
        }
    }

    /// Tool that always fails.
    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
            anyhow::bail!("intentional failure")
        }
    }

    /// Shares the `echo` name with a different description.
    struct ShadowEchoTool;

    #[async_trait]
    impl Tool for ShadowEchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Shadowing echo"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
            Ok("shadow".into())
        }
    }

    fn call(name: &str, args: Value) -> ToolCall {
        ToolCall::new(name, serde_json::from_value(args).unwrap())
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        assert!(reg.has("echo"));
        assert!(!reg.has("nope"));
        assert!(reg.get("echo").is_some());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_from_tools_last_registered_wins() {
        let reg = ToolRegistry::from_tools(vec![
            Arc::new(EchoTool) as Arc<dyn Tool>,
            Arc::new(ShadowEchoTool),
        ]);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("echo").unwrap().description(), "Shadowing echo");
    }

    #[test]
    fn test_tool_names_sorted() {
        let reg = ToolRegistry::from_tools(vec![
            Arc::new(FailTool) as Arc<dyn Tool>,
            Arc::new(EchoTool),
        ]);
        assert_eq!(reg.tool_names(), vec!["echo", "fail"]);
    }

    #[test]
    fn test_catalog_json() {
        let reg = ToolRegistry::from_tools(vec![
            Arc::new(FailTool) as Arc<dyn Tool>,
            Arc::new(EchoTool),
        ]);
        let catalog = reg.catalog_json();
        let parsed: Vec<ToolDefinition> = serde_json::from_str(&catalog).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].function.name, "echo");
        assert!(catalog.contains('\n'));
    }

    #[test]
    fn test_empty_catalog() {
        let reg = ToolRegistry::default();
        assert!(reg.is_empty());
        assert_eq!(reg.catalog_json(), "[]");
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let reg = ToolRegistry::from_tools(vec![Arc::new(EchoTool) as Arc<dyn Tool>]);
        let result = reg.dispatch(&call("echo", json!({"text": "hello"}))).await;
        assert_eq!(result, "Echo: hello");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let reg = ToolRegistry::new();
        let result = reg.dispatch(&call("missing", json!({}))).await;
        assert_eq!(result, "[ERROR] Unknown tool: missing");
    }

    #[tokio::test]
    async fn test_dispatch_error_caught() {
        let reg = ToolRegistry::from_tools(vec![Arc::new(FailTool) as Arc<dyn Tool>]);
        let result = reg.try_dispatch(&call("fail", json!({}))).await;
        let err = result.unwrap_err();
        assert!(err.starts_with("[ERROR] Tool 'fail' failed:"));
        assert!(err.contains("intentional failure"));
    }
}
