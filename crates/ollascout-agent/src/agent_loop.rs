//! Agent loop — the bounded model ↔ tool loop for one query.
//!
//! Each step sends the current prompt, extracts at most one tool call from
//! the reply and dispatches it. The loop ends when the model answers without
//! a tool call, when a tool panics, or when the step budget is spent, in
//! which case the model is asked once more for a final answer.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info};

use ollascout_core::config::schema::DEFAULT_MAX_STEPS;
use ollascout_core::types::{ToolCall, ToolOutput};
use ollascout_core::utils::truncate_string;
use ollascout_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::extractor::ToolCallExtractor;
use crate::observer::{LoopEvent, LoopObserver, TracingObserver};
use crate::prompts::{build_final_prompt, build_followup_prompt, build_initial_prompt};
use crate::tools::registry::ToolRegistry;

// ─────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────

/// How a query ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model replied without a tool call; its reply is the answer.
    NoCall,
    /// A tool panicked; the answer is an error string.
    ToolFailure,
    /// The step budget ran out and the model gave a final answer.
    Finalized,
}

/// Answer to one query.
#[derive(Clone, Debug)]
pub struct AgentAnswer {
    pub text: String,
    pub outcome: LoopOutcome,
    /// Number of tool outputs gathered.
    pub dispatches: usize,
}

// ─────────────────────────────────────────────
// Per-query state
// ─────────────────────────────────────────────

/// Calls made and outputs gathered during one query. Both lists grow
/// together and are dropped when the query ends.
#[derive(Debug, Default)]
pub struct QueryState {
    history: Vec<ToolCall>,
    outputs: Vec<ToolOutput>,
}

impl QueryState {
    /// Whether an identical call (same name, same arguments) was already made.
    pub fn is_duplicate(&self, call: &ToolCall) -> bool {
        self.history.iter().any(|c| c == call)
    }

    pub fn record(&mut self, call: ToolCall, output: ToolOutput) {
        self.history.push(call);
        self.outputs.push(output);
    }

    pub fn history(&self) -> &[ToolCall] {
        &self.history
    }

    pub fn outputs(&self) -> &[ToolOutput] {
        &self.outputs
    }

    pub fn dispatches(&self) -> usize {
        self.outputs.len()
    }
}

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

/// Runs queries against a model with a fixed set of tools.
pub struct AgentLoop {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    extractor: ToolCallExtractor,
    observer: Arc<dyn LoopObserver>,
    /// Model to use (overrides provider default if set).
    model: String,
    /// Loop body iterations per query.
    max_steps: usize,
    request_config: LlmRequestConfig,
    /// Catalog text shown to the model; the registry's definitions when unset.
    catalog: Option<String>,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        model: Option<String>,
        max_steps: Option<usize>,
        request_config: Option<LlmRequestConfig>,
    ) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            tools,
            extractor: ToolCallExtractor::new(),
            observer: Arc::new(TracingObserver),
            model,
            max_steps: max_steps.unwrap_or(DEFAULT_MAX_STEPS),
            request_config: request_config.unwrap_or_default(),
            catalog: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn LoopObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Show `catalog` to the model instead of the registry's definitions.
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn with_extractor(mut self, extractor: ToolCallExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Answer one query and return just the text.
    pub async fn run_query(&self, query: &str) -> String {
        self.run(query).await.text
    }

    /// Answer one query.
    pub async fn run(&self, query: &str) -> AgentAnswer {
        info!(
            query = %truncate_string(query, 80),
            model = %self.model,
            max_steps = self.max_steps,
            "processing query"
        );

        let mut state = QueryState::default();
        let catalog = self
            .catalog
            .clone()
            .unwrap_or_else(|| self.tools.catalog_json());
        let mut prompt = build_initial_prompt(query, &catalog);

        for step in 1..=self.max_steps {
            self.observer.on_event(&LoopEvent::PromptSent {
                step,
                max_steps: self.max_steps,
                prompt: &prompt,
            });
            let response = self.ask_model(&prompt).await;

            let Some((call, strategy)) = self.extractor.extract_with_strategy(&response) else {
                self.observer.on_event(&LoopEvent::NoCallExtracted {
                    step,
                    response: &response,
                });
                return AgentAnswer {
                    text: response,
                    outcome: LoopOutcome::NoCall,
                    dispatches: state.dispatches(),
                };
            };
            self.observer.on_event(&LoopEvent::CallExtracted {
                step,
                call: &call,
                strategy,
            });

            // The step is still spent and the prompt stays as it was.
            if state.is_duplicate(&call) {
                self.observer
                    .on_event(&LoopEvent::CallSkippedDuplicate { step, call: &call });
                continue;
            }

            let dispatched = AssertUnwindSafe(self.tools.try_dispatch(&call))
                .catch_unwind()
                .await;
            let text = match dispatched {
                Ok(Ok(text)) => text,
                Ok(Err(text)) => {
                    self.observer.on_event(&LoopEvent::ToolFailed {
                        step,
                        tool: &call.name,
                        error: &text,
                        fatal: false,
                    });
                    text
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(tool = %call.name, error = %message, "tool panicked, aborting query");
                    self.observer.on_event(&LoopEvent::ToolFailed {
                        step,
                        tool: &call.name,
                        error: &message,
                        fatal: true,
                    });
                    return AgentAnswer {
                        text: format!("[ERROR] Tool failed: {message}"),
                        outcome: LoopOutcome::ToolFailure,
                        dispatches: state.dispatches(),
                    };
                }
            };

            self.observer.on_event(&LoopEvent::ToolDispatched {
                step,
                tool: &call.name,
                output: &text,
            });
            let output = ToolOutput::new(call.name.clone(), text);
            state.record(call, output);
            prompt = build_followup_prompt(query, state.outputs());
        }

        let final_prompt = build_final_prompt(query, state.outputs());
        self.observer.on_event(&LoopEvent::Finalized {
            prompt: &final_prompt,
            dispatches: state.dispatches(),
        });
        let text = self.ask_model(&final_prompt).await;

        AgentAnswer {
            text,
            outcome: LoopOutcome::Finalized,
            dispatches: state.dispatches(),
        }
    }

    /// Send one prompt. Transport errors come back as the response text.
    async fn ask_model(&self, prompt: &str) -> String {
        let response = self
            .provider
            .complete(prompt, &self.model, &self.request_config)
            .await;
        if response.is_error() {
            error!(
                model = %self.model,
                provider = %self.provider.display_name(),
                "model call failed"
            );
        }
        response.into_text()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
