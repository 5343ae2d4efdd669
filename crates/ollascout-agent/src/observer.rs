//! Loop observation hook.
//!
//! The agent loop reports every transition as a [`LoopEvent`]. Implement
//! [`LoopObserver`] to surface progress in a UI or collect it in tests;
//! the default [`TracingObserver`] turns events into `tracing` records.

use ollascout_core::types::ToolCall;
use tracing::{debug, info, warn};

use crate::extractor::ExtractionStrategy;

/// One transition of the agent loop. `step` is 1-based.
#[derive(Clone, Debug)]
pub enum LoopEvent<'a> {
    /// A prompt is about to be sent to the model.
    PromptSent {
        step: usize,
        max_steps: usize,
        prompt: &'a str,
    },
    /// A tool call was found in the model response.
    CallExtracted {
        step: usize,
        call: &'a ToolCall,
        strategy: ExtractionStrategy,
    },
    /// The response carried no tool call; it is returned as the answer.
    NoCallExtracted { step: usize, response: &'a str },
    /// The call repeats an earlier one and was not dispatched.
    CallSkippedDuplicate { step: usize, call: &'a ToolCall },
    /// A tool ran and its output was recorded.
    ToolDispatched {
        step: usize,
        tool: &'a str,
        output: &'a str,
    },
    /// A tool failed. `fatal` is set when the failure aborted the query.
    ToolFailed {
        step: usize,
        tool: &'a str,
        error: &'a str,
        fatal: bool,
    },
    /// The final prompt was sent after the step budget ran out.
    Finalized { prompt: &'a str, dispatches: usize },
}

/// Receives loop events. Callbacks run inline on the loop task.
pub trait LoopObserver: Send + Sync {
    fn on_event(&self, _event: &LoopEvent<'_>) {}
}

/// Logs each event through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl LoopObserver for TracingObserver {
    fn on_event(&self, event: &LoopEvent<'_>) {
        match event {
            LoopEvent::PromptSent {
                step,
                max_steps,
                prompt,
            } => {
                debug!(step, max_steps, prompt_len = prompt.len(), "sending prompt to model");
            }
            LoopEvent::CallExtracted {
                step,
                call,
                strategy,
            } => {
                info!(
                    step,
                    tool = %call.name,
                    args = %call.arguments_json(),
                    strategy = %strategy,
                    "tool call extracted"
                );
            }
            LoopEvent::NoCallExtracted { step, response } => {
                debug!(step, response_len = response.len(), "no tool call, returning response");
            }
            LoopEvent::CallSkippedDuplicate { step, call } => {
                warn!(step, tool = %call.name, "skipping duplicate tool call");
            }
            LoopEvent::ToolDispatched { step, tool, output } => {
                debug!(step, tool = %tool, output_len = output.len(), "tool result recorded");
            }
            LoopEvent::ToolFailed {
                step,
                tool,
                error,
                fatal,
            } => {
                warn!(step, tool = %tool, error = %error, fatal, "tool failed");
            }
            LoopEvent::Finalized { prompt, dispatches } => {
                info!(dispatches, prompt_len = prompt.len(), "step budget spent, asking for final answer");
            }
        }
    }
}
