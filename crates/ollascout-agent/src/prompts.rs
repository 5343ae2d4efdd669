//! Prompt text for the three phases of a query.
//!
//! All builders are pure: the same inputs always give the same text.

use ollascout_core::types::ToolOutput;

use crate::extractor::{TOOL_CALL_END, TOOL_CALL_START};
use crate::tools::FETCH_TOOL_NAME;

/// Prompt for the first step: rules, the tool catalog, and the question.
pub fn build_initial_prompt(query: &str, tools_catalog: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are an AI assistant that answers only in English.\n");
    prompt.push_str("You can call external tools with tool calls.\n\n");
    prompt.push_str("## Rules\n");
    prompt.push_str("- Do NOT guess.\n");
    prompt.push_str("- If the question relates to a tool, you MUST call that tool first.\n");
    prompt.push_str("- When you call a tool, reply with the tool call only:\n");
    prompt.push_str(&format!("  {}\n\n", call_format_example()));
    prompt.push_str(&format!("<tools>\n{tools_catalog}\n</tools>\n\n"));
    prompt.push_str(&format!("User: {query}\n\n"));
    prompt.push_str("If the question relates to a tool, respond immediately with a tool call.\n");
    prompt.push_str(
        "Do NOT ask the user to clarify. Pick the best-fitting tool and use it directly.\n",
    );
    prompt
}

/// Prompt after at least one tool ran: its results, and an invitation to
/// either call another tool or stop.
pub fn build_followup_prompt(query: &str, outputs: &[ToolOutput]) -> String {
    let mut prompt = format!("The user asked: {query}\n\n");
    prompt.push_str("You have already used these tools:\n\n");
    prompt.push_str(&result_sections(outputs));
    prompt.push_str("\n\n");
    prompt.push_str("If needed, call another tool to gather more information.\n");
    prompt.push_str("Only give a final answer if you are confident it is complete.");

    let fetched = fetched_models(outputs);
    if !fetched.is_empty() {
        prompt.push_str(&format!(
            "\n\nAlready fetched metadata for: {}\n",
            fetched.join(", ")
        ));
        prompt.push_str(
            "Do NOT fetch metadata for these again. Pick a different model URL from the list.",
        );
    }

    prompt.push_str("\n\nUse this format for tool calls:\n");
    prompt.push_str(&format!(
        "{TOOL_CALL_START}\n{{\"name\": \"TOOL_NAME\", \"arguments\": {{\"param1\": \"value1\", ...}}}}\n{TOOL_CALL_END}\n\n"
    ));
    prompt.push_str("Do NOT use natural language or code-style syntax like fetch_tool(...).\n");
    prompt.push_str(&format!(
        "To call '{FETCH_TOOL_NAME}', you must pass a full `url` string from ollama.com.\n"
    ));
    prompt
}

/// Prompt once the step budget is spent: answer now, no more tools.
pub fn build_final_prompt(query: &str, outputs: &[ToolOutput]) -> String {
    let mut prompt = format!("The user asked: {query}\n\n");
    prompt.push_str("You gathered the following information from tool calls:\n\n");
    prompt.push_str(&result_sections(outputs));
    prompt.push_str("\n\n");
    prompt.push_str("Now give a final, complete answer.\n");
    prompt.push_str("Do NOT call any more tools.\n");
    prompt.push_str("Respond in natural language with your full answer.\n");
    prompt
}

/// Models whose metadata was already fetched, in first-seen order.
///
/// Taken from the first `Model:` line of each metadata output; outputs
/// without one are skipped.
pub fn fetched_models(outputs: &[ToolOutput]) -> Vec<String> {
    let mut models: Vec<String> = Vec::new();
    for output in outputs.iter().filter(|o| o.tool_name == FETCH_TOOL_NAME) {
        let Some(line) = output.text.lines().find(|l| l.starts_with("Model:")) else {
            continue;
        };
        let name = line["Model:".len()..].trim();
        if !name.is_empty() && !models.iter().any(|m| m == name) {
            models.push(name.to_string());
        }
    }
    models
}

fn result_sections(outputs: &[ToolOutput]) -> String {
    outputs
        .iter()
        .map(|o| format!("--- Result from {} ---\n{}", o.tool_name, o.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn call_format_example() -> String {
    format!(r#"{TOOL_CALL_START}{{"name": "...", "arguments": {{...}}}}{TOOL_CALL_END}"#)
}
