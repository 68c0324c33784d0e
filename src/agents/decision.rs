//! Decision Client
//!
//! Wraps single constrained completion calls whose output must fit a small
//! schema: a tool choice, a mode choice, a label, or a list of tool names.
//! Every method makes exactly one attempt and never returns an error; a
//! decision that cannot be trusted becomes the sentinel for its kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::llm::{SamplingParams, LLM};
use crate::tools::Capability;
use crate::types::{AppError, Mode};

/// Model's choice of capability and arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDecision {
    pub tool: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolDecision {
    pub const NONE: &'static str = "none";

    pub fn none() -> Self {
        Self {
            tool: Self::NONE.to_string(),
            arguments: Map::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.tool == Self::NONE
    }
}

/// Model's choice of downstream mode; `None` when undecided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDecision {
    pub mode: Option<Mode>,
}

impl ModeDecision {
    pub fn undecided() -> Self {
        Self { mode: None }
    }
}

#[derive(Deserialize)]
struct RawToolDecision {
    tool: String,
    #[serde(default)]
    arguments: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RawModeDecision {
    mode: String,
}

/// Pull the JSON payload out of a completion, tolerating markdown fences
fn extract_json_block(response: &str) -> &str {
    if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(response)
            .trim()
    } else if response.contains("```") {
        response.split("```").nth(1).unwrap_or(response).trim()
    } else {
        response.trim()
    }
}

fn parse_tool_decision<C: Capability>(raw: &str) -> Result<ToolDecision, String> {
    let parsed: RawToolDecision = serde_json::from_str(extract_json_block(raw))
        .map_err(|e| format!("invalid tool decision JSON: {}", e))?;

    let tool = parsed.tool.trim();
    if tool.eq_ignore_ascii_case(ToolDecision::NONE) {
        return Ok(ToolDecision::none());
    }

    let capability = C::from_name(tool).ok_or_else(|| format!("unregistered tool '{}'", tool))?;
    Ok(ToolDecision {
        tool: capability.name().to_string(),
        arguments: parsed.arguments.unwrap_or_default(),
    })
}

fn parse_mode_decision(raw: &str) -> Result<ModeDecision, String> {
    let parsed: RawModeDecision = serde_json::from_str(extract_json_block(raw))
        .map_err(|e| format!("invalid mode decision JSON: {}", e))?;

    let mode = Mode::from_name(&parsed.mode).ok_or_else(|| format!("unknown mode '{}'", parsed.mode))?;
    Ok(ModeDecision { mode: Some(mode) })
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '\'' | '"' | '`' | '.'))
        .trim()
        .to_uppercase()
}

/// Parse a comma/newline separated list of tool names.
///
/// Unknown names are dropped; duplicates keep their first position.
fn parse_tool_list<C: Capability + PartialEq>(raw: &str, no_tool: &str) -> Vec<C> {
    if normalize_label(raw) == no_tool {
        return Vec::new();
    }

    let mut selected: Vec<C> = Vec::new();
    for part in raw.lines().flat_map(|line| line.split(',')) {
        let name = part.trim();
        if name.is_empty() {
            continue;
        }
        match C::from_name(name) {
            Some(capability) if !selected.contains(&capability) => selected.push(capability),
            Some(_) => {}
            None => debug!(name = %name, "Ignoring unknown tool name in decision"),
        }
    }
    selected
}

#[derive(Clone)]
pub struct DecisionClient {
    llm: LLM,
    params: SamplingParams,
}

impl DecisionClient {
    pub fn new(llm: LLM, params: SamplingParams) -> Self {
        Self { llm, params }
    }

    /// Run one completion; any failure is logged and mapped to `None`
    async fn attempt(&self, kind: &str, system: &str, user: &str, params: SamplingParams) -> Option<String> {
        match self.llm.complete_with(system, user, params).await {
            Ok(raw) => Some(raw),
            Err(AppError::QuotaExhausted(msg)) => {
                warn!(decision = kind, error = %msg, "LLM quota exhausted, using sentinel decision");
                None
            }
            Err(e) => {
                warn!(decision = kind, error = %e, "LLM decision call failed, using sentinel decision");
                None
            }
        }
    }

    /// Choose at most one capability from the `C` registry
    pub async fn decide_tool<C: Capability>(&self, input: &str, system_prompt: &str) -> ToolDecision {
        let params = SamplingParams {
            json_output: true,
            ..self.params
        };
        let Some(raw) = self.attempt("tool", system_prompt, input, params).await else {
            return ToolDecision::none();
        };

        match parse_tool_decision::<C>(&raw) {
            Ok(decision) => {
                info!(tool = %decision.tool, "Tool decision made");
                decision
            }
            Err(reason) => {
                warn!(reason = %reason, raw = %raw, "Rejected tool decision");
                ToolDecision::none()
            }
        }
    }

    pub async fn decide_mode(&self, input: &str, system_prompt: &str) -> ModeDecision {
        let params = SamplingParams {
            json_output: true,
            ..self.params
        };
        let Some(raw) = self.attempt("mode", system_prompt, input, params).await else {
            return ModeDecision::undecided();
        };

        match parse_mode_decision(&raw) {
            Ok(decision) => {
                info!(mode = ?decision.mode, "Mode decision made");
                decision
            }
            Err(reason) => {
                warn!(reason = %reason, raw = %raw, "Rejected mode decision");
                ModeDecision::undecided()
            }
        }
    }

    /// Ask for exactly one of `labels`; `None` when the answer is anything else
    pub async fn decide_label(
        &self,
        system_prompt: &str,
        user: &str,
        labels: &[&str],
        max_tokens: u32,
    ) -> Option<String> {
        let raw = self
            .attempt("label", system_prompt, user, SamplingParams::classification(max_tokens))
            .await?;

        let label = normalize_label(&raw);
        if labels.contains(&label.as_str()) {
            debug!(label = %label, "Label decision made");
            Some(label)
        } else {
            warn!(raw = %raw, "Label decision outside the allowed set");
            None
        }
    }

    /// Ask which tools from the `C` registry to call; empty on `no_tool` or failure
    pub async fn decide_tools<C: Capability + PartialEq>(
        &self,
        system_prompt: &str,
        user: &str,
        no_tool: &str,
        max_tokens: u32,
    ) -> Vec<C> {
        let Some(raw) = self
            .attempt("tools", system_prompt, user, SamplingParams::classification(max_tokens))
            .await
        else {
            return Vec::new();
        };

        let selected = parse_tool_list::<C>(&raw, no_tool);
        info!(count = selected.len(), "Tool list decision made");
        selected
    }
}
