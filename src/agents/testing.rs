//! Agents wired to a scripted LLM for tests.
//!
//! System prompts are replaced with `SYS_*` markers so scripted replies can
//! target one decision or stage each.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::agents::advisor::AdvisorAgent;
use crate::agents::decision::DecisionClient;
use crate::agents::pipeline::PipelineRunner;
use crate::agents::prompts::{PromptKey, PromptStore};
use crate::agents::router::{AdvisorClient, RouterAgent};
use crate::business::BusinessRegistryClient;
use crate::config::{
    Config, ForwardingConfig, LLMConfig, LoggingConfig, PromptsConfig, RegistryConfig, ServerConfig,
    ToolsConfig,
};
use crate::llm::mock::ScriptedLLM;
use crate::llm::{SamplingParams, LLM};
use crate::models::AppState;
use crate::tools::ToolInvoker;

/// Closed local port; support tool calls fail fast
const UNREACHABLE: &str = "http://127.0.0.1:9";

pub fn scripted_prompts() -> PromptStore {
    PromptStore::builtin()
        .with(PromptKey::ToolSelector, "SYS_TOOL_SELECTOR")
        .with(PromptKey::ModeSelector, "SYS_MODE_SELECTOR")
        .with(PromptKey::Explain, "SYS_EXPLAIN")
        .with(PromptKey::ReferralDecider, "SYS_REFERRAL_DECIDER")
        .with(PromptKey::Referral, "SYS_REFERRAL_WRITER")
        .with(PromptKey::DraftDecider, "SYS_DRAFT_DECIDER")
        .with(PromptKey::Draft, "SYS_DRAFT_WRITER")
}

fn decisions(llm: &LLM) -> DecisionClient {
    DecisionClient::new(llm.clone(), SamplingParams::new(0.7, 300))
}

pub fn scripted_advisor(fake: &Arc<ScriptedLLM>) -> AdvisorAgent {
    let llm = LLM::with_adapter(fake.clone(), "test-model");
    let support = ToolInvoker::new(UNREACHABLE, Duration::from_secs(2), 4).unwrap();
    AdvisorAgent::new(PipelineRunner::new(
        llm.clone(),
        decisions(&llm),
        Arc::new(scripted_prompts()),
        support,
    ))
}

pub fn scripted_router(fake: &Arc<ScriptedLLM>, tools_url: &str, advisor_url: Option<&str>) -> RouterAgent {
    let llm = LLM::with_adapter(fake.clone(), "test-model");
    let tools = ToolInvoker::new(tools_url, Duration::from_secs(5), 4).unwrap();
    let forwarder = advisor_url.map(|url| AdvisorClient::new(url, Duration::from_secs(5)).unwrap());
    RouterAgent::new(decisions(&llm), tools, Arc::new(scripted_prompts()), forwarder)
}

/// Configuration with no external services reachable
pub fn offline_config() -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        },
        llm: LLMConfig {
            provider: "openai".to_string(),
            api_key: String::new(),
            base_url: UNREACHABLE.to_string(),
            model: "test-model".to_string(),
            temperature: 0.2,
            max_tokens: 2000,
            decision_temperature: 0.7,
            decision_max_tokens: 300,
            timeout_secs: 2,
        },
        tools: ToolsConfig {
            mcp_base_url: UNREACHABLE.to_string(),
            support_base_url: UNREACHABLE.to_string(),
            timeout_secs: 2,
            max_concurrency: 4,
        },
        forwarding: ForwardingConfig {
            agent2_url: None,
            timeout_secs: 2,
        },
        registry: RegistryConfig {
            checko_api_key: None,
            dadata_api_key: None,
            checko_base_url: UNREACHABLE.to_string(),
            dadata_base_url: UNREACHABLE.to_string(),
            timeout_secs: 2,
        },
        prompts: PromptsConfig {
            dir: PathBuf::from("prompts"),
        },
        logging: LoggingConfig {
            level: None,
            dir: None,
        },
    }
}

/// Application state whose agents answer from `fake`
pub fn scripted_state(fake: &Arc<ScriptedLLM>) -> AppState {
    let config = offline_config();
    AppState {
        router: Arc::new(scripted_router(fake, UNREACHABLE, None)),
        advisor: Arc::new(scripted_advisor(fake)),
        business: Arc::new(BusinessRegistryClient::new(&config.registry).unwrap()),
        config: Arc::new(config),
    }
}
