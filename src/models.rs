use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;
use validator::{Validate, ValidationError};

use crate::agents::{AdvisorAgent, AdvisorClient, DecisionClient, PipelineRunner, PromptStore, RouterAgent};
use crate::business::BusinessRegistryClient;
use crate::config::Config;
use crate::llm::{SamplingParams, LLM};
use crate::tools::ToolInvoker;
use crate::types::{AppResult, Mode};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub router: Arc<RouterAgent>,
    pub advisor: Arc<AdvisorAgent>,
    pub business: Arc<BusinessRegistryClient>,
}

impl AppState {
    /// Composition root: every long-lived client is created here, once.
    ///
    /// Both agents share one LLM handle, one decision client and one prompt
    /// store.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let config = Arc::new(config);

        let llm = LLM::new(&config.llm)?;
        let decisions = DecisionClient::new(
            llm.clone(),
            SamplingParams::new(config.llm.decision_temperature, config.llm.decision_max_tokens),
        );
        let prompts = Arc::new(PromptStore::load(&config.prompts.dir));

        let support = ToolInvoker::new(
            &config.tools.support_base_url,
            config.tools.timeout(),
            config.tools.max_concurrency,
        )?;
        let advisor = AdvisorAgent::new(PipelineRunner::new(
            llm,
            decisions.clone(),
            prompts.clone(),
            support,
        ));

        let tools = ToolInvoker::new(
            &config.tools.mcp_base_url,
            config.tools.timeout(),
            config.tools.max_concurrency,
        )?;
        let forwarder = match config.forwarding.agent2_url.as_deref() {
            Some(url) => Some(AdvisorClient::new(url, config.forwarding.timeout())?),
            None => {
                info!("AGENT2_URL not set, router results will not be forwarded");
                None
            }
        };
        let router = RouterAgent::new(decisions, tools, prompts, forwarder);

        let business = Arc::new(BusinessRegistryClient::new(&config.registry)?);

        Ok(Self {
            config,
            router: Arc::new(router),
            advisor: Arc::new(advisor),
            business,
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// A legal-service provider candidate
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProviderRecord {
    pub name: Option<String>,
    pub location: Option<String>,
    pub jurisdiction: Option<String>,
    pub practice_areas: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

// API Request/Response types

/// Front agent request
#[derive(Debug, serde::Deserialize, Validate)]
pub struct UserRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub question: String,
}

/// Agent-to-agent request accepted by the advisor.
///
/// The field set is the union of every version seen on the wire.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, Validate)]
pub struct AdvisorRequest {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub query: String,
    #[serde(default)]
    pub law_context: Option<String>,
    #[serde(default)]
    pub extra_notes: Option<String>,
    #[serde(default)]
    pub providers: Option<Vec<ProviderRecord>>,
    #[serde(default)]
    pub relevant_laws: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseMeta {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdvisorResponse {
    pub mode_used: Mode,
    pub answer_markdown: String,
    pub meta: ResponseMeta,
}

/// Front agent response: either an error object or the routed result
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum RouterResponse {
    Error {
        error: String,
    },
    Routed {
        tool: String,
        arguments: Map<String, Value>,
        summary: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        agent2_mode: Option<Mode>,
        #[serde(skip_serializing_if = "Option::is_none")]
        agent2_response: Option<AdvisorResponse>,
        #[serde(skip_serializing_if = "Option::is_none")]
        agent2_error: Option<String>,
    },
}

#[derive(Debug, serde::Deserialize)]
pub struct SearchEntityRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_obj")]
    pub obj: String,
}

fn default_obj() -> String {
    "org".to_string()
}

#[derive(Debug, serde::Deserialize)]
pub struct InnRequest {
    #[serde(default)]
    pub inn: String,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub services: Vec<String>,
}
