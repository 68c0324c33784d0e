use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::LLMConfig;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Sampling parameters for a single completion call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub json_output: bool,
}

impl SamplingParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            json_output: false,
        }
    }

    /// Short, deterministic-leaning output used for label decisions
    pub fn classification(max_tokens: u32) -> Self {
        Self::new(0.0, max_tokens)
    }
}

/// Completion handle shared by every agent in the process.
///
/// Wraps one provider adapter and the default generation parameters. Cloning
/// is cheap; all clones share the same adapter and HTTP client.
#[derive(Clone)]
pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    provider_name: String,
    model: String,
    defaults: SamplingParams,
}

impl LLM {
    pub fn new(config: &LLMConfig) -> AppResult<Self> {
        let adapter: Arc<dyn LLMAdapter> = match config.provider.as_str() {
            "openai" | "openai-compatible" => Arc::new(
                crate::llm::openai::OpenAIAdapter::new_with_api_base(
                    &config.api_key,
                    &config.base_url,
                    config.timeout(),
                )?,
            ),
            "groq" => Arc::new(crate::llm::groq::GroqAdapter::new(
                &config.api_key,
                config.timeout(),
            )?),
            other => {
                return Err(AppError::Config(format!("Unsupported LLM provider: {}", other)));
            }
        };

        Ok(Self {
            adapter,
            provider_name: config.provider.clone(),
            model: config.model.clone(),
            defaults: SamplingParams::new(config.temperature, config.max_tokens),
        })
    }

    /// Build a handle around an arbitrary adapter
    pub fn with_adapter(adapter: Arc<dyn LLMAdapter>, model: impl Into<String>) -> Self {
        Self {
            adapter,
            provider_name: "custom".to_string(),
            model: model.into(),
            defaults: SamplingParams::new(0.2, 2000),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// One system + user completion with the default parameters
    pub async fn complete(&self, system: &str, user: &str) -> AppResult<String> {
        self.complete_with(system, user, self.defaults).await
    }

    pub async fn complete_with(
        &self,
        system: &str,
        user: &str,
        params: SamplingParams,
    ) -> AppResult<String> {
        let request = LLMRequest {
            model: self.model.clone(),
            messages: vec![LLMMessage::system(system), LLMMessage::user(user)],
            max_tokens: Some(params.max_tokens),
            temperature: Some(params.temperature),
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            json_output: params.json_output,
        };

        let response = self.adapter.create_chat_completion(&request).await?;
        debug!(
            provider = %self.provider_name,
            finish_reason = %response.finish_reason,
            total_tokens = response.usage.total_tokens,
            "Completion finished"
        );
        Ok(response.content)
    }
}
