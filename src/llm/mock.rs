//! Scripted in-process adapter for tests.
//!
//! Replies are chosen by matching a needle against the request's system
//! prompt; the first matching rule wins. Every request is recorded so tests
//! can assert on call counts.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Transport,
    Quota,
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(Failure),
}

#[derive(Default)]
pub struct ScriptedLLM {
    rules: Vec<(String, Reply)>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedLLM {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, system_needle: &str, reply: &str) -> Self {
        self.rules
            .push((system_needle.to_string(), Reply::Text(reply.to_string())));
        self
    }

    pub fn fail(mut self, system_needle: &str, failure: Failure) -> Self {
        self.rules.push((system_needle.to_string(), Reply::Fail(failure)));
        self
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of recorded requests whose system prompt contains `needle`
    pub fn calls_matching(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.system_prompt().is_some_and(|s| s.contains(needle)))
            .count()
    }
}

#[async_trait]
impl LLMAdapter for ScriptedLLM {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let system = request.system_prompt().unwrap_or_default();
        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| system.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Text(content)) => Ok(LLMResponse {
                content,
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            }),
            Some(Reply::Fail(Failure::Quota)) => {
                Err(AppError::QuotaExhausted("402 Payment Required".to_string()))
            }
            Some(Reply::Fail(Failure::Transport)) | None => {
                Err(AppError::LLMApi("connection refused".to_string()))
            }
        }
    }
}
