//! Router Agent
//!
//! Front agent. Picks one business-registry lookup for the user's question,
//! runs it, then forwards the question with the lookup result to the advisor
//! agent when forwarding is configured.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::agents::decision::DecisionClient;
use crate::agents::intent::classify_intent;
use crate::agents::prompts::{PromptKey, PromptStore};
use crate::models::{AdvisorResponse, RouterResponse};
use crate::tools::{Capability, RegistryTool, ToolInvoker};
use crate::types::{AppError, AppResult, Mode};

pub const NO_TOOL_ERROR: &str = "No suitable MCP tool found.";
pub const ADVISOR_PATH: &str = "legal-advisor-and-referral";

/// Payload sent to the advisor agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardRequest {
    pub mode: Mode,
    pub query: String,
    pub law_context: String,
}

/// HTTP client for the advisor agent's contract
#[derive(Clone)]
pub struct AdvisorClient {
    client: Client,
    endpoint: String,
}

impl AdvisorClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build advisor HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), ADVISOR_PATH),
        })
    }

    pub async fn forward(&self, request: &ForwardRequest) -> AppResult<AdvisorResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("advisor request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("advisor returned {}: {}", status, body)));
        }

        response
            .json::<AdvisorResponse>()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid advisor response: {}", e)))
    }
}

pub struct RouterAgent {
    decisions: DecisionClient,
    tools: ToolInvoker,
    prompts: Arc<PromptStore>,
    forwarder: Option<AdvisorClient>,
}

impl RouterAgent {
    pub fn new(
        decisions: DecisionClient,
        tools: ToolInvoker,
        prompts: Arc<PromptStore>,
        forwarder: Option<AdvisorClient>,
    ) -> Self {
        Self {
            decisions,
            tools,
            prompts,
            forwarder,
        }
    }

    #[cfg(test)]
    pub(crate) fn prompt_store(&self) -> &Arc<PromptStore> {
        &self.prompts
    }

    fn tool_selector_prompt(&self) -> String {
        format!(
            "{}\n\nAvailable tools:\n{}",
            self.prompts.get(PromptKey::ToolSelector),
            RegistryTool::catalogue()
        )
    }

    pub async fn generate(&self, question: &str) -> AppResult<RouterResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidRequest("Missing 'question' in payload".to_string()));
        }

        let decision = self
            .decisions
            .decide_tool::<RegistryTool>(question, &self.tool_selector_prompt())
            .await;

        if decision.is_none() {
            info!("No registry tool selected");
            return Ok(RouterResponse::Error {
                error: NO_TOOL_ERROR.to_string(),
            });
        }

        let outcome = self
            .tools
            .invoke_named::<RegistryTool>(&decision.tool, &decision.arguments)
            .await?;
        let summary = outcome.summary();

        let (agent2_mode, agent2_response, agent2_error) = match &self.forwarder {
            Some(forwarder) => {
                let law_context = outcome.body().unwrap_or_default().to_string();
                let mode = self.select_mode(question, &law_context).await;
                let request = ForwardRequest {
                    mode,
                    query: question.to_string(),
                    law_context,
                };

                match forwarder.forward(&request).await {
                    Ok(response) => (Some(mode), Some(response), None),
                    Err(e) => {
                        warn!(error = %e, "Forwarding to advisor failed");
                        (Some(mode), None, Some(e.to_string()))
                    }
                }
            }
            None => (None, None, None),
        };

        Ok(RouterResponse::Routed {
            tool: decision.tool,
            arguments: decision.arguments,
            summary,
            agent2_mode,
            agent2_response,
            agent2_error,
        })
    }

    /// Model's mode choice, overriding the keyword classifier when decided
    async fn select_mode(&self, question: &str, lookup: &str) -> Mode {
        let input = format!("User question:\n{}\n\nRegistry lookup result:\n{}", question, lookup);
        let decided = self
            .decisions
            .decide_mode(&input, self.prompts.get(PromptKey::ModeSelector))
            .await;
        classify_intent(question, decided.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::scripted_router;
    use crate::llm::mock::{Failure, ScriptedLLM};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_none_decision_skips_tool_and_forwarding() {
        let mut server = mockito::Server::new_async().await;
        let any = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let fake = Arc::new(ScriptedLLM::new().respond("SYS_TOOL_SELECTOR", r#"{"tool": "none", "arguments": {}}"#));
        let agent = scripted_router(&fake, &server.url(), Some(&server.url()));

        let result = agent.generate("What's the weather?").await.unwrap();

        assert_eq!(
            result,
            RouterResponse::Error {
                error: NO_TOOL_ERROR.to_string()
            }
        );
        assert_eq!(fake.call_count(), 1);
        any.assert_async().await;
    }

    #[tokio::test]
    async fn test_quota_exhausted_behaves_like_none() {
        let fake = Arc::new(ScriptedLLM::new().fail("SYS_TOOL_SELECTOR", Failure::Quota));
        let agent = scripted_router(&fake, "http://127.0.0.1:9", None);

        let result = agent.generate("Check INN 7707083893").await.unwrap();
        assert!(matches!(result, RouterResponse::Error { ref error } if error == NO_TOOL_ERROR));
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let fake = Arc::new(ScriptedLLM::new());
        let agent = scripted_router(&fake, "http://127.0.0.1:9", None);

        let err = agent.generate("  \n").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_routed_without_forwarding() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/get_company_full_profile")
            .with_status(200)
            .with_body(r#"{"inn":"7707083893","short_name":"ПАО СБЕРБАНК"}"#)
            .create_async()
            .await;

        let fake = Arc::new(ScriptedLLM::new().respond(
            "SYS_TOOL_SELECTOR",
            r#"{"tool": "get_company_full_profile", "arguments": {"inn": "7707083893"}}"#,
        ));
        let agent = scripted_router(&fake, &server.url(), None);

        let value = serde_json::to_value(agent.generate("Tell me about 7707083893").await.unwrap()).unwrap();

        assert_eq!(value["tool"], "get_company_full_profile");
        assert_eq!(value["arguments"], json!({"inn": "7707083893"}));
        assert!(value["summary"].as_str().unwrap().contains("СБЕРБАНК"));
        assert!(value.get("agent2_mode").is_none());
        assert!(value.get("agent2_error").is_none());
    }

    #[tokio::test]
    async fn test_forwarding_uses_decided_mode_and_lookup_result() {
        let mut tools = mockito::Server::new_async().await;
        tools
            .mock("POST", "/search_entity")
            .with_status(200)
            .with_body(r#"[{"title":"ООО Ромашка","inn":"7701234567"}]"#)
            .create_async()
            .await;

        let mut advisor = mockito::Server::new_async().await;
        let forwarded = advisor
            .mock("POST", "/legal-advisor-and-referral")
            .match_body(mockito::Matcher::PartialJson(json!({
                "mode": "referral",
                "query": "Find Romashka and suggest how to sue them",
                "law_context": "[{\"title\":\"ООО Ромашка\",\"inn\":\"7701234567\"}]"
            })))
            .with_status(200)
            .with_body(
                r###"{"mode_used":"pipeline","answer_markdown":"## Explanation\n\nok","meta":{"success":true,"error":null}}"###,
            )
            .expect(1)
            .create_async()
            .await;

        let fake = Arc::new(
            ScriptedLLM::new()
                .respond(
                    "SYS_TOOL_SELECTOR",
                    r#"{"tool": "search_entity", "arguments": {"query": "Ромашка", "obj": "org"}}"#,
                )
                .respond("SYS_MODE_SELECTOR", r#"{"mode": "referral"}"#),
        );
        let agent = scripted_router(&fake, &tools.url(), Some(&advisor.url()));

        let value = serde_json::to_value(
            agent
                .generate("Find Romashka and suggest how to sue them")
                .await
                .unwrap(),
        )
        .unwrap();

        assert_eq!(value["agent2_mode"], "referral");
        assert_eq!(value["agent2_response"]["mode_used"], "pipeline");
        assert!(value.get("agent2_error").is_none());
        forwarded.assert_async().await;
    }

    #[tokio::test]
    async fn test_undecided_mode_falls_back_to_keywords() {
        let mut tools = mockito::Server::new_async().await;
        tools
            .mock("POST", "/get_company_full_profile")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let mut advisor = mockito::Server::new_async().await;
        advisor
            .mock("POST", "/legal-advisor-and-referral")
            .match_body(mockito::Matcher::PartialJson(json!({"mode": "draft"})))
            .with_status(200)
            .with_body(r#"{"mode_used":"pipeline","answer_markdown":"x","meta":{"success":true,"error":null}}"#)
            .expect(1)
            .create_async()
            .await;

        let fake = Arc::new(
            ScriptedLLM::new()
                .respond(
                    "SYS_TOOL_SELECTOR",
                    r#"{"tool": "get_company_full_profile", "arguments": {"inn": "7707083893"}}"#,
                )
                .respond("SYS_MODE_SELECTOR", "not json"),
        );
        let agent = scripted_router(&fake, &tools.url(), Some(&advisor.url()));

        let value = serde_json::to_value(
            agent
                .generate("Draft a claim letter to 7707083893")
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(value["agent2_mode"], "draft");
    }

    #[tokio::test]
    async fn test_forwarding_failure_is_embedded() {
        let mut tools = mockito::Server::new_async().await;
        tools
            .mock("POST", "/get_entrepreneur_profile")
            .with_status(200)
            .with_body(r#"{"inn":"500100732259"}"#)
            .create_async()
            .await;

        let mut advisor = mockito::Server::new_async().await;
        advisor
            .mock("POST", "/legal-advisor-and-referral")
            .with_status(500)
            .with_body(r#"{"detail":"Internal error: boom"}"#)
            .create_async()
            .await;

        let fake = Arc::new(
            ScriptedLLM::new()
                .respond(
                    "SYS_TOOL_SELECTOR",
                    r#"{"tool": "get_entrepreneur_profile", "arguments": {"inn": "500100732259"}}"#,
                )
                .respond("SYS_MODE_SELECTOR", r#"{"mode": "explain"}"#),
        );
        let agent = scripted_router(&fake, &tools.url(), Some(&advisor.url()));

        let value: Value = serde_json::to_value(agent.generate("Is this IP active?").await.unwrap()).unwrap();

        assert_eq!(value["tool"], "get_entrepreneur_profile");
        assert_eq!(value["agent2_mode"], "explain");
        assert!(value.get("agent2_response").is_none());
        assert!(value["agent2_error"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_tool_failure_still_returns_summary() {
        let mut tools = mockito::Server::new_async().await;
        tools
            .mock("POST", "/get_company_full_profile")
            .with_status(502)
            .create_async()
            .await;

        let fake = Arc::new(ScriptedLLM::new().respond(
            "SYS_TOOL_SELECTOR",
            r#"{"tool": "get_company_full_profile", "arguments": {"inn": "7707083893"}}"#,
        ));
        let agent = scripted_router(&fake, &tools.url(), None);

        let value = serde_json::to_value(agent.generate("Check 7707083893").await.unwrap()).unwrap();
        assert_eq!(value["summary"], "MCP call failed for tool get_company_full_profile");
    }
}
