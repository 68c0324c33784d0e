//! Referral stage.
//!
//! When the caller supplied no providers, a tool-list decision picks which
//! support-provider searches to run. The searches run concurrently on the
//! tool worker pool; failed ones are skipped. The gathered providers are
//! rendered into a text block for the final completion.

use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::agents::decision::DecisionClient;
use crate::agents::pipeline::PipelineRequest;
use crate::agents::prompts::{PromptKey, PromptStore};
use crate::llm::LLM;
use crate::models::ProviderRecord;
use crate::tools::{Capability, SupportTool, ToolInvoker};

pub const NO_TOOL_LABEL: &str = "NO_TOOL";
const DECISION_MAX_TOKENS: u32 = 64;

pub const NO_PROVIDERS_TEXT: &str = "No provider data was found.";

pub const REFERRAL_UNAVAILABLE: &str = "A referral could not be generated right now because the \
language model did not respond. Consider contacting a local bar association or legal aid \
office for help finding a lawyer.";

/// Render providers as a numbered plain-text block
pub fn format_providers_for_context(providers: &[ProviderRecord]) -> String {
    if providers.is_empty() {
        return NO_PROVIDERS_TEXT.to_string();
    }

    let mut lines = Vec::with_capacity(providers.len() * 7);
    for (idx, p) in providers.iter().enumerate() {
        let name = p.name.as_deref().unwrap_or("Unknown name");
        let location = p
            .location
            .as_deref()
            .or(p.jurisdiction.as_deref())
            .unwrap_or("Unknown location");
        let practice_areas = join_or_na(p.practice_areas.as_deref());
        let languages = join_or_na(p.languages.as_deref());
        let website = p.website.as_deref().unwrap_or("N/A");

        lines.push(format!("{}. {}", idx + 1, name));
        lines.push(format!("   Location / Jurisdiction: {}", location));
        lines.push(format!("   Practice areas: {}", practice_areas));
        lines.push(format!("   Languages: {}", languages));
        lines.push(format!("   Website: {}", website));
        if let Some(notes) = p.notes.as_deref().filter(|n| !n.is_empty()) {
            lines.push(format!("   Notes: {}", notes));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn join_or_na(items: Option<&[String]>) -> String {
    match items {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => "N/A".to_string(),
    }
}

/// Parse a support tool response body into provider records.
///
/// The body must be a JSON object; a missing `providers` field means no
/// providers, a non-array one is an error. Entries that are not objects are
/// dropped.
pub fn parse_providers(body: &str) -> Result<Vec<ProviderRecord>, String> {
    let data: Value = serde_json::from_str(body).map_err(|e| format!("invalid JSON: {}", e))?;

    let providers = match data.get("providers") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(format!("'providers' is not a list: {}", other)),
    };

    Ok(providers
        .iter()
        .filter(|p| p.is_object())
        .filter_map(|p| match serde_json::from_value::<ProviderRecord>(p.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed provider entry");
                None
            }
        })
        .collect())
}

pub struct ReferralStage;

impl ReferralStage {
    pub async fn run(
        llm: &LLM,
        decisions: &DecisionClient,
        prompts: &PromptStore,
        support: &ToolInvoker,
        request: &PipelineRequest,
    ) -> String {
        let providers = match request.providers.as_deref() {
            Some(given) if !given.is_empty() => given.to_vec(),
            _ => Self::search_providers(decisions, prompts, support, request).await,
        };

        let situation = match request.extra_notes.as_deref() {
            Some(notes) if !notes.is_empty() => {
                format!("{}\n\n[Additional preferences]\n{}", request.query, notes)
            }
            _ => request.query.clone(),
        };

        let user = format!(
            "User situation:\n{}\n\nAvailable providers (if any):\n\n{}\n\n\
             Based on this, explain what type of legal help is appropriate, \
             suggest some providers (if available) in a neutral way, \
             and give criteria and next steps as described in the system instructions.",
            situation,
            format_providers_for_context(&providers)
        );

        match llm.complete(prompts.get(PromptKey::Referral), &user).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("Referral stage returned an empty completion");
                REFERRAL_UNAVAILABLE.to_string()
            }
            Ok(text) => {
                info!(providers = providers.len(), response_len = text.len(), "Referral stage complete");
                text
            }
            Err(e) => {
                error!(error = %e, "Referral stage failed");
                REFERRAL_UNAVAILABLE.to_string()
            }
        }
    }

    async fn search_providers(
        decisions: &DecisionClient,
        prompts: &PromptStore,
        support: &ToolInvoker,
        request: &PipelineRequest,
    ) -> Vec<ProviderRecord> {
        let system = format!(
            "{}\n\nAvailable tools (names):\n{}",
            prompts.get(PromptKey::ReferralDecider),
            SupportTool::names().join(", ")
        );
        let user = format!(
            "User situation:\n{}\n\nExtra notes (may be empty):\n{}\n\n\
             Remember: reply with exactly either:\n- 'NO_TOOL'\nor\n\
             - one or more tool names from the list, separated by commas or new lines.",
            request.query,
            request.extra_notes.as_deref().unwrap_or_default()
        );

        let tools: Vec<SupportTool> = decisions
            .decide_tools(&system, &user, NO_TOOL_LABEL, DECISION_MAX_TOKENS)
            .await;

        let mut arguments = Map::new();
        arguments.insert("situation".to_string(), Value::from(request.query.clone()));
        if let Some(notes) = request.extra_notes.as_deref().filter(|n| !n.is_empty()) {
            arguments.insert("extra_notes".to_string(), Value::from(notes));
        }

        let outcomes = join_all(tools.iter().map(|tool| support.invoke(*tool, &arguments))).await;

        let mut providers = Vec::new();
        for outcome in outcomes {
            let Some(body) = outcome.body() else {
                continue;
            };
            match parse_providers(body) {
                Ok(found) => providers.extend(found),
                Err(reason) => warn!(tool = %outcome.tool(), reason = %reason, "Unusable provider search result"),
            }
        }
        providers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::ScriptedLLM;
    use crate::llm::SamplingParams;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup(fake: &Arc<ScriptedLLM>, support_url: &str) -> (LLM, DecisionClient, PromptStore, ToolInvoker) {
        let llm = LLM::with_adapter(fake.clone(), "m");
        let decisions = DecisionClient::new(llm.clone(), SamplingParams::new(0.7, 300));
        let prompts = PromptStore::builtin()
            .with(PromptKey::ReferralDecider, "SYS_REFERRAL_DECIDER")
            .with(PromptKey::Referral, "SYS_REFERRAL_WRITER");
        let support = ToolInvoker::new(support_url, Duration::from_secs(5), 4).unwrap();
        (llm, decisions, prompts, support)
    }

    #[test]
    fn test_format_providers() {
        let providers = vec![
            ProviderRecord {
                name: Some("Acme Legal".to_string()),
                jurisdiction: Some("Berlin".to_string()),
                practice_areas: Some(vec!["tenancy".to_string(), "consumer".to_string()]),
                notes: Some("Free first call".to_string()),
                ..Default::default()
            },
            ProviderRecord::default(),
        ];

        let block = format_providers_for_context(&providers);
        let expected = "1. Acme Legal\n   Location / Jurisdiction: Berlin\n   Practice areas: tenancy, consumer\n   Languages: N/A\n   Website: N/A\n   Notes: Free first call\n\n2. Unknown name\n   Location / Jurisdiction: Unknown location\n   Practice areas: N/A\n   Languages: N/A\n   Website: N/A\n";
        assert_eq!(block, expected);
    }

    #[test]
    fn test_format_empty_providers() {
        assert_eq!(format_providers_for_context(&[]), NO_PROVIDERS_TEXT);
    }

    #[test]
    fn test_parse_providers() {
        let found = parse_providers(r#"{"providers": [{"name": "A"}, 42, {"name": "B", "website": "b.example"}]}"#).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].website.as_deref(), Some("b.example"));

        assert!(parse_providers(r#"{"providers": "none"}"#).is_err());
        assert!(parse_providers("not json").is_err());
        assert!(parse_providers("{}").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_supplied_providers_skip_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let fake = Arc::new(ScriptedLLM::new().respond("SYS_REFERRAL_WRITER", "See Acme Legal."));
        let (llm, decisions, prompts, support) = setup(&fake, &server.url());
        let request = PipelineRequest::new("Need a tenancy lawyer").with_providers(vec![ProviderRecord {
            name: Some("Acme Legal".to_string()),
            ..Default::default()
        }]);

        let out = ReferralStage::run(&llm, &decisions, &prompts, &support, &request).await;

        assert_eq!(out, "See Acme Legal.");
        assert_eq!(fake.calls_matching("SYS_REFERRAL_DECIDER"), 0);
        assert!(fake.requests()[0].user_prompt().unwrap().contains("1. Acme Legal"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_decided_search_feeds_provider_block() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/providers/search")
            .match_body(mockito::Matcher::Json(json!({
                "situation": "Evicted without notice",
                "extra_notes": "Russian speaking"
            })))
            .with_status(200)
            .with_body(r#"{"providers": [{"name": "Tenant Aid", "languages": ["ru", "en"]}]}"#)
            .expect(1)
            .create_async()
            .await;

        let fake = Arc::new(
            ScriptedLLM::new()
                .respond("SYS_REFERRAL_DECIDER", "support.search_providers")
                .respond("SYS_REFERRAL_WRITER", "Contact Tenant Aid."),
        );
        let (llm, decisions, prompts, support) = setup(&fake, &server.url());
        let request = PipelineRequest::new("Evicted without notice").with_extra_notes("Russian speaking");

        let out = ReferralStage::run(&llm, &decisions, &prompts, &support, &request).await;
        assert_eq!(out, "Contact Tenant Aid.");

        let requests = fake.requests();
        assert!(requests[0].system_prompt().unwrap().contains("support.search_providers"));
        let writer = requests[1].user_prompt().unwrap().to_string();
        assert!(writer.contains("Languages: ru, en"));
        assert!(writer.contains("[Additional preferences]\nRussian speaking"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_search_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/providers/search")
            .with_status(500)
            .create_async()
            .await;

        let fake = Arc::new(
            ScriptedLLM::new()
                .respond("SYS_REFERRAL_DECIDER", "support.search_providers")
                .respond("SYS_REFERRAL_WRITER", "No providers, try legal aid."),
        );
        let (llm, decisions, prompts, support) = setup(&fake, &server.url());

        let out = ReferralStage::run(&llm, &decisions, &prompts, &support, &PipelineRequest::new("q")).await;

        assert_eq!(out, "No providers, try legal aid.");
        assert!(fake.requests()[1].user_prompt().unwrap().contains(NO_PROVIDERS_TEXT));
    }

    #[tokio::test]
    async fn test_no_tool_decision_makes_no_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let fake = Arc::new(
            ScriptedLLM::new()
                .respond("SYS_REFERRAL_DECIDER", "NO_TOOL")
                .respond("SYS_REFERRAL_WRITER", "General guidance."),
        );
        let (llm, decisions, prompts, support) = setup(&fake, &server.url());

        ReferralStage::run(&llm, &decisions, &prompts, &support, &PipelineRequest::new("q")).await;
        mock.assert_async().await;
    }
}
