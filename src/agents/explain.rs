//! Explain stage: a plain-language explanation of the user's situation.

use tracing::{error, info, warn};

use crate::agents::pipeline::PipelineRequest;
use crate::agents::prompts::{PromptKey, PromptStore};
use crate::llm::LLM;

pub const EXPLAIN_UNAVAILABLE: &str = "An explanation could not be generated right now because the \
language model did not respond. Please try again in a few minutes.";

pub struct ExplainStage;

impl ExplainStage {
    pub async fn run(llm: &LLM, prompts: &PromptStore, request: &PipelineRequest) -> String {
        let user = Self::create_prompt(request);

        match llm.complete(prompts.get(PromptKey::Explain), &user).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("Explain stage returned an empty completion");
                EXPLAIN_UNAVAILABLE.to_string()
            }
            Ok(text) => {
                info!(response_len = text.len(), "Explain stage complete");
                text
            }
            Err(e) => {
                error!(error = %e, "Explain stage failed");
                EXPLAIN_UNAVAILABLE.to_string()
            }
        }
    }

    fn create_prompt(request: &PipelineRequest) -> String {
        format!(
            "Here is the legal context you can use:\n\n{}\n\nUser question:\n{}",
            request.combined_context(),
            request.query
        )
    }
}
