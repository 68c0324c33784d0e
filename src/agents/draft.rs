//! Draft stage.
//!
//! A short label decision (`DRAFT` / `NO_DRAFT`) gates the generation call.
//! Without a clear `DRAFT` the stage returns a fixed explanation and makes no
//! second call.

use tracing::{error, info, warn};

use crate::agents::decision::DecisionClient;
use crate::agents::pipeline::PipelineRequest;
use crate::agents::prompts::{PromptKey, PromptStore};
use crate::llm::LLM;

pub const DRAFT_LABEL: &str = "DRAFT";
pub const NO_DRAFT_LABEL: &str = "NO_DRAFT";
const DECISION_MAX_TOKENS: u32 = 8;

pub const NO_DRAFT_TEXT: &str = "At this stage, a concrete draft document (email, letter, clause, or form) \
does not appear strictly necessary based on your situation and the legal context provided.\n\n\
- You can rely on the explanation and referral above as next steps.\n\
- If you explicitly want a template email or document, you can ask for it in a follow-up \
(for example: \"Draft an email to my employer explaining X\").";

pub const DRAFT_UNAVAILABLE: &str = "A draft could not be generated right now because the \
language model did not respond. Please ask again for the document you need.";

pub struct DraftStage;

impl DraftStage {
    pub async fn run(
        llm: &LLM,
        decisions: &DecisionClient,
        prompts: &PromptStore,
        request: &PipelineRequest,
    ) -> String {
        if !Self::should_draft(decisions, prompts, request).await {
            info!("Draft stage: no draft needed");
            return NO_DRAFT_TEXT.to_string();
        }

        let user = format!(
            "User request:\n{}\n\nRelevant legal / internal context (if any):\n\n{}\n\n\
             If there are specific constraints or preferences, follow them.",
            request.query,
            request.combined_context()
        );

        match llm.complete(prompts.get(PromptKey::Draft), &user).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("Draft generation returned an empty completion");
                DRAFT_UNAVAILABLE.to_string()
            }
            Ok(text) => {
                info!(response_len = text.len(), "Draft stage complete");
                text
            }
            Err(e) => {
                error!(error = %e, "Draft generation failed");
                DRAFT_UNAVAILABLE.to_string()
            }
        }
    }

    async fn should_draft(decisions: &DecisionClient, prompts: &PromptStore, request: &PipelineRequest) -> bool {
        let user = format!(
            "User request:\n{}\n\nLegal / contextual information (may be empty):\n{}\n\n\
             Extra notes (may be empty):\n{}\n\n\
             Remember: reply with exactly 'DRAFT' or 'NO_DRAFT'.",
            request.query,
            request.law_context,
            request.extra_notes.as_deref().unwrap_or_default()
        );

        let label = decisions
            .decide_label(
                prompts.get(PromptKey::DraftDecider),
                &user,
                &[DRAFT_LABEL, NO_DRAFT_LABEL],
                DECISION_MAX_TOKENS,
            )
            .await;

        label.as_deref() == Some(DRAFT_LABEL)
    }
}
