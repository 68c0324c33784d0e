//! Mode Pipeline Runner
//!
//! Runs the explain, referral and draft stages over one shared request and
//! merges their outputs into a single markdown document. Stages never fail
//! the request: each one degrades to its own fallback text.

use std::sync::Arc;

use tracing::info;

use crate::agents::decision::DecisionClient;
use crate::agents::draft::DraftStage;
use crate::agents::explain::ExplainStage;
use crate::agents::prompts::PromptStore;
use crate::agents::referral::ReferralStage;
use crate::llm::LLM;
use crate::models::{AdvisorRequest, ProviderRecord};
use crate::tools::ToolInvoker;
use crate::types::Mode;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Shared input for every stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineRequest {
    pub query: String,
    pub law_context: String,
    pub extra_notes: Option<String>,
    pub providers: Option<Vec<ProviderRecord>>,
}

impl PipelineRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_law_context(mut self, law_context: impl Into<String>) -> Self {
        self.law_context = law_context.into();
        self
    }

    pub fn with_extra_notes(mut self, notes: impl Into<String>) -> Self {
        self.extra_notes = Some(notes.into());
        self
    }

    pub fn with_providers(mut self, providers: Vec<ProviderRecord>) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Law context with any extra notes appended under their own heading
    pub fn combined_context(&self) -> String {
        match self.extra_notes.as_deref() {
            Some(notes) if !notes.is_empty() => {
                format!("{}\n\n[Additional context]\n{}", self.law_context, notes)
            }
            _ => self.law_context.clone(),
        }
    }
}

impl From<AdvisorRequest> for PipelineRequest {
    fn from(req: AdvisorRequest) -> Self {
        let law_context = req
            .law_context
            .filter(|c| !c.trim().is_empty())
            .or(req.relevant_laws)
            .unwrap_or_default();

        Self {
            query: req.query,
            law_context,
            extra_notes: req.extra_notes,
            providers: req.providers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Explain,
    Referral,
    Draft,
}

impl Stage {
    pub fn header(&self) -> &'static str {
        match self {
            Stage::Explain => "## Explanation",
            Stage::Referral => "## Referral",
            Stage::Draft => "## Draft",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeAnswer {
    pub mode_used: Mode,
    pub sections: Vec<(Stage, String)>,
}

impl CompositeAnswer {
    pub fn to_markdown(&self) -> String {
        self.sections
            .iter()
            .map(|(stage, body)| format!("{}\n\n{}", stage.header(), body.trim()))
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }
}

#[derive(Clone)]
pub struct PipelineRunner {
    llm: LLM,
    decisions: DecisionClient,
    prompts: Arc<PromptStore>,
    support: ToolInvoker,
}

impl PipelineRunner {
    pub fn new(llm: LLM, decisions: DecisionClient, prompts: Arc<PromptStore>, support: ToolInvoker) -> Self {
        Self {
            llm,
            decisions,
            prompts,
            support,
        }
    }

    #[cfg(test)]
    pub(crate) fn prompt_store(&self) -> &Arc<PromptStore> {
        &self.prompts
    }

    pub async fn run_stage(&self, stage: Stage, request: &PipelineRequest) -> String {
        match stage {
            Stage::Explain => ExplainStage::run(&self.llm, &self.prompts, request).await,
            Stage::Referral => {
                ReferralStage::run(&self.llm, &self.decisions, &self.prompts, &self.support, request).await
            }
            Stage::Draft => DraftStage::run(&self.llm, &self.decisions, &self.prompts, request).await,
        }
    }

    /// Run `mode` over `request`.
    ///
    /// `Pipeline` runs all three stages concurrently; the document order is
    /// always explanation, referral, draft.
    pub async fn run(&self, mode: Mode, request: &PipelineRequest) -> CompositeAnswer {
        info!(mode = %mode, "Running advisor pipeline");

        let sections = match mode {
            Mode::Pipeline => {
                let (explain, referral, draft) = tokio::join!(
                    self.run_stage(Stage::Explain, request),
                    self.run_stage(Stage::Referral, request),
                    self.run_stage(Stage::Draft, request),
                );
                vec![
                    (Stage::Explain, explain),
                    (Stage::Referral, referral),
                    (Stage::Draft, draft),
                ]
            }
            Mode::Explain => vec![(Stage::Explain, self.run_stage(Stage::Explain, request).await)],
            Mode::Referral => vec![(Stage::Referral, self.run_stage(Stage::Referral, request).await)],
            Mode::Draft => vec![(Stage::Draft, self.run_stage(Stage::Draft, request).await)],
        };

        CompositeAnswer {
            mode_used: mode,
            sections,
        }
    }
}
