//! Advisor Agent
//!
//! Second agent in the chain. Validates an agent-to-agent request and runs
//! the full explain / referral / draft pipeline over it.

use tracing::{info, warn};
use validator::Validate;

use crate::agents::pipeline::{PipelineRequest, PipelineRunner};
use crate::models::AdvisorRequest;
use crate::types::{AppError, AppResult, Mode};

pub struct AdvisorAgent {
    runner: PipelineRunner,
}

impl AdvisorAgent {
    pub fn new(runner: PipelineRunner) -> Self {
        Self { runner }
    }

    #[cfg(test)]
    pub(crate) fn prompt_store(&self) -> &std::sync::Arc<crate::agents::prompts::PromptStore> {
        self.runner.prompt_store()
    }

    /// Handle one request and return the mode that ran with its markdown answer.
    ///
    /// The request's `mode` is checked but not honoured: every request runs
    /// the full pipeline.
    pub async fn handle_request(&self, request: AdvisorRequest) -> AppResult<(Mode, String)> {
        if request.validate().is_err() {
            return Err(AppError::InvalidRequest("Missing 'query' in payload".to_string()));
        }

        if let Some(raw) = request.mode.as_deref() {
            let requested: Mode = raw.parse()?;
            if requested != Mode::Pipeline {
                warn!(requested = %requested, "Mode hint ignored, running full pipeline");
            }
        }

        let pipeline_request = PipelineRequest::from(request);
        info!(
            query_len = pipeline_request.query.len(),
            has_law_context = !pipeline_request.law_context.is_empty(),
            "Advisor request accepted"
        );

        let answer = self.runner.run(Mode::Pipeline, &pipeline_request).await;
        Ok((answer.mode_used, answer.to_markdown()))
    }
}
