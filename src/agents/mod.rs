//! Agent System
//!
//! Two cooperating agents built from shared decision, tool and prompt parts:
//!
//! - **Router Agent**: picks a business-registry lookup, runs it and forwards
//!   the result to the advisor
//! - **Advisor Agent**: runs the explain / referral / draft pipeline and
//!   returns one markdown answer
//!
//! ## Request Flow
//!
//! ```text
//! User Question
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Router    │  → Tool decision, registry lookup, mode decision
//! │   Agent     │
//! └─────────────┘
//!      │  POST /legal-advisor-and-referral
//!      ▼
//! ┌─────────────┐
//! │  Advisor    │  → Explain, Referral, Draft (concurrently)
//! │   Agent     │
//! └─────────────┘
//!      │
//!      ▼
//!  Markdown Answer
//! ```

pub mod advisor;
pub mod decision;
pub mod draft;
pub mod explain;
pub mod intent;
pub mod pipeline;
pub mod prompts;
pub mod referral;
pub mod router;

#[cfg(test)]
pub mod testing;

pub use advisor::AdvisorAgent;
pub use decision::{DecisionClient, ModeDecision, ToolDecision};
pub use intent::classify_intent;
pub use pipeline::{CompositeAnswer, PipelineRequest, PipelineRunner, Stage};
pub use prompts::{PromptKey, PromptStore};
pub use router::{AdvisorClient, RouterAgent};
