//! Intent Classifier
//!
//! Maps free text to one of the fixed workflow modes. Pure and deterministic.

use crate::types::Mode;

const DRAFT_KEYWORDS: &[&str] = &[
    "draft", "write", "redraft", "rewrite", "clause", "contract", "agreement",
    "letter", "email", "template", "add a clause", "modify the clause",
    "edit this clause", "edit this contract",
];

const REFERRAL_KEYWORDS: &[&str] = &[
    "lawyer", "attorney", "law firm", "legal firm", "legal provider",
    "recommend a lawyer", "find a lawyer", "hire a lawyer", "legal help",
    "legal services", "which law firm",
];

/// Classify a query into a mode.
///
/// An explicit `preferred_mode` is returned unchanged. Otherwise draft
/// keywords are checked before referral keywords, and anything unmatched
/// runs the full pipeline.
pub fn classify_intent(query: &str, preferred_mode: Option<Mode>) -> Mode {
    if let Some(mode) = preferred_mode {
        return mode;
    }

    let text = query.to_lowercase();

    if DRAFT_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return Mode::Draft;
    }

    if REFERRAL_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return Mode::Referral;
    }

    Mode::Pipeline
}
