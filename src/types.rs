// Type definitions and enums

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Downstream processing mode of the advisor agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Run every stage (explain, referral, draft)
    Pipeline,
    Explain,
    Draft,
    Referral,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Pipeline, Mode::Explain, Mode::Draft, Mode::Referral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Pipeline => "pipeline",
            Mode::Explain => "explain",
            Mode::Draft => "draft",
            Mode::Referral => "referral",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        Mode::ALL.into_iter().find(|m| m.as_str() == key)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::from_name(s).ok_or_else(|| {
            AppError::UnknownMode(format!(
                "Unknown mode '{}'. Valid modes: {}",
                s,
                Mode::ALL.map(|m| m.as_str()).join(", ")
            ))
        })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    /// Ask the provider for a JSON-object response
    #[serde(default)]
    pub json_output: bool,
}

impl LLMRequest {
    /// The system instruction of this request, if one was given
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
    }

    /// The last user message of this request
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("LLM quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    UnknownMode(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Whether this error was caused by the shape of the caller's request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidRequest(_) | AppError::UnknownTool(_) | AppError::UnknownMode(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = if self.is_client_error() {
            (StatusCode::BAD_REQUEST, self.to_string())
        } else {
            match &self {
                AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal error: {}", self),
                ),
            }
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
