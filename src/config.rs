use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub tools: ToolsConfig,
    pub forwarding: ForwardingConfig,
    pub registry: RegistryConfig,
    pub prompts: PromptsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub provider: String,
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions` suffix
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub decision_temperature: f32,
    pub decision_max_tokens: u32,
    pub timeout_secs: u64,
}

impl LLMConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    /// Registry lookup tools used by the router agent
    pub mcp_base_url: String,
    /// Provider-search tools used by the referral stage
    pub support_base_url: String,
    pub timeout_secs: u64,
    pub max_concurrency: usize,
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForwardingConfig {
    /// Advisor agent base URL; forwarding is disabled when unset
    pub agent2_url: Option<String>,
    pub timeout_secs: u64,
}

impl ForwardingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub checko_api_key: Option<String>,
    pub dadata_api_key: Option<String>,
    pub checko_base_url: String,
    pub dadata_base_url: String,
    pub timeout_secs: u64,
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Overrides the default `EnvFilter` directive when `RUST_LOG` is unset
    pub level: Option<String>,
    /// Directory for daily rolling log files; stdout only when unset
    pub dir: Option<PathBuf>,
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            llm: LLMConfig {
                provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
                api_key: env::var("API_KEY").unwrap_or_default(),
                base_url: env::var("BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("LLM_MODEL")
                    .unwrap_or_else(|_| "ai-sage/GigaChat3-10B-A1.8B".to_string()),
                temperature: env::var("LLM_TEMPERATURE")
                    .unwrap_or_else(|_| "0.2".to_string())
                    .parse()?,
                max_tokens: env::var("LLM_MAX_TOKENS")
                    .unwrap_or_else(|_| "2000".to_string())
                    .parse()?,
                decision_temperature: env::var("DECISION_TEMPERATURE")
                    .unwrap_or_else(|_| "0.7".to_string())
                    .parse()?,
                decision_max_tokens: env::var("DECISION_MAX_TOKENS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()?,
                timeout_secs: env::var("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()?,
            },
            tools: ToolsConfig {
                mcp_base_url: env::var("MCP_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
                support_base_url: env::var("SUPPORT_MCP_BASE_URL")
                    .unwrap_or_else(|_| "http://support-mcp:8000".to_string()),
                timeout_secs: env::var("TOOL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                max_concurrency: env::var("TOOL_MAX_CONCURRENCY")
                    .unwrap_or_else(|_| "16".to_string())
                    .parse()?,
            },
            forwarding: ForwardingConfig {
                agent2_url: non_empty("AGENT2_URL"),
                timeout_secs: env::var("AGENT2_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
            registry: RegistryConfig {
                checko_api_key: non_empty("CHECKO_API_KEY"),
                dadata_api_key: non_empty("DADATA_API_KEY"),
                checko_base_url: env::var("CHECKO_BASE_URL")
                    .unwrap_or_else(|_| "https://api.checko.ru/v2".to_string()),
                dadata_base_url: env::var("DADATA_BASE_URL").unwrap_or_else(|_| {
                    "https://suggestions.dadata.ru/suggestions/api/4_1/rs/findById/party".to_string()
                }),
                timeout_secs: env::var("REGISTRY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
            prompts: PromptsConfig {
                dir: PathBuf::from(env::var("PROMPTS_DIR").unwrap_or_else(|_| "prompts".to_string())),
            },
            logging: LoggingConfig {
                level: non_empty("LOG_LEVEL"),
                dir: non_empty("LOG_DIR").map(PathBuf::from),
            },
        })
    }
}
