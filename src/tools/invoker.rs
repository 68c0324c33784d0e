//! Tool Invoker
//!
//! Executes registered capabilities over HTTP. Each call runs as its own
//! tokio task behind a semaphore, so a slow tool never holds up the request
//! handler and the number of in-flight tool calls stays bounded.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::registry::Capability;
use crate::types::{AppError, AppResult};

/// Result of one tool call. A failure is data, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { tool: String, body: String },
    Failed { tool: String, reason: String },
}

impl ToolOutcome {
    pub fn tool(&self) -> &str {
        match self {
            ToolOutcome::Success { tool, .. } | ToolOutcome::Failed { tool, .. } => tool,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success { .. })
    }

    /// The response body, when the call produced a usable result
    pub fn body(&self) -> Option<&str> {
        match self {
            ToolOutcome::Success { body, .. } => Some(body),
            ToolOutcome::Failed { .. } => None,
        }
    }

    /// Human-readable summary suitable for returning to a caller
    pub fn summary(&self) -> String {
        match self {
            ToolOutcome::Success { body, .. } => body.clone(),
            ToolOutcome::Failed { tool, .. } => format!("MCP call failed for tool {}", tool),
        }
    }
}

#[derive(Clone)]
pub struct ToolInvoker {
    client: Client,
    base_url: String,
    workers: Arc<Semaphore>,
}

impl ToolInvoker {
    pub fn new(base_url: &str, timeout: Duration, max_concurrency: usize) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build tool HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            workers: Arc::new(Semaphore::new(max_concurrency.max(1))),
        })
    }

    /// Resolve `name` in the `C` registry and invoke it.
    ///
    /// Unknown names are rejected before any request is made.
    pub async fn invoke_named<C: Capability>(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> AppResult<ToolOutcome> {
        let capability = C::from_name(name).ok_or_else(|| {
            AppError::UnknownTool(format!("'{}' (known: {})", name, C::names().join(", ")))
        })?;
        Ok(self.invoke(capability, arguments).await)
    }

    pub async fn invoke<C: Capability>(&self, capability: C, arguments: &Map<String, Value>) -> ToolOutcome {
        let tool = capability.name().to_string();

        if let Some(missing) = capability
            .required_args()
            .iter()
            .find(|arg| !arguments.contains_key(**arg))
        {
            warn!(tool = %tool, argument = %missing, "Tool call rejected: missing argument");
            return ToolOutcome::Failed {
                tool,
                reason: format!("missing required argument '{}'", missing),
            };
        }

        let url = format!("{}/{}", self.base_url, capability.path());
        let body = Value::Object(arguments.clone());
        let client = self.client.clone();
        let workers = self.workers.clone();

        info!(tool = %tool, url = %url, "Invoking tool");

        let task = tokio::spawn(async move {
            let _permit = workers
                .acquire_owned()
                .await
                .map_err(|e| format!("worker pool closed: {}", e))?;

            let response = client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| format!("request to {} failed: {}", url, e))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| format!("failed to read response from {}: {}", url, e))?;

            if !capability.accepts_status(status) {
                return Err(format!("{} returned status {}: {}", url, status, text));
            }
            Ok(text)
        });

        match task.await {
            Ok(Ok(body)) => {
                info!(tool = %tool, body_len = body.len(), "Tool call succeeded");
                ToolOutcome::Success { tool, body }
            }
            Ok(Err(reason)) => {
                warn!(tool = %tool, reason = %reason, "Tool call failed");
                ToolOutcome::Failed { tool, reason }
            }
            Err(e) => {
                warn!(tool = %tool, error = %e, "Tool task aborted");
                ToolOutcome::Failed {
                    tool,
                    reason: format!("tool task aborted: {}", e),
                }
            }
        }
    }
}
