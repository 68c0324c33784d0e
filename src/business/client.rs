//! Business Registry Client
//!
//! One HTTP client shared for the process lifetime. Checko is the primary
//! source; DaData is tried only for lookups by a well-formed INN. A missing
//! API key counts as that source failing.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::models::{is_valid_inn, CompanyProfile, EntityKind, EntrepreneurProfile, SearchEntity};
use super::{checko, dadata};
use crate::config::RegistryConfig;
use crate::types::{AppError, AppResult};

pub struct BusinessRegistryClient {
    client: Client,
    checko_base: String,
    dadata_url: String,
    checko_key: Option<String>,
    dadata_key: Option<String>,
}

impl BusinessRegistryClient {
    pub fn new(config: &RegistryConfig) -> AppResult<Self> {
        if config.checko_api_key.is_none() && config.dadata_api_key.is_none() {
            warn!("No registry API keys found, lookups will fail");
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build registry HTTP client: {}", e)))?;

        Ok(Self {
            client,
            checko_base: config.checko_base_url.trim_end_matches('/').to_string(),
            dadata_url: config.dadata_base_url.clone(),
            checko_key: config.checko_api_key.clone(),
            dadata_key: config.dadata_api_key.clone(),
        })
    }

    async fn request_checko(&self, endpoint: &str, params: &[(&str, &str)]) -> AppResult<Value> {
        let key = self
            .checko_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("Checko API key required".to_string()))?;

        let url = format!("{}/{}", self.checko_base, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Checko request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("Checko returned status {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Upstream(format!("Checko returned invalid JSON: {}", e)))
    }

    /// Suggestion data for an organisation by INN
    async fn request_dadata(&self, inn: &str) -> AppResult<Value> {
        let key = self
            .dadata_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("DaData API key required".to_string()))?;

        let response = self
            .client
            .post(&self.dadata_url)
            .header("Authorization", format!("Token {}", key))
            .json(&json!({ "query": inn }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("DaData request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("DaData returned status {}", status)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("DaData returned invalid JSON: {}", e)))?;

        dadata::first_suggestion(inn, &payload)
    }

    /// Search by name, or by INN when Checko is unavailable.
    ///
    /// Never fails: when neither source answers the result is empty.
    pub async fn search_entity(&self, query: &str, kind: EntityKind) -> Vec<SearchEntity> {
        let query = query.trim();

        match self
            .request_checko("search", &[("query", query), ("obj", kind.as_str()), ("by", "name")])
            .await
        {
            Ok(payload) => {
                let results = checko::search_results(&payload, kind);
                info!(count = results.len(), kind = kind.as_str(), "Checko search complete");
                return results;
            }
            Err(e) => warn!(error = %e, "Checko search failed"),
        }

        if !is_valid_inn(query) {
            return Vec::new();
        }

        info!("Trying DaData for search");
        match self.request_dadata(query).await {
            Ok(data) => dadata::search_entity(query, &data, kind).into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "DaData fallback failed");
                Vec::new()
            }
        }
    }

    pub async fn company_full_profile(&self, inn: &str) -> AppResult<CompanyProfile> {
        let inn = inn.trim();

        match self.request_checko("company", &[("inn", inn)]).await {
            Ok(payload) => return Ok(checko::company_profile(inn, &payload)),
            Err(e) => warn!(error = %e, inn = %inn, "Checko company request failed"),
        }

        if !is_valid_inn(inn) {
            return Err(AppError::Upstream("Unable to retrieve company data".to_string()));
        }

        info!(inn = %inn, "Trying DaData for company profile");
        match self.request_dadata(inn).await {
            Ok(data) => Ok(dadata::company_profile(inn, &data)),
            Err(e) => {
                error!(error = %e, inn = %inn, "DaData fallback failed");
                Err(AppError::Upstream("Unable to retrieve company data".to_string()))
            }
        }
    }

    /// Checko only; DaData has no entrepreneur records
    pub async fn entrepreneur_profile(&self, inn: &str) -> AppResult<EntrepreneurProfile> {
        let inn = inn.trim();
        let payload = self.request_checko("entrepreneur", &[("inn", inn)]).await?;
        checko::entrepreneur_profile(inn, &payload)
    }
}
