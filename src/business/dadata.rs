//! DaData adapter: the fallback source.
//!
//! DaData only resolves organisations by INN and returns a smaller record,
//! so financials, legal risks, founders and contacts are never filled in.

use serde_json::{json, Map, Value};

use super::fields::first_text;
use super::models::{CompanyProfile, EntityKind, SearchEntity};
use crate::types::{AppError, AppResult};

/// `data` of the first suggestion in a `findById` response
pub fn first_suggestion(inn: &str, payload: &Value) -> AppResult<Value> {
    payload
        .pointer("/suggestions/0/data")
        .cloned()
        .ok_or_else(|| AppError::Upstream(format!("No company found for INN {}", inn)))
}

/// Single search hit synthesized from a suggestion
pub fn search_entity(inn: &str, data: &Value, kind: EntityKind) -> Option<SearchEntity> {
    let title = match kind {
        EntityKind::Ent => first_text(data, &["/name/full_with_opf"]),
        EntityKind::Org => first_text(data, &["/name/short_with_opf", "/name/full_with_opf"]),
    }?;

    Some(SearchEntity {
        title,
        inn: inn.to_string(),
        ogrn: first_text(data, &["/ogrn"]),
        region: Some(
            first_text(data, &["/address/data/region_iso_code"]).unwrap_or_else(|| "Unknown".to_string()),
        ),
    })
}

pub fn company_profile(inn: &str, data: &Value) -> CompanyProfile {
    let mut status = Map::new();
    status.insert(
        "status".to_string(),
        Value::from(first_text(data, &["/state/status"]).unwrap_or_else(|| "Unknown".to_string())),
    );

    CompanyProfile {
        inn: inn.to_string(),
        ogrn: first_text(data, &["/ogrn"]),
        kpp: first_text(data, &["/kpp"]),
        short_name: first_text(data, &["/name/short_with_opf"]).unwrap_or_default(),
        full_name: first_text(data, &["/name/full_with_opf"]).unwrap_or_default(),
        address: first_text(data, &["/address/value"]),
        status,
        ceo: first_text(data, &["/management/name"]).map(|name| vec![json!({ "name": name })]),
        founders: None,
        okved: first_text(data, &["/okved"]),
        financials: None,
        legal_risks: None,
        contacts: None,
    }
}
