//! Canonical business-registry records.
//!
//! Both registry sources are mapped into these shapes; nested sections a
//! source cannot provide stay `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Revenue by year
    pub revenue: Option<Map<String, Value>>,
    /// Net profit by year
    pub profit: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegalRisks {
    pub arbitration_cases: Option<i64>,
    pub arbitration_amount: Option<f64>,
    pub blocked_accounts: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub inn: String,
    pub ogrn: Option<String>,
    pub kpp: Option<String>,
    pub short_name: String,
    pub full_name: String,
    pub address: Option<String>,
    pub status: Map<String, Value>,
    pub ceo: Option<Vec<Value>>,
    pub founders: Option<Vec<Value>>,
    pub okved: Option<String>,
    pub financials: Option<CompanyFinancials>,
    pub legal_risks: Option<LegalRisks>,
    pub contacts: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntrepreneurProfile {
    pub inn: String,
    pub ogrnip: Option<String>,
    pub full_name: String,
    pub status: Map<String, Value>,
    pub okved: Option<Vec<String>>,
}

/// Short search hit for a company or an entrepreneur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEntity {
    pub title: String,
    pub inn: String,
    pub ogrn: Option<String>,
    pub region: Option<String>,
}

/// Kind of registry object a search targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Organisation (legal entity)
    Org,
    /// Individual entrepreneur
    Ent,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Org => "org",
            EntityKind::Ent => "ent",
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "org" => Ok(EntityKind::Org),
            "ent" => Ok(EntityKind::Ent),
            other => Err(AppError::InvalidRequest(format!(
                "'obj' must be \"org\" or \"ent\", got '{}'",
                other
            ))),
        }
    }
}

/// A taxpayer number is 10 digits for organisations and 12 for entrepreneurs
pub fn is_valid_inn(value: &str) -> bool {
    matches!(value.len(), 10 | 12) && value.bytes().all(|b| b.is_ascii_digit())
}
