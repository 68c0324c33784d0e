//! Business registry lookups (companies and individual entrepreneurs).
//!
//! `checko` and `dadata` map each provider's payload into the records in
//! `models`; `client` owns the HTTP calls and the fallback rules.

pub mod checko;
pub mod client;
pub mod dadata;
pub mod fields;
pub mod models;

pub use client::BusinessRegistryClient;
pub use models::{
    is_valid_inn, CompanyFinancials, CompanyProfile, EntityKind, EntrepreneurProfile, LegalRisks,
    SearchEntity,
};
