//! Checko adapter: maps Checko API payloads into the canonical records.
//!
//! Checko answers with Cyrillic keys; some deployments also return English
//! aliases. The English key is always tried first.

use serde_json::{Map, Value};

use super::fields::{as_text, first, first_list, first_object, first_text, is_present};
use super::models::{
    CompanyFinancials, CompanyProfile, EntityKind, EntrepreneurProfile, LegalRisks, SearchEntity,
};
use crate::types::{AppError, AppResult};

const UNKNOWN: &str = "Unknown";

/// The record body; Checko wraps it in `data`, but bare payloads are accepted
fn body(payload: &Value) -> &Value {
    payload.get("data").unwrap_or(payload)
}

/// Map one search record, or `None` when it lacks a title or an INN
pub fn search_entity(record: &Value, kind: EntityKind) -> Option<SearchEntity> {
    let (title, ogrn) = match kind {
        EntityKind::Ent => (
            first_text(record, &["/ФИО", "/НаимПолн"]),
            first_text(record, &["/ОГРНИП", "/ОГРН"]),
        ),
        EntityKind::Org => (
            first_text(record, &["/НаимСокр", "/НаимПолн"]),
            first_text(record, &["/ОГРН"]),
        ),
    };

    Some(SearchEntity {
        title: title?,
        inn: first_text(record, &["/ИНН"])?,
        ogrn,
        region: first_text(record, &["/РегионКод"]),
    })
}

/// All usable hits from a `/search` response
pub fn search_results(payload: &Value, kind: EntityKind) -> Vec<SearchEntity> {
    payload
        .pointer("/data/Записи")
        .and_then(Value::as_array)
        .map(|records| records.iter().filter_map(|r| search_entity(r, kind)).collect())
        .unwrap_or_default()
}

fn financials(d: &Value) -> Option<CompanyFinancials> {
    let fin = d.get("ФинПоказ").filter(|v| is_present(v))?;
    Some(CompanyFinancials {
        revenue: first_object(fin, &["/Выручка"]),
        profit: first_object(fin, &["/Прибыль"]),
    })
}

fn legal_risks(d: &Value) -> Option<LegalRisks> {
    let arbitration = d.get("Арбитраж").filter(|v| is_present(v));
    let blocked = d.get("Блокировка").filter(|v| is_present(v));
    if arbitration.is_none() && blocked.is_none() {
        return None;
    }

    Some(LegalRisks {
        arbitration_cases: arbitration.and_then(|a| a.get("Количество")).and_then(Value::as_i64),
        arbitration_amount: arbitration.and_then(|a| a.get("Суммы")).and_then(Value::as_f64),
        blocked_accounts: d.get("Блокировка").and_then(Value::as_bool),
    })
}

/// Main activity code; an object carries it under `Код`
fn company_okved(d: &Value) -> Option<String> {
    if let Some(code) = first_text(d, &["/okved"]) {
        return Some(code);
    }
    match d.get("ОКВЭД") {
        Some(Value::Object(okved)) => okved.get("Код").and_then(as_text),
        Some(other) if is_present(other) => as_text(other),
        _ => Some(UNKNOWN.to_string()),
    }
}

pub fn company_profile(inn: &str, payload: &Value) -> CompanyProfile {
    let d = body(payload);

    CompanyProfile {
        inn: inn.to_string(),
        ogrn: first_text(d, &["/ogrn", "/ОГРН"]),
        kpp: first_text(d, &["/kpp", "/КПП"]),
        short_name: first_text(d, &["/short_name", "/Наим/Сокр"]).unwrap_or_else(|| UNKNOWN.to_string()),
        full_name: first_text(d, &["/full_name", "/Наим/Полн"]).unwrap_or_else(|| UNKNOWN.to_string()),
        address: first_text(d, &["/address", "/ЮрАдрес/АдресРФ"]),
        status: first_object(d, &["/status", "/Статус"]).unwrap_or_default(),
        ceo: first_list(d, &["/ceo", "/Руковод"]),
        founders: first(d, &["/founders", "/Учред"])
            .and_then(Value::as_array)
            .cloned(),
        okved: company_okved(d),
        financials: financials(d),
        legal_risks: legal_risks(d),
        contacts: first_object(d, &["/contacts", "/Контакты"]),
    }
}

/// Entrepreneur record; the name and the status are required
pub fn entrepreneur_profile(inn: &str, payload: &Value) -> AppResult<EntrepreneurProfile> {
    let d = body(payload);

    let full_name = first_text(d, &["/full_name", "/ФИО"])
        .ok_or_else(|| AppError::Upstream("Invalid entrepreneur data: missing name".to_string()))?;
    let status: Map<String, Value> = first_object(d, &["/status", "/Статус"])
        .ok_or_else(|| AppError::Upstream("Invalid entrepreneur data: missing status".to_string()))?;

    let okved = first(d, &["/okved", "/ВидДеят"]).map(|v| match v {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        other => as_text(other).into_iter().collect(),
    });

    Ok(EntrepreneurProfile {
        inn: inn.to_string(),
        ogrnip: first_text(d, &["/ogrnip", "/ОГРНИП"]),
        full_name,
        status,
        okved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_org_search_record() {
        let payload = json!({
            "data": {"Записи": [
                {"НаимСокр": "ООО РОМАШКА", "ИНН": "7700000000", "ОГРН": "123", "РегионКод": "77"},
                {"НаимПолн": "ООО БЕЗ ИНН"},
                {"НаимСокр": "", "НаимПолн": "ООО ПОЛНОЕ", "ИНН": "7700000001"}
            ]}
        });

        let results = search_results(&payload, EntityKind::Org);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "ООО РОМАШКА");
        assert_eq!(results[0].region.as_deref(), Some("77"));
        assert_eq!(results[1].title, "ООО ПОЛНОЕ");
    }

    #[test]
    fn test_entrepreneur_search_precedence() {
        let record = json!({"ФИО": "ИВАНОВ ИВАН", "НаимПолн": "ИП ИВАНОВ", "ИНН": "123456789012", "ОГРН": "1", "ОГРНИП": "320000"});
        let entity = search_entity(&record, EntityKind::Ent).unwrap();
        assert_eq!(entity.title, "ИВАНОВ ИВАН");
        assert_eq!(entity.ogrn.as_deref(), Some("320000"));
    }

    #[test]
    fn test_company_profile_from_cyrillic_keys() {
        let payload = json!({
            "data": {
                "ИНН": "7700000000", "ОГРН": "123",
                "Наим": {"Сокр": "ООО ТЕСТ", "Полн": "ООО ТЕСТ ПОЛНОЕ"},
                "Статус": {"Наим": "Действует"},
                "ЮрАдрес": {"АдресРФ": "Адрес"},
                "Руковод": [{"ФИО": "Иванов И.И."}],
                "ОКВЭД": {"Код": "62.01", "Наим": "Разработка ПО"},
                "ФинПоказ": {"Выручка": {"2022": 100}},
                "Арбитраж": {"Количество": 0}, "Блокировка": false
            }
        });

        let profile = company_profile("7700000000", &payload);
        assert_eq!(profile.inn, "7700000000");
        assert_eq!(profile.ogrn.as_deref(), Some("123"));
        assert_eq!(profile.short_name, "ООО ТЕСТ");
        assert_eq!(profile.full_name, "ООО ТЕСТ ПОЛНОЕ");
        assert_eq!(profile.address.as_deref(), Some("Адрес"));
        assert_eq!(profile.status.get("Наим"), Some(&json!("Действует")));
        assert_eq!(profile.ceo.as_ref().map(Vec::len), Some(1));
        assert_eq!(profile.okved.as_deref(), Some("62.01"));

        let financials = profile.financials.unwrap();
        assert_eq!(financials.revenue.unwrap().get("2022"), Some(&json!(100)));
        assert!(financials.profit.is_none());

        let risks = profile.legal_risks.unwrap();
        assert_eq!(risks.arbitration_cases, Some(0));
        assert_eq!(risks.blocked_accounts, Some(false));
    }

    #[test]
    fn test_company_profile_defaults() {
        let profile = company_profile("7700000000", &json!({"data": {}}));
        assert_eq!(profile.short_name, "Unknown");
        assert_eq!(profile.okved.as_deref(), Some("Unknown"));
        assert!(profile.status.is_empty());
        assert!(profile.financials.is_none());
        assert!(profile.legal_risks.is_none());
    }

    #[test]
    fn test_english_aliases_win() {
        let payload = json!({"short_name": "Alias LLC", "Наим": {"Сокр": "ООО АЛИАС"}, "okved": "47.11"});
        let profile = company_profile("7700000000", &payload);
        assert_eq!(profile.short_name, "Alias LLC");
        assert_eq!(profile.okved.as_deref(), Some("47.11"));
    }

    #[test]
    fn test_entrepreneur_profile() {
        let payload = json!({
            "data": {
                "ФИО": "ИВАНОВ ИВАН",
                "ИНН": "123456789012",
                "ОГРНИП": "320000",
                "Статус": {"Наим": "Действующий"},
                "ВидДеят": ["62.01"]
            }
        });

        let profile = entrepreneur_profile("123456789012", &payload).unwrap();
        assert_eq!(profile.full_name, "ИВАНОВ ИВАН");
        assert_eq!(profile.ogrnip.as_deref(), Some("320000"));
        assert_eq!(profile.okved, Some(vec!["62.01".to_string()]));

        assert!(entrepreneur_profile("123456789012", &json!({"data": {"ФИО": "X"}})).is_err());
    }
}
