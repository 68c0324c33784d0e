//! Ordered field lookup over loosely shaped provider JSON.
//!
//! Keys are JSON pointers tried in order. A value only counts when it is
//! present and non-empty: `null`, `false`, `0`, `""`, `[]` and `{}` all fall
//! through to the next key.

use serde_json::{Map, Value};

pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// First present value among `pointers`
pub fn first<'a>(data: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| data.pointer(p))
        .find(|v| is_present(v))
}

/// Scalar rendered as text; numbers are kept as their decimal form
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn first_text(data: &Value, pointers: &[&str]) -> Option<String> {
    first(data, pointers).and_then(as_text)
}

pub fn first_object(data: &Value, pointers: &[&str]) -> Option<Map<String, Value>> {
    first(data, pointers).and_then(|v| v.as_object().cloned())
}

/// First present value as a list; a single object becomes a one-item list
pub fn first_list(data: &Value, pointers: &[&str]) -> Option<Vec<Value>> {
    match first(data, pointers)? {
        Value::Array(items) => Some(items.clone()),
        obj @ Value::Object(_) => Some(vec![obj.clone()]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_values_fall_through() {
        let data = json!({"short_name": "", "Наим": {"Сокр": "ООО ТЕСТ"}});
        assert_eq!(
            first_text(&data, &["/short_name", "/Наим/Сокр"]),
            Some("ООО ТЕСТ".to_string())
        );
    }

    #[test]
    fn test_first_key_wins() {
        let data = json!({"ogrn": "1027700132195", "ОГРН": "999"});
        assert_eq!(first_text(&data, &["/ogrn", "/ОГРН"]).as_deref(), Some("1027700132195"));
    }

    #[test]
    fn test_numbers_render_as_text() {
        let data = json!({"РегионКод": 77});
        assert_eq!(first_text(&data, &["/РегионКод"]).as_deref(), Some("77"));
    }

    #[test]
    fn test_presence() {
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!(false)));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!({})));
        assert!(is_present(&json!({"Количество": 0})));
        assert!(is_present(&json!(true)));
    }

    #[test]
    fn test_first_list_wraps_object() {
        let data = json!({"Руковод": {"ФИО": "Иванов И.И."}});
        assert_eq!(first_list(&data, &["/ceo", "/Руковод"]).unwrap().len(), 1);
        assert!(first_list(&json!({"ceo": "n/a"}), &["/ceo"]).is_none());
    }
}
