use serde_json::Value;

/// Headline fields, most specific first.
const PRIORITY_KEYS: [&str; 14] = [
    "net_pay",
    "total_monthly_cost",
    "interest_saved_by_constant_principal",
    "total_paid",
    "final_balance",
    "total_amount",
    "npv",
    "irr_pct",
    "rate_pct",
    "selling_price",
    "break_even_revenue",
    "ebitda",
    "contribution",
    "income_tax",
];

/// Print just the key answer value from the output.
///
/// Looks for a headline field in the result (one level of nesting included),
/// then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(val) = find_priority(map) {
            println!("{}", format_minimal(val));
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn find_priority(map: &serde_json::Map<String, Value>) -> Option<&Value> {
    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
            return Some(val);
        }
        let nested = map
            .values()
            .filter_map(Value::as_object)
            .find_map(|inner| inner.get(key).filter(|v| !v.is_null()));
        if nested.is_some() {
            return nested;
        }
    }
    None
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefers_headline_field() {
        let map = json!({"gross_salary": "8000.00", "net_pay": "6766.72"});
        let found = find_priority(map.as_object().unwrap()).unwrap();
        assert_eq!(found, &json!("6766.72"));
    }

    #[test]
    fn test_finds_nested_headline() {
        let map = json!({"markup": {"selling_price": "166.67"}, "break_even_revenue": null});
        let found = find_priority(map.as_object().unwrap()).unwrap();
        assert_eq!(found, &json!("166.67"));
    }

    #[test]
    fn test_no_headline() {
        let map = json!({"foo": "1"});
        assert!(find_priority(map.as_object().unwrap()).is_none());
    }
}
