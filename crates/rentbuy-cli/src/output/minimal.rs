use serde_json::Value;

/// Headline fields, most specific first.
const PRIORITY_KEYS: [&str; 6] = [
    "tax_saving",
    "break_even_horizon",
    "break_even_house_growth_pct",
    "buy_favoured",
    "difference",
    "emi",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in priority order, then falls back
/// to the first scalar field of the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                return match val {
                    Value::Null => format!("{}: none", key),
                    _ => format_minimal(val),
                };
            }
        }

        if let Some((key, val)) = map
            .iter()
            .find(|(_, v)| !v.is_array() && !v.is_object())
        {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_minimal).collect::<Vec<_>>().join(","),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_npv_prints_difference() {
        let v = json!({"result": {"npv_buy": "10", "npv_rent": "4", "difference": "6"}});
        assert_eq!(minimal_line(&v), "6");
    }

    #[test]
    fn test_missing_break_even() {
        let v = json!({"result": {"points": [], "break_even_horizon": null}});
        assert_eq!(minimal_line(&v), "break_even_horizon: none");
    }

    #[test]
    fn test_scenarios_list_favoured() {
        let v = json!({"result": {"results": [], "buy_favoured": ["Base", "Boom"], "emi": "1"}});
        assert_eq!(minimal_line(&v), "Base,Boom");
    }

    #[test]
    fn test_fallback_first_scalar() {
        let v = json!({"result": {"rows": [], "loan_amount": "5000000"}});
        assert_eq!(minimal_line(&v), "loan_amount: 5000000");
    }
}
