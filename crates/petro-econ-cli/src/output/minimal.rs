use serde_json::Value;

/// Objects searched, in order, for a headline figure.
const NESTED_SECTIONS: [&str; 3] = ["metrics", "kpi_deltas", "stats"];

/// Headline fields in order of priority.
const PRIORITY_KEYS: [&str; 5] = ["npv", "base_npv", "irr", "rate", "base_case_value"];

/// Print just the headline value from the output.
///
/// Looks in the result object first, then in its metrics / delta / stats
/// sections. Falls back to the first field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(val) = headline(result_obj) {
        println!("{}", format_minimal(val));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn headline(result: &Value) -> Option<&Value> {
    let map = result.as_object()?;
    let sections = std::iter::once(map).chain(
        NESTED_SECTIONS
            .iter()
            .filter_map(|s| map.get(*s).and_then(Value::as_object)),
    );
    for section in sections {
        for key in &PRIORITY_KEYS {
            if let Some(val) = section.get(*key) {
                if !val.is_null() {
                    return Some(val);
                }
            }
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
    fn test_headline_prefers_metrics_npv() {
        let out = json!({
            "result": { "annual_results": [], "metrics": { "irr": "0.1", "npv": "42" } }
        });
        let result = out.get("result").unwrap();
        assert_eq!(headline(result), Some(&json!("42")));
    }

    #[test]
    fn test_headline_skips_null_values() {
        let result = json!({ "stats": { "rate": null }, "kpi_deltas": { "npv": null, "irr": "0.02" } });
        assert_eq!(headline(&result), Some(&json!("0.02")));
    }
}
