use serde_json::{Map, Value};
use std::io;

/// Result fields holding the row-oriented part of each output, in lookup order.
const ROW_KEYS: [&str; 5] = ["rows", "points", "results", "annual_summary", "years"];

/// Write output as CSV to stdout.
///
/// Outputs with a row-oriented section (a schedule, sweep or scenario
/// list) are written one row per record; everything else falls back to
/// two columns of field and value.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            if let Some(rows) = find_rows(body) {
                write_array_csv(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in body {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// First non-empty row section, looking one level into nested objects
/// such as `cash_flows`.
fn find_rows(map: &Map<String, Value>) -> Option<&[Value]> {
    for key in ROW_KEYS {
        if let Some(Value::Array(arr)) = map.get(key) {
            if !arr.is_empty() {
                return Some(arr);
            }
        }
    }
    map.values().find_map(|v| match v {
        Value::Object(inner) => ROW_KEYS.iter().find_map(|k| match inner.get(*k) {
            Some(Value::Array(arr)) if !arr.is_empty() => Some(arr.as_slice()),
            _ => None,
        }),
        _ => None,
    })
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
