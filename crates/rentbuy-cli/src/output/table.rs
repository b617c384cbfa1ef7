use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go into a Field/Value table; every array of
/// objects (schedule rows, sweep points, scenario results, yearly flows)
/// gets a table of its own underneath.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object(None, map);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Value::Object(res_map) = result {
        print_object(None, res_map);
    } else {
        print_object(None, envelope);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(title: Option<&str>, map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut scalars = 0;
    let mut nested: Vec<(&str, &Value)> = Vec::new();

    for (key, val) in map {
        if is_tabular(val) {
            nested.push((key.as_str(), val));
        } else {
            builder.push_record([key.as_str(), &format_value(val)]);
            scalars += 1;
        }
    }

    if scalars > 0 {
        if let Some(t) = title {
            println!("\n{}:", t);
        }
        println!("{}", Table::from(builder));
    }

    for (key, val) in nested {
        match val {
            Value::Array(arr) if !arr.is_empty() => {
                println!("\n{}:", key);
                print_array_table(arr);
            }
            Value::Object(inner) => print_object(Some(key), inner),
            _ => {}
        }
    }
}

/// Arrays of objects and objects that themselves hold such arrays.
fn is_tabular(value: &Value) -> bool {
    match value {
        Value::Array(arr) => matches!(arr.first(), Some(Value::Object(_))),
        Value::Object(map) => map.values().any(is_tabular),
        _ => false,
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
