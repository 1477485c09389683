//! Python source literals for JSON values

use serde_json::Value;

const INDENT: &str = "    ";

/// Render `value` as an indented Python literal (`None`, `True`, `False`, dicts, lists).
pub fn python_literal(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

/// A Python `str` literal; JSON string escapes are valid Python escapes
pub fn python_str(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&python_str(s)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                out.push_str(&INDENT.repeat(depth + 1));
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            out.push_str(&INDENT.repeat(depth));
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            for (key, item) in map {
                out.push_str(&INDENT.repeat(depth + 1));
                out.push_str(&python_str(key));
                out.push_str(": ");
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(python_literal(&json!(null)), "None");
        assert_eq!(python_literal(&json!(true)), "True");
        assert_eq!(python_literal(&json!(false)), "False");
        assert_eq!(python_literal(&json!(2.5)), "2.5");
        assert_eq!(python_literal(&json!("say \"hi\"\n")), r#""say \"hi\"\n""#);
    }

    #[test]
    fn test_nested() {
        let value = json!({"required": true, "options": ["a", null], "empty": {}});
        assert_eq!(
            python_literal(&value),
            "{\n    \"empty\": {},\n    \"options\": [\n        \"a\",\n        None,\n    ],\n    \"required\": True,\n}"
        );
    }

    #[test]
    fn test_unicode_is_kept() {
        assert_eq!(python_str("姓名"), "\"姓名\"");
    }
}
