use serde_json::Value;

use crate::mapping::types::php_string;
use crate::payload::scalar_to_string;
use crate::schema::ColumnDefaultValue;

/// PHP expression for a `->default(...)` argument.
pub fn render_default(default: &ColumnDefaultValue) -> String {
    match &default.value {
        Value::Null => "null".to_string(),
        value if default.is_expression() => {
            format!("DB::raw({})", php_string(&scalar_to_string(value)))
        }
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => render_string_default(s, default.kind.as_deref()),
        other => php_string(&other.to_string()),
    }
}

// Producers that stringify every default still tag booleans and numbers.
fn render_string_default(value: &str, kind: Option<&str>) -> String {
    let trimmed = value.trim();
    match kind {
        Some("boolean") => match trimmed.to_lowercase().as_str() {
            "true" => "true".to_string(),
            "false" => "false".to_string(),
            "null" => "null".to_string(),
            _ => php_string(value),
        },
        Some("number") if trimmed.parse::<f64>().is_ok() => trimmed.to_string(),
        _ => php_string(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: Value, kind: Option<&str>) -> String {
        render_default(&ColumnDefaultValue::new(value, kind))
    }

    #[test]
    fn test_literals() {
        assert_eq!(render(Value::Null, Some("boolean")), "null");
        assert_eq!(render(json!(true), Some("boolean")), "true");
        assert_eq!(render(json!(42), Some("number")), "42");
        assert_eq!(render(json!(1.5), None), "1.5");
        assert_eq!(render(json!("draft"), Some("string")), "'draft'");
    }

    #[test]
    fn test_expressions_are_raw() {
        assert_eq!(render(json!("now()"), Some("expression")), "DB::raw('now()')");
        assert_eq!(render(json!("CURRENT_TIMESTAMP"), Some("RAW")), "DB::raw('CURRENT_TIMESTAMP')");
    }

    #[test]
    fn test_tagged_strings() {
        assert_eq!(render(json!("FALSE"), Some("boolean")), "false");
        assert_eq!(render(json!("null"), Some("boolean")), "null");
        assert_eq!(render(json!("10"), Some("number")), "10");
        assert_eq!(render(json!("ten"), Some("number")), "'ten'");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(render(json!("O'Brien"), Some("string")), r"'O\'Brien'");
    }
}
