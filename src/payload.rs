//! Normalized parser payload.
//!
//! This is the JSON shape exchanged between the DBML grammar parser and the
//! schema builder. Producers other than the bundled normalizer are free to
//! emit it directly, so deserialization is lenient: missing keys default,
//! `null` flags read as `false` and type arguments may arrive as a list or
//! as a comma-separated string.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedPayload {
    pub tables: Vec<TableRecord>,
    pub enums: Vec<EnumRecord>,
    pub refs: Vec<RefRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRecord {
    pub name: String,
    pub schema: Option<String>,
    pub note: Option<String>,
    pub columns: Vec<ColumnRecord>,
    pub indexes: Vec<IndexRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: TypeRecord,
    #[serde(deserialize_with = "flag")]
    pub primary_key: bool,
    #[serde(deserialize_with = "flag")]
    pub unique: bool,
    #[serde(deserialize_with = "flag")]
    pub not_null: bool,
    #[serde(deserialize_with = "flag")]
    pub auto_increment: bool,
    pub note: Option<String>,
    pub default_value: Option<DefaultRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeRecord {
    pub name: String,
    pub schema_name: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

/// A column default as `{value, type}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultRecord {
    pub value: Value,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexRecord {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub unique: bool,
    pub columns: Vec<IndexColumn>,
}

/// Index columns show up either as bare names or as `{name}` / `{value}`
/// objects depending on the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexColumn {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        value: Option<String>,
    },
}

impl IndexColumn {
    /// The column name, empty when the entry carries none.
    pub fn column_name(&self) -> &str {
        match self {
            IndexColumn::Name(name) => name,
            IndexColumn::Object { name, value } => {
                name.as_deref().or(value.as_deref()).unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumRecord {
    pub name: String,
    pub schema: Option<String>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefRecord {
    pub name: Option<String>,
    pub schema: Option<String>,
    pub color: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
    pub endpoints: Vec<EndpointRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointRecord {
    pub schema: Option<String>,
    pub table: String,
    #[serde(deserialize_with = "string_list")]
    pub columns: Vec<String>,
    pub relation: Option<String>,
}

/// Render a JSON scalar the way a loosely typed producer would print it.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten a list-ish JSON value into trimmed strings.
pub fn string_list_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        other => vec![other.to_string()],
    }
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_list_from_value(&value))
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}
