//! Flattens the `@dbml/core` database export into a [`NormalizedPayload`].
//!
//! The export is duck-typed JSON (`schemas[].tables[].fields[]`, `refs`,
//! `enums`), so it is walked as a [`serde_json::Value`] and only the keys the
//! builder needs are read.

use serde_json::{Map, Value};

use crate::payload::{
    ColumnRecord, DefaultRecord, EndpointRecord, EnumRecord, IndexColumn, IndexRecord,
    NormalizedPayload, RefRecord, TableRecord, TypeRecord, scalar_to_string,
    string_list_from_value,
};

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("parser output is not a JSON object")]
    NotAnObject,
    #[error("parser output has no `schemas` list")]
    MissingSchemas,
}

/// Normalize a raw database export.
pub fn normalize(database: &Value) -> Result<NormalizedPayload, NormalizeError> {
    let root = database.as_object().ok_or(NormalizeError::NotAnObject)?;
    let schemas = root
        .get("schemas")
        .and_then(Value::as_array)
        .ok_or(NormalizeError::MissingSchemas)?;

    let mut payload = NormalizedPayload::default();

    for schema in schemas {
        let schema_name = str_field(schema, "name");

        for table in list(schema, "tables") {
            payload.tables.push(normalize_table(table, schema_name.clone()));
        }

        for enum_node in list(schema, "enums") {
            payload.enums.push(EnumRecord {
                name: str_field(enum_node, "name").unwrap_or_default(),
                schema: schema_name.clone(),
                values: list(enum_node, "values")
                    .iter()
                    .map(|v| match v {
                        Value::Object(obj) => obj
                            .get("name")
                            .or_else(|| obj.get("value"))
                            .cloned()
                            .unwrap_or(Value::Null),
                        other => other.clone(),
                    })
                    .filter(|v| !v.is_null())
                    .collect(),
            });
        }

        for ref_node in list(schema, "refs") {
            payload.refs.push(normalize_ref(ref_node, schema_name.as_deref()));
        }
    }

    Ok(payload)
}

fn normalize_table(table: &Value, schema_name: Option<String>) -> TableRecord {
    TableRecord {
        name: str_field(table, "name").unwrap_or_default(),
        schema: schema_name,
        note: note_field(table),
        columns: list(table, "fields").iter().map(normalize_column).collect(),
        indexes: list(table, "indexes").iter().map(normalize_index).collect(),
    }
}

fn normalize_column(field: &Value) -> ColumnRecord {
    ColumnRecord {
        name: str_field(field, "name").unwrap_or_default(),
        typ: normalize_type(field.get("type").unwrap_or(&Value::Null)),
        primary_key: bool_field(field, "pk"),
        unique: bool_field(field, "unique"),
        not_null: bool_field(field, "not_null"),
        auto_increment: bool_field(field, "increment"),
        note: note_field(field),
        default_value: normalize_default(field.get("dbdefault").unwrap_or(&Value::Null)),
    }
}

/// Split `decimal(10,2)`-style declarations into a bare name and its args.
pub fn normalize_type(typ: &Value) -> TypeRecord {
    let Some(obj) = typ.as_object() else {
        let raw = scalar_to_string(typ);
        let (name, args) = split_declared_type(&raw);
        return TypeRecord {
            name,
            schema_name: None,
            args,
            original: None,
        };
    };

    let declared = obj
        .get("type_name")
        .or_else(|| obj.get("typeName"))
        .map(scalar_to_string)
        .unwrap_or_default();
    let (name, inline_args) = split_declared_type(&declared);

    let explicit_args = obj.get("args").map(string_list_from_value).unwrap_or_default();
    let args = if explicit_args.is_empty() {
        inline_args
    } else {
        explicit_args
    };

    let original = obj
        .get("originalTypeName")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| (!declared.is_empty()).then(|| declared.clone()));

    TypeRecord {
        name,
        schema_name: obj
            .get("schemaName")
            .and_then(Value::as_str)
            .map(str::to_string),
        args,
        original,
    }
}

fn split_declared_type(declared: &str) -> (String, Vec<String>) {
    match declared.split_once('(') {
        Some((name, rest)) => {
            let inner = rest.trim_end().trim_end_matches(')');
            (
                name.trim().to_string(),
                string_list_from_value(&Value::String(inner.to_string())),
            )
        }
        None => (declared.trim().to_string(), Vec::new()),
    }
}

/// Absent defaults stay absent, objects pass through as `{value, type}` and
/// bare scalars are tagged with their JSON type name.
pub fn normalize_default(default: &Value) -> Option<DefaultRecord> {
    match default {
        Value::Null => None,
        Value::Object(obj) => Some(DefaultRecord {
            value: obj.get("value").cloned().unwrap_or(Value::Null),
            kind: obj.get("type").and_then(Value::as_str).map(str::to_string),
        }),
        scalar => Some(DefaultRecord {
            value: scalar.clone(),
            kind: Some(json_type_name(scalar).to_string()),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

fn normalize_index(index: &Value) -> IndexRecord {
    let kind = if bool_field(index, "pk") {
        Some("pk".to_string())
    } else {
        str_field(index, "type")
    };

    let unique = kind.as_deref() == Some("unique") || bool_field(index, "unique");

    IndexRecord {
        name: str_field(index, "name"),
        kind,
        unique,
        columns: list(index, "columns")
            .iter()
            .map(|column| match column {
                Value::Object(obj) => IndexColumn::Name(
                    obj.get("value")
                        .or_else(|| obj.get("name"))
                        .map(scalar_to_string)
                        .unwrap_or_default(),
                ),
                other => IndexColumn::Name(scalar_to_string(other)),
            })
            .collect(),
    }
}

fn normalize_ref(ref_node: &Value, schema_name: Option<&str>) -> RefRecord {
    RefRecord {
        name: str_field(ref_node, "name"),
        schema: schema_name.map(str::to_string),
        color: str_field(ref_node, "color"),
        on_delete: str_field(ref_node, "onDelete"),
        on_update: str_field(ref_node, "onUpdate"),
        endpoints: list(ref_node, "endpoints")
            .iter()
            .map(|endpoint| EndpointRecord {
                schema: str_field(endpoint, "schemaName")
                    .or_else(|| schema_name.map(str::to_string)),
                table: str_field(endpoint, "tableName").unwrap_or_default(),
                columns: endpoint
                    .get("fieldNames")
                    .map(string_list_from_value)
                    .unwrap_or_default(),
                relation: endpoint.get("relation").map(scalar_to_string),
            })
            .collect(),
    }
}

fn list<'a>(node: &'a Value, key: &str) -> &'a [Value] {
    node.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn str_field(node: &Value, key: &str) -> Option<String> {
    match node.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn bool_field(node: &Value, key: &str) -> bool {
    node.get(key).and_then(Value::as_bool).unwrap_or(false)
}

// Notes are either plain strings or `{value, token}` objects.
fn note_field(node: &Value) -> Option<String> {
    match node.get("note") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Object(obj)) => note_value(obj),
        _ => None,
    }
}

fn note_value(obj: &Map<String, Value>) -> Option<String> {
    obj.get("value").and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export() -> Value {
        json!({
            "schemas": [{
                "name": "public",
                "tables": [{
                    "name": "posts",
                    "note": {"value": "Blog posts"},
                    "fields": [
                        {"name": "id", "type": {"type_name": "int"}, "pk": true, "increment": true},
                        {"name": "price", "type": {"type_name": "decimal(10,2)", "args": "10,2"}, "not_null": true},
                        {"name": "published", "type": {"type_name": "bool"}, "dbdefault": {"type": "boolean", "value": "false"}},
                        {"name": "title", "type": "varchar", "dbdefault": "untitled"}
                    ],
                    "indexes": [
                        {"columns": [{"type": "column", "value": "title"}], "type": "btree", "unique": true},
                        {"columns": [{"type": "column", "value": "id"}], "pk": true}
                    ]
                }],
                "enums": [{"name": "post_status", "values": [{"name": "draft"}, {"name": "live"}]}],
                "refs": [{
                    "onDelete": "cascade",
                    "endpoints": [
                        {"tableName": "posts", "fieldNames": ["user_id"], "relation": "*"},
                        {"schemaName": "auth", "tableName": "users", "fieldNames": ["id"], "relation": "1"}
                    ]
                }]
            }]
        })
    }

    #[test]
    fn test_normalize_tables_and_columns() {
        let payload = normalize(&export()).unwrap();
        assert_eq!(payload.tables.len(), 1);

        let posts = &payload.tables[0];
        assert_eq!(posts.schema.as_deref(), Some("public"));
        assert_eq!(posts.note.as_deref(), Some("Blog posts"));
        assert!(posts.columns[0].primary_key && posts.columns[0].auto_increment);

        let price = &posts.columns[1];
        assert_eq!(price.typ.name, "decimal");
        assert_eq!(price.typ.args, vec!["10", "2"]);
        assert_eq!(price.typ.original.as_deref(), Some("decimal(10,2)"));
        assert!(price.not_null);
    }

    #[test]
    fn test_normalize_defaults() {
        let payload = normalize(&export()).unwrap();
        let columns = &payload.tables[0].columns;

        assert!(columns[0].default_value.is_none());

        let published = columns[2].default_value.as_ref().unwrap();
        assert_eq!(published.kind.as_deref(), Some("boolean"));

        let title = columns[3].default_value.as_ref().unwrap();
        assert_eq!(title.value, json!("untitled"));
        assert_eq!(title.kind.as_deref(), Some("string"));
        assert_eq!(columns[3].typ.name, "varchar");
    }

    #[test]
    fn test_normalize_indexes() {
        let payload = normalize(&export()).unwrap();
        let indexes = &payload.tables[0].indexes;
        assert!(indexes[0].unique);
        assert_eq!(indexes[0].columns[0].column_name(), "title");
        assert_eq!(indexes[1].kind.as_deref(), Some("pk"));
    }

    #[test]
    fn test_normalize_refs_and_enums() {
        let payload = normalize(&export()).unwrap();
        let reference = &payload.refs[0];
        assert_eq!(reference.on_delete.as_deref(), Some("cascade"));
        assert_eq!(reference.endpoints[0].schema.as_deref(), Some("public"));
        assert_eq!(reference.endpoints[1].schema.as_deref(), Some("auth"));
        assert_eq!(reference.endpoints[0].relation.as_deref(), Some("*"));

        assert_eq!(payload.enums[0].values, vec![json!("draft"), json!("live")]);
    }

    #[test]
    fn test_rejects_non_export() {
        assert!(matches!(normalize(&json!([])), Err(NormalizeError::NotAnObject)));
        assert!(matches!(
            normalize(&json!({"tables": []})),
            Err(NormalizeError::MissingSchemas)
        ));
    }
}
