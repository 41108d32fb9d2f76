//! Builds the [`Schema`] model from a normalized payload.
//!
//! Tables are built first while every column is recorded in a flat lookup
//! keyed by `schema.table.column`. Refs are then resolved in a single pass
//! that appends a [`ColumnReference`] to the many-side column through that
//! lookup. Malformed refs, unresolved cardinalities, dangling columns and
//! empty indexes are dropped without failing the build.

use std::collections::HashMap;

use tracing::debug;

use crate::payload::{EndpointRecord, NormalizedPayload, RefRecord, TableRecord, scalar_to_string};
use crate::schema::{
    Column, ColumnDefaultValue, ColumnReference, ColumnType, EnumDefinition, EnumValue,
    IndexDefinition, ReferenceTable, Schema, Table,
};

const DEFAULT_SCHEMA: &str = "public";

/// Position of a column inside `Schema::tables`.
type Slot = (usize, usize);

pub struct SchemaFactory;

impl SchemaFactory {
    pub fn from_payload(payload: &NormalizedPayload) -> Schema {
        let mut tables = Vec::with_capacity(payload.tables.len());
        let mut column_index: HashMap<String, Slot> = HashMap::new();

        for record in &payload.tables {
            let table = build_table(record);
            let table_slot = tables.len();
            for (column_slot, column) in table.columns.iter().enumerate() {
                column_index.insert(
                    column_key(&table.schema, &table.name, &column.name),
                    (table_slot, column_slot),
                );
            }
            tables.push(table);
        }

        for reference in &payload.refs {
            attach_reference(reference, &mut tables, &column_index);
        }

        let enums = payload
            .enums
            .iter()
            .map(|record| {
                let definition = EnumDefinition {
                    name: record.name.clone(),
                    values: record
                        .values
                        .iter()
                        .map(|v| EnumValue {
                            value: scalar_to_string(v),
                        })
                        .collect(),
                };
                (record.name.clone(), definition)
            })
            .collect();

        Schema { tables, enums }
    }
}

fn build_table(record: &TableRecord) -> Table {
    let schema = record
        .schema
        .clone()
        .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

    let columns = record
        .columns
        .iter()
        .map(|c| Column {
            name: c.name.clone(),
            typ: ColumnType {
                name: c.typ.name.clone(),
                schema_name: c.typ.schema_name.clone(),
                args: c.typ.args.clone(),
            },
            primary_key: c.primary_key,
            unique: c.unique,
            not_null: c.not_null,
            auto_increment: c.auto_increment,
            default_value: ColumnDefaultValue::from_record(c.default_value.as_ref()),
            references: Vec::new(),
        })
        .collect();

    let indexes = record
        .indexes
        .iter()
        .filter_map(|index| {
            let columns: Vec<String> = index
                .columns
                .iter()
                .map(|c| c.column_name().to_string())
                .filter(|c| !c.is_empty())
                .collect();

            if columns.is_empty() {
                debug!(table = %record.name, "dropping index without columns");
                return None;
            }

            Some(IndexDefinition {
                name: index.name.clone(),
                columns,
                unique: index.unique,
                kind: index.kind.clone(),
            })
        })
        .collect();

    Table {
        name: record.name.clone(),
        schema,
        columns,
        indexes,
    }
}

fn attach_reference(
    reference: &RefRecord,
    tables: &mut [Table],
    column_index: &HashMap<String, Slot>,
) {
    let [first, second] = reference.endpoints.as_slice() else {
        debug!(
            endpoints = reference.endpoints.len(),
            "skipping ref without exactly two endpoints"
        );
        return;
    };

    let Some((referencing, referenced)) = determine_direction(first, second) else {
        debug!(
            from = %first.table,
            to = %second.table,
            "skipping ref that is not one-to-many"
        );
        return;
    };

    let target_table = ReferenceTable {
        table: referenced.table.clone(),
        schema: referenced.schema.clone(),
    };
    let target_column = referenced.columns.first().cloned();
    let on_delete = reference.on_delete.as_deref().map(str::to_lowercase);
    let on_update = reference.on_update.as_deref().map(str::to_lowercase);

    let referencing_schema = referencing.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);

    for column_name in &referencing.columns {
        let key = column_key(referencing_schema, &referencing.table, column_name);
        let Some(&(table_slot, column_slot)) = column_index.get(&key) else {
            debug!(column = %key, "skipping ref to unknown column");
            continue;
        };

        tables[table_slot].columns[column_slot].add_reference(ColumnReference {
            target_table: target_table.clone(),
            target_column: target_column.clone(),
            on_delete: on_delete.clone(),
            on_update: on_update.clone(),
        });
    }
}

/// Order a ref's endpoints as (many side, one side).
///
/// Only a `*` paired with a `1` resolves; `1:1`, `*:*` and unknown tokens
/// yield `None`.
pub fn determine_direction<'a>(
    first: &'a EndpointRecord,
    second: &'a EndpointRecord,
) -> Option<(&'a EndpointRecord, &'a EndpointRecord)> {
    match (first.relation.as_deref(), second.relation.as_deref()) {
        (Some("*"), Some("1")) => Some((first, second)),
        (Some("1"), Some("*")) => Some((second, first)),
        _ => None,
    }
}

fn column_key(schema: &str, table: &str, column: &str) -> String {
    format!("{schema}.{table}.{column}").to_lowercase()
}
