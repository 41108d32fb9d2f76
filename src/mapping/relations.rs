//! Relationship discovery.
//!
//! Belongs-to relations come from the table's own foreign keys. Has-many
//! relations are the reverse side and require scanning every other table
//! for references pointing back at the table being rendered.

use std::collections::HashSet;

use crate::mapping::naming;
use crate::schema::{DEFAULT_TARGET_COLUMN, Schema, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    BelongsTo,
    HasMany,
}

impl RelationKind {
    pub fn builder_method(self) -> &'static str {
        match self {
            Self::BelongsTo => "belongsTo",
            Self::HasMany => "hasMany",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,
    pub method: String,
    pub related_model: String,
    /// Table on the other side of the relation.
    pub related_table: String,
    pub foreign_key: String,
    /// Owner key (belongs-to) or local key (has-many), only when not `id`.
    pub key: Option<String>,
}

/// Belongs-to relations followed by has-many relations.
pub fn relations(table: &Table, schema: &Schema) -> Vec<Relation> {
    let mut all = belongs_to_relations(table);
    all.extend(has_many_relations(table, schema));
    all
}

pub fn belongs_to_relations(table: &Table) -> Vec<Relation> {
    let mut used_methods = HashSet::new();

    table
        .columns
        .iter()
        .filter_map(|column| {
            let reference = column.foreign_key()?;
            let target = &reference.target_table.table;

            let mut method = naming::belongs_to_method(target);
            if used_methods.contains(&method) {
                method = naming::column_relation_method(&column.name);
            }
            let stem = method.clone();
            let mut counter = 2;
            while !used_methods.insert(method.clone()) {
                method = format!("{stem}{counter}");
                counter += 1;
            }

            Some(Relation {
                kind: RelationKind::BelongsTo,
                method,
                related_model: naming::model_name(target),
                related_table: target.clone(),
                foreign_key: column.name.clone(),
                key: non_default_key(reference.target_column()),
            })
        })
        .collect()
}

/// Reverse relations from every other table whose columns reference `table`.
///
/// Entries with the same method name and source table collapse to the
/// first one found.
pub fn has_many_relations(table: &Table, schema: &Schema) -> Vec<Relation> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    let others = schema
        .tables
        .iter()
        .filter(|other| !(other.name == table.name && other.schema == table.schema));

    for other in others {
        for column in &other.columns {
            for reference in &column.references {
                if !reference.target_table.table.eq_ignore_ascii_case(&table.name) {
                    continue;
                }

                let method = naming::has_many_method(&other.name);
                if !seen.insert((method.clone(), other.name.clone())) {
                    continue;
                }

                found.push(Relation {
                    kind: RelationKind::HasMany,
                    method,
                    related_model: naming::model_name(&other.name),
                    related_table: other.name.clone(),
                    foreign_key: column.name.clone(),
                    key: non_default_key(reference.target_column()),
                });
            }
        }
    }

    found
}

fn non_default_key(column: &str) -> Option<String> {
    (column != DEFAULT_TARGET_COLUMN).then(|| column.to_string())
}
