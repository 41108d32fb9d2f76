//! Language-agnostic schema model produced by [`crate::builder`].
//!
//! Everything here is plain data. The only mutation after construction is
//! the builder appending [`ColumnReference`]s while it resolves refs.

use std::collections::HashMap;

use serde_json::Value;

use crate::payload::DefaultRecord;

/// Referenced column used when a reference names none.
pub const DEFAULT_TARGET_COLUMN: &str = "id";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<Table>,
    /// Keyed by the type name columns use to refer to the enum.
    pub enums: HashMap<String, EnumDefinition>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// The enum a column type resolves to, if any.
    pub fn enum_for(&self, typ: &ColumnType) -> Option<&EnumDefinition> {
        self.enums.get(&typ.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub schema: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<IndexDefinition>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub typ: ColumnType,
    pub primary_key: bool,
    pub unique: bool,
    pub not_null: bool,
    pub auto_increment: bool,
    pub default_value: Option<ColumnDefaultValue>,
    /// Only the first entry drives generation.
    pub references: Vec<ColumnReference>,
}

impl Column {
    pub fn new(name: impl Into<String>, typ: ColumnType) -> Self {
        Self {
            name: name.into(),
            typ,
            primary_key: false,
            unique: false,
            not_null: false,
            auto_increment: false,
            default_value: None,
            references: Vec::new(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        !self.not_null
    }

    /// Primary key backed by an auto-increment directive.
    pub fn is_auto_increment_key(&self) -> bool {
        self.primary_key && self.auto_increment
    }

    pub fn foreign_key(&self) -> Option<&ColumnReference> {
        self.references.first()
    }

    pub(crate) fn add_reference(&mut self, reference: ColumnReference) {
        self.references.push(reference);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnType {
    pub name: String,
    pub schema_name: Option<String>,
    /// Length, precision and scale in declaration order.
    pub args: Vec<String>,
}

impl ColumnType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_name: None,
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn arg(&self, position: usize) -> Option<&str> {
        self.args.get(position).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefaultValue {
    pub value: Value,
    /// Lower-cased; `expression` and `raw` mark unescaped SQL.
    pub kind: Option<String>,
}

impl ColumnDefaultValue {
    pub fn new(value: Value, kind: Option<&str>) -> Self {
        Self {
            value,
            kind: kind.map(str::to_lowercase),
        }
    }

    /// `None` for a missing record and for a `{value: null, type: null}` pair.
    pub fn from_record(record: Option<&DefaultRecord>) -> Option<Self> {
        let record = record?;
        if record.value.is_null() && record.kind.is_none() {
            return None;
        }
        Some(Self::new(record.value.clone(), record.kind.as_deref()))
    }

    pub fn is_expression(&self) -> bool {
        matches!(self.kind.as_deref(), Some("expression" | "raw"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    pub table: String,
    pub schema: Option<String>,
}

/// Points from the foreign-key owner (many side) to the referenced table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReference {
    pub target_table: ReferenceTable,
    pub target_column: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl ColumnReference {
    pub fn target_column(&self) -> &str {
        self.target_column.as_deref().unwrap_or(DEFAULT_TARGET_COLUMN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub unique: bool,
    pub kind: Option<String>,
}

impl IndexDefinition {
    pub fn is_primary(&self) -> bool {
        matches!(self.kind.as_deref(), Some("pk" | "primary"))
    }

    /// Primary-key indexes are carried by column flags instead.
    pub fn is_renderable(&self) -> bool {
        !self.columns.is_empty() && !self.is_primary()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<EnumValue>,
}

impl EnumDefinition {
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.value.as_str())
    }
}
