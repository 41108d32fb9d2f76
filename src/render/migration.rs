//! Schema-builder migration body.

use crate::mapping::types::{increments_method, php_list, php_string};
use crate::mapping::{DeclaredType, ForeignKeyAction, naming, storage_type};
use crate::schema::{Column, ColumnReference, IndexDefinition, Schema, Table};

use super::RenderError;
use super::defaults::render_default;
use super::template::{TemplateKind, TemplateLoader, fill, require};

const LINE_INDENT: &str = "            ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMigration {
    /// `create_<table>_table`, without date stamp or extension.
    pub name: String,
    pub contents: String,
}

pub fn render_migration(
    table: &Table,
    schema: &Schema,
    templates: &dyn TemplateLoader,
) -> Result<RenderedMigration, RenderError> {
    let template = require(templates, TemplateKind::Migration)?;

    let fields = table
        .columns
        .iter()
        .map(|c| format!("{LINE_INDENT}{}", column_definition(c, schema)))
        .collect::<Vec<_>>()
        .join("\n");

    let indexes: String = table
        .indexes
        .iter()
        .filter(|index| index.is_renderable())
        .map(|index| format!("\n{LINE_INDENT}{}", index_definition(index)))
        .collect();

    let contents = fill(
        &template,
        &[
            ("tableName", &table.name),
            ("fields", &fields),
            ("indexes", &indexes),
        ],
    );

    Ok(RenderedMigration {
        name: naming::migration_name(&table.name),
        contents,
    })
}

/// One `$table->...;` statement.
///
/// Suffix order: nullable, default, unique (non-primary), primary
/// (non-auto-increment). The foreign-key constraint chain goes last:
/// `constrained()` returns the key definition, not the column.
pub fn column_definition(column: &Column, schema: &Schema) -> String {
    let (mut field, constraint) = base_directive(column, schema);

    if column.is_nullable() && !column.primary_key {
        field.push_str("->nullable()");
    }

    if let Some(default) = &column.default_value {
        field.push_str(&format!("->default({})", render_default(default)));
    }

    if column.unique && !column.primary_key {
        field.push_str("->unique()");
    }

    if column.primary_key && !column.auto_increment {
        field.push_str("->primary()");
    }

    if let Some(constraint) = constraint {
        field.push_str(&constraint);
    }

    format!("$table->{field};")
}

/// Column declaration plus the foreign-key constraint chain, if any.
fn base_directive(column: &Column, schema: &Schema) -> (String, Option<String>) {
    if column.is_auto_increment_key() {
        let directive = format!("{}({})", increments_method(&column.typ), php_string(&column.name));
        return (directive, None);
    }

    let schema_enum = schema.enum_for(&column.typ);
    if schema_enum.is_none() {
        if let Some(reference) = column.foreign_key() {
            return (foreign_declaration(column), Some(foreign_constraint(reference)));
        }
    }

    (storage_type(&column.typ, schema_enum).directive(&column.name), None)
}

fn foreign_declaration(column: &Column) -> String {
    let method = match DeclaredType::classify(&column.typ.name) {
        DeclaredType::Uuid => "foreignUuid",
        _ => "foreignId",
    };
    format!("{method}({})", php_string(&column.name))
}

/// `->constrained(...)` followed by the referential actions.
fn foreign_constraint(reference: &ColumnReference) -> String {
    let mut constrained = vec![php_string(&reference.target_table.table)];
    if reference.target_column() != crate::schema::DEFAULT_TARGET_COLUMN {
        constrained.push(php_string(reference.target_column()));
    }

    let mut chain = format!("->constrained({})", constrained.join(", "));

    if let Some(action) = reference.on_delete.as_deref().and_then(ForeignKeyAction::parse) {
        chain.push_str(action.on_delete_suffix());
    }
    if let Some(action) = reference.on_update.as_deref().and_then(ForeignKeyAction::parse) {
        chain.push_str(action.on_update_suffix());
    }

    chain
}

pub fn index_definition(index: &IndexDefinition) -> String {
    let method = if index.unique { "unique" } else { "index" };
    let columns = php_list(&index.columns);

    match &index.name {
        Some(name) => format!("$table->{method}({columns}, {});", php_string(name)),
        None => format!("$table->{method}({columns});"),
    }
}
