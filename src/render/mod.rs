//! Text generation for models and migrations.

pub mod defaults;
pub mod migration;
pub mod model;
pub mod template;

use std::path::PathBuf;

use serde::Serialize;

use crate::schema::Schema;

pub use migration::{RenderedMigration, column_definition, index_definition, render_migration};
pub use model::{RenderedModel, render_model};
pub use template::{PackagedTemplates, StubLoader, TemplateKind, TemplateLoader, publish_stubs};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{0} stub not found")]
    TemplateNotFound(TemplateKind),
    #[error("table {table} maps to reserved class name {name}")]
    ReservedName { table: String, name: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything rendered for one table, without touching the filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableArtifacts {
    pub table: String,
    pub model_name: Option<String>,
    pub model: Option<String>,
    pub migration_name: Option<String>,
    pub migration: Option<String>,
    pub errors: Vec<String>,
}

/// Render every table. Failures are recorded per table and never stop the rest.
pub fn render_artifacts(schema: &Schema, templates: &dyn TemplateLoader) -> Vec<TableArtifacts> {
    schema
        .tables
        .iter()
        .map(|table| {
            let mut artifacts = TableArtifacts {
                table: table.name.clone(),
                ..Default::default()
            };

            match render_model(table, schema, templates) {
                Ok(model) => {
                    artifacts.model_name = Some(model.class_name);
                    artifacts.model = Some(model.contents);
                }
                Err(e) => artifacts.errors.push(e.to_string()),
            }

            match render_migration(table, schema, templates) {
                Ok(migration) => {
                    artifacts.migration_name = Some(migration.name);
                    artifacts.migration = Some(migration.contents);
                }
                Err(e) => artifacts.errors.push(e.to_string()),
            }

            artifacts
        })
        .collect()
}
