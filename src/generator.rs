//! Writes model and migration files for every table of a schema.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::builder::SchemaFactory;
use crate::config::GeneratorConfig;
use crate::mapping::naming;
use crate::parser::{DbmlParser, ParseError};
use crate::render::{TemplateLoader, render_migration, render_model};
use crate::schema::{Schema, Table};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("File not found: {}", .0.display())]
    InputMissing(PathBuf),
    #[error("Failed to parse DBML file: {0}")]
    Parse(#[from] ParseError),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub models: usize,
    pub migrations: usize,
    /// Artifacts left alone because they already existed.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug)]
enum Outcome {
    Written,
    Skipped,
    Failed,
}

pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    templates: &'a dyn TemplateLoader,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a GeneratorConfig, templates: &'a dyn TemplateLoader) -> Self {
        Self { config, templates }
    }

    /// Generate both artifacts for every table, in declaration order.
    ///
    /// Per-table failures are logged and counted; they never stop the run.
    pub fn run(&self, schema: &Schema) -> GenerationReport {
        let mut report = GenerationReport::default();
        let mut sequence = 0;

        for table in &schema.tables {
            if report.tally(self.generate_model(table, schema)) {
                report.models += 1;
            }

            let (migration, next) = self.generate_migration(table, schema, sequence);
            sequence = next;
            if report.tally(migration) {
                report.migrations += 1;
            }
        }

        info!(
            "Generated {} models and {} migrations successfully.",
            report.models, report.migrations
        );
        report
    }

    fn generate_model(&self, table: &Table, schema: &Schema) -> Outcome {
        let rendered = match render_model(table, schema, self.templates) {
            Ok(rendered) => rendered,
            Err(e) => {
                error!("Model for table \"{}\" not generated: {e}", table.name);
                return Outcome::Failed;
            }
        };

        let path = self
            .config
            .models_path()
            .join(format!("{}.php", rendered.class_name));

        if path.exists() && !self.config.force {
            warn!(
                "Model {} already exists. Use --force to overwrite.",
                rendered.class_name
            );
            return Outcome::Skipped;
        }

        match write_file(&path, &rendered.contents) {
            Ok(()) => {
                info!("Model {} created.", rendered.class_name);
                Outcome::Written
            }
            Err(e) => {
                error!("Failed to write {}: {e}", path.display());
                Outcome::Failed
            }
        }
    }

    /// Returns the outcome and the sequence number for the next migration.
    fn generate_migration(&self, table: &Table, schema: &Schema, sequence: u32) -> (Outcome, u32) {
        let dir = self.config.migrations_path();
        let existing = existing_migrations(&dir, &naming::migration_name(&table.name));

        if !existing.is_empty() && !self.config.force {
            warn!("Migration for table {} already exists. Skipping...", table.name);
            return (Outcome::Skipped, sequence);
        }

        let rendered = match render_migration(table, schema, self.templates) {
            Ok(rendered) => rendered,
            Err(e) => {
                error!("Migration for table \"{}\" not generated: {e}", table.name);
                return (Outcome::Failed, sequence);
            }
        };

        for stale in &existing {
            if let Err(e) = fs::remove_file(stale) {
                warn!("Could not remove {}: {e}", stale.display());
            }
        }

        let file_name = format!(
            "{}_{:06}_{}.php",
            self.config.date_stamp, sequence, rendered.name
        );
        let path = dir.join(file_name);

        match write_file(&path, &rendered.contents) {
            Ok(()) => {
                info!("Migration for {} created.", table.name);
                (Outcome::Written, sequence + 1)
            }
            Err(e) => {
                error!("Failed to write {}: {e}", path.display());
                (Outcome::Failed, sequence)
            }
        }
    }
}

impl GenerationReport {
    /// Counts skips and failures; true when the artifact was written.
    fn tally(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Written => return true,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
        false
    }
}

/// Parse `input`, build the schema and write every artifact.
pub fn generate(
    input: &Path,
    parser: &dyn DbmlParser,
    config: &GeneratorConfig,
    templates: &dyn TemplateLoader,
) -> Result<GenerationReport, GenerateError> {
    if !input.is_file() {
        return Err(GenerateError::InputMissing(input.to_path_buf()));
    }

    let source = fs::read_to_string(input).map_err(|source| GenerateError::Io {
        path: input.to_path_buf(),
        source,
    })?;

    let payload = parser.parse(&source)?;
    let schema = SchemaFactory::from_payload(&payload);

    Ok(Generator::new(config, templates).run(&schema))
}

/// Files in `dir` named `*_<migration_name>.php`.
fn existing_migrations(dir: &Path, migration_name: &str) -> Vec<PathBuf> {
    let suffix = format!("_{migration_name}.php");
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(&suffix))
        })
        .collect();
    found.sort();
    found
}

fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
