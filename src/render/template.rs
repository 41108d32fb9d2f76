//! Template loading and placeholder substitution.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::RenderError;

const PACKAGED_MODEL: &str = include_str!("../../stubs/model.stub");
const PACKAGED_MIGRATION: &str = include_str!("../../stubs/migration.stub");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Model,
    Migration,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::Model, TemplateKind::Migration];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Model => "model.stub",
            Self::Migration => "migration.stub",
        }
    }

    pub fn packaged(self) -> &'static str {
        match self {
            Self::Model => PACKAGED_MODEL,
            Self::Migration => PACKAGED_MIGRATION,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "Model"),
            Self::Migration => write!(f, "Migration"),
        }
    }
}

/// Source of raw template text. `Ok(None)` means the template does not exist.
pub trait TemplateLoader {
    fn load(&self, kind: TemplateKind) -> Result<Option<String>, RenderError>;
}

/// Templates compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackagedTemplates;

impl TemplateLoader for PackagedTemplates {
    fn load(&self, kind: TemplateKind) -> Result<Option<String>, RenderError> {
        Ok(Some(kind.packaged().to_string()))
    }
}

/// Project-level stub directory checked before the packaged templates.
#[derive(Debug, Clone)]
pub struct StubLoader {
    override_dir: PathBuf,
    packaged: bool,
}

impl StubLoader {
    pub fn new(override_dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: override_dir.into(),
            packaged: true,
        }
    }

    /// Disable the packaged fallback so only the override directory is consulted.
    pub fn without_packaged(mut self) -> Self {
        self.packaged = false;
        self
    }
}

impl TemplateLoader for StubLoader {
    fn load(&self, kind: TemplateKind) -> Result<Option<String>, RenderError> {
        let path = self.override_dir.join(kind.file_name());
        if path.is_file() {
            return fs::read_to_string(&path)
                .map(Some)
                .map_err(|source| RenderError::Io { path, source });
        }

        if self.packaged {
            return PackagedTemplates.load(kind);
        }

        Ok(None)
    }
}

/// Load a template, turning a missing one into [`RenderError::TemplateNotFound`].
pub fn require(loader: &dyn TemplateLoader, kind: TemplateKind) -> Result<String, RenderError> {
    loader.load(kind)?.ok_or(RenderError::TemplateNotFound(kind))
}

/// Replace every `{{ key }}` with its value.
pub fn fill(template: &str, replacements: &[(&str, &str)]) -> String {
    replacements
        .iter()
        .fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("{{{{ {key} }}}}"), value)
        })
}

/// Copy the packaged templates into `target_dir`.
///
/// Existing files are left alone unless `force` is set. Returns the paths
/// that were written.
pub fn publish_stubs(target_dir: &Path, force: bool) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(target_dir)?;

    let mut written = Vec::new();
    for kind in TemplateKind::ALL {
        let path = target_dir.join(kind.file_name());
        if path.exists() && !force {
            warn!("Stub {} already exists. Use --force to overwrite.", path.display());
            continue;
        }
        fs::write(&path, kind.packaged())?;
        info!("Published {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_placeholders() {
        let text = fill(
            "class {{ modelName }} { {{ fillable }} {{ modelName }} }",
            &[("modelName", "User"), ("fillable", "'name'")],
        );
        assert_eq!(text, "class User { 'name' User }");
    }

    #[test]
    fn test_packaged_templates_carry_placeholders() {
        let model = PackagedTemplates.load(TemplateKind::Model).unwrap().unwrap();
        for key in ["modelName", "tableProperty", "fillable", "casts", "relations"] {
            assert!(model.contains(&format!("{{{{ {key} }}}}")), "{key}");
        }

        let migration = PackagedTemplates.load(TemplateKind::Migration).unwrap().unwrap();
        for key in ["tableName", "fields", "indexes"] {
            assert!(migration.contains(&format!("{{{{ {key} }}}}")), "{key}");
        }
    }

    #[test]
    fn test_override_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.stub"), "// CUSTOM {{ modelName }}").unwrap();

        let loader = StubLoader::new(dir.path());
        let model = loader.load(TemplateKind::Model).unwrap().unwrap();
        assert_eq!(model, "// CUSTOM {{ modelName }}");

        let migration = loader.load(TemplateKind::Migration).unwrap().unwrap();
        assert_eq!(migration, PACKAGED_MIGRATION);
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let loader = StubLoader::new(dir.path()).without_packaged();
        assert!(matches!(
            require(&loader, TemplateKind::Model),
            Err(RenderError::TemplateNotFound(TemplateKind::Model))
        ));
    }

    #[test]
    fn test_publish_stubs_respects_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("stubs/dbml-to-laravel");

        let written = publish_stubs(&target, false).unwrap();
        assert_eq!(written.len(), 2);

        fs::write(target.join("model.stub"), "custom").unwrap();
        let written = publish_stubs(&target, false).unwrap();
        assert!(written.is_empty());
        assert_eq!(fs::read_to_string(target.join("model.stub")).unwrap(), "custom");

        publish_stubs(&target, true).unwrap();
        assert_eq!(fs::read_to_string(target.join("model.stub")).unwrap(), PACKAGED_MODEL);
    }
}
