//! Run configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODELS_DIR: &str = "app/Models";
pub const DEFAULT_MIGRATIONS_DIR: &str = "database/migrations";
pub const DEFAULT_STUBS_DIR: &str = "stubs/dbml-to-laravel";
pub const DEFAULT_PARSER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Project root every relative directory resolves against.
    pub base_path: PathBuf,
    pub models_dir: PathBuf,
    pub migrations_dir: PathBuf,
    /// Template override directory.
    pub stubs_dir: PathBuf,
    /// Overwrite existing models and replace existing migrations.
    pub force: bool,
    /// `YYYY_MM_DD` prefix of migration file names.
    pub date_stamp: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            stubs_dir: PathBuf::from(DEFAULT_STUBS_DIR),
            force: false,
            date_stamp: today_stamp(),
        }
    }
}

impl GeneratorConfig {
    pub fn models_path(&self) -> PathBuf {
        self.resolve(&self.models_dir)
    }

    pub fn migrations_path(&self) -> PathBuf {
        self.resolve(&self.migrations_dir)
    }

    pub fn stubs_path(&self) -> PathBuf {
        self.resolve(&self.stubs_dir)
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_path.join(dir)
        }
    }
}

/// Today's date as a migration prefix, e.g. `2024_03_09`.
pub fn today_stamp() -> String {
    chrono::Local::now().date_naive().format("%Y_%m_%d").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Node.js executable name or path.
    pub node_binary: String,
    /// Parser script run instead of the bundled one.
    pub script: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            node_binary: "node".to_string(),
            script: None,
            timeout: DEFAULT_PARSER_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_against_base() {
        let config = GeneratorConfig {
            base_path: PathBuf::from("/srv/app"),
            migrations_dir: PathBuf::from("/tmp/migrations"),
            ..Default::default()
        };
        assert_eq!(config.models_path(), PathBuf::from("/srv/app/app/Models"));
        assert_eq!(config.migrations_path(), PathBuf::from("/tmp/migrations"));
        assert_eq!(
            config.stubs_path(),
            PathBuf::from("/srv/app/stubs/dbml-to-laravel")
        );
    }

    #[test]
    fn test_today_stamp_shape() {
        let stamp = today_stamp();
        assert_eq!(stamp.len(), 10);
        assert_eq!(stamp.matches('_').count(), 2);
    }
}
