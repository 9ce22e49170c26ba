//! Store configuration loading.
//!
//! The store reads its data directory and per-document file names from a
//! small YAML file (`fabula-store.yaml` by convention). Every field has a
//! default, so an empty file -- or no file at all, via
//! [`StoreConfig::for_dir`] -- yields the conventional layout:
//!
//! ```yaml
//! dir: worlds/rome
//! files:
//!   characters: characters.json
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading store configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Store configuration: where the world lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the sub-document JSON files.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Per-document file name overrides.
    #[serde(default)]
    pub files: FileNames,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            files: FileNames::default(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it is not valid YAML for this shape.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&text)?)
    }

    /// Default configuration rooted at `dir`.
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: FileNames::default(),
        }
    }
}

/// File names for each sub-document, all defaulted to `<name>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileNames {
    /// World document file name.
    #[serde(default = "default_world")]
    pub world: String,
    /// Characters document file name.
    #[serde(default = "default_characters")]
    pub characters: String,
    /// Relationships document file name.
    #[serde(default = "default_relationships")]
    pub relationships: String,
    /// Secrets document file name.
    #[serde(default = "default_secrets")]
    pub secrets: String,
    /// Assets document file name.
    #[serde(default = "default_assets")]
    pub assets: String,
    /// Threads document file name.
    #[serde(default = "default_threads")]
    pub threads: String,
    /// Operator catalog file name.
    #[serde(default = "default_operators")]
    pub operators: String,
    /// Authoring constraints file name.
    #[serde(default = "default_constraints")]
    pub constraints: String,
}

fn default_world() -> String {
    String::from("world.json")
}
fn default_characters() -> String {
    String::from("characters.json")
}
fn default_relationships() -> String {
    String::from("relationships.json")
}
fn default_secrets() -> String {
    String::from("secrets.json")
}
fn default_assets() -> String {
    String::from("assets.json")
}
fn default_threads() -> String {
    String::from("threads.json")
}
fn default_operators() -> String {
    String::from("operators.json")
}
fn default_constraints() -> String {
    String::from("constraints.json")
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            world: default_world(),
            characters: default_characters(),
            relationships: default_relationships(),
            secrets: default_secrets(),
            assets: default_assets(),
            threads: default_threads(),
            operators: default_operators(),
            constraints: default_constraints(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: StoreConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.files.world, "world.json");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: StoreConfig = serde_yml::from_str(
            "dir: worlds/rome\nfiles:\n  characters: cast.json\n",
        )
        .unwrap();
        assert_eq!(config.dir, PathBuf::from("worlds/rome"));
        assert_eq!(config.files.characters, "cast.json");
        assert_eq!(config.files.secrets, "secrets.json");
    }

    #[test]
    fn for_dir_uses_default_file_names() {
        let config = StoreConfig::for_dir("/tmp/world");
        assert_eq!(config.dir, PathBuf::from("/tmp/world"));
        assert_eq!(config.files, FileNames::default());
    }
}
