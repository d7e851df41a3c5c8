//! # Storage Configuration
//!
//! Where blueprints and hyperparameters live, which class manifest to load
//! and whether saves may overwrite. A configuration value is built once by
//! the application and passed down; nothing here is cached globally.
//!
//! ```yaml
//! blueprint_dir: blueprints
//! hyperparameter_dir: hyperparameters
//! manifest: classes.yaml
//! save_mode: overwrite
//! ```
//!
//! Relative paths in a configuration file are resolved against the
//! directory containing that file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HparamsError;
use crate::storage::{RecordStore, SaveMode};

/// Storage locations and save policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding `BluePrint_<id>.json` records.
    pub blueprint_dir: PathBuf,
    /// Directory holding `HyperParameters_<id>.json` records.
    pub hyperparameter_dir: PathBuf,
    /// Class manifest describing the registry, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    /// Default save policy.
    #[serde(default)]
    pub save_mode: SaveMode,
}

impl StorageConfig {
    /// `root/blueprints` and `root/hyperparameters`, no manifest, create-new saves.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            blueprint_dir: root.join("blueprints"),
            hyperparameter_dir: root.join("hyperparameters"),
            manifest: None,
            save_mode: SaveMode::default(),
        }
    }

    /// Parse a configuration from YAML text. Paths are taken as written.
    pub fn from_yaml_str(text: &str) -> Result<Self, HparamsError> {
        serde_yaml::from_str(text)
            .map_err(|e| HparamsError::Config(format!("invalid storage config: {e}")))
    }

    /// Read a configuration file, resolving relative paths against its directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, HparamsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            HparamsError::Config(format!("cannot read storage config {}: {e}", path.display()))
        })?;
        let mut config = Self::from_yaml_str(&text)?;
        if let Some(base) = path.parent() {
            config.blueprint_dir = anchor(base, &config.blueprint_dir);
            config.hyperparameter_dir = anchor(base, &config.hyperparameter_dir);
            config.manifest = config.manifest.map(|m| anchor(base, &m));
        }
        Ok(config)
    }

    pub fn blueprint_store(&self) -> RecordStore {
        RecordStore::new(&self.blueprint_dir)
    }

    pub fn hyperparameter_store(&self) -> RecordStore {
        RecordStore::new(&self.hyperparameter_dir)
    }

    /// Create both storage directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<(), HparamsError> {
        std::fs::create_dir_all(&self.blueprint_dir)?;
        std::fs::create_dir_all(&self.hyperparameter_dir)?;
        Ok(())
    }
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
