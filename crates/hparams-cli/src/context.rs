//! # Command Context
//!
//! Resolves the global options into the storage configuration and class
//! registry every subcommand runs against.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use hparams_core::{ClassRegistry, SaveMode, StorageConfig};

/// Storage configuration and registry shared by all handlers.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: StorageConfig,
    pub registry: Arc<ClassRegistry>,
}

impl Context {
    /// Build the context from the global options.
    ///
    /// A config file takes precedence over `root`; without either, records
    /// live under the current directory. `manifest` overrides the manifest
    /// named by the config file. Without any manifest the registry is empty.
    pub fn load(config: Option<&Path>, manifest: Option<&Path>, root: Option<&Path>) -> Result<Self> {
        let mut storage = match config {
            Some(path) => StorageConfig::from_yaml_file(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
            None => StorageConfig::with_root(root.unwrap_or_else(|| Path::new("."))),
        };
        if let Some(path) = manifest {
            storage.manifest = Some(path.to_path_buf());
        }

        let registry = match &storage.manifest {
            Some(path) => ClassRegistry::from_yaml_file(path)
                .with_context(|| format!("failed to load class manifest: {}", path.display()))?,
            None => {
                tracing::warn!("no class manifest given; only scalar fields can be declared");
                ClassRegistry::new()
            }
        };
        tracing::debug!(
            blueprints = %storage.blueprint_dir.display(),
            hyperparameters = %storage.hyperparameter_dir.display(),
            classes = registry.class_count(),
            "resolved command context"
        );

        Ok(Self {
            config: storage,
            registry: Arc::new(registry),
        })
    }

    /// `Overwrite` when forced, otherwise the configured default.
    pub fn save_mode(&self, overwrite: bool) -> SaveMode {
        if overwrite {
            SaveMode::Overwrite
        } else {
            self.config.save_mode
        }
    }
}
