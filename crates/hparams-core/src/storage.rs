//! # Record Storage
//!
//! Filesystem layout for persisted blueprints and hyperparameters. A
//! [`RecordStore`] is one directory; records are named
//! `{prefix}_{id}.json` where the prefix is fixed by the [`RecordKind`].
//!
//! The store is an explicit value handed to every save and load. There is
//! no process-wide default directory.
//!
//! No locking is performed: concurrent writers to the same identifier race
//! and the last write wins.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::HparamsError;

/// What a record holds; determines its filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Blueprint,
    HyperParameters,
}

impl RecordKind {
    /// Filename prefix for this kind of record.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Blueprint => "BluePrint",
            Self::HyperParameters => "HyperParameters",
        }
    }
}

/// Whether a save may replace an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Fail with `AlreadyExists` if the record is present.
    #[default]
    CreateNew,
    /// Replace any existing record.
    Overwrite,
}

/// A directory of JSON records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// A store rooted at `root`. The directory is not touched.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A store rooted at `root`, creating the directory if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, HparamsError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` if `id` is empty or could escape the
    /// store directory.
    pub fn record_path(&self, kind: RecordKind, id: &str) -> Result<PathBuf, HparamsError> {
        validate_record_id(id)?;
        Ok(self.root.join(format!("{}_{id}.json", kind.prefix())))
    }

    /// Whether a record for `id` exists.
    pub fn exists(&self, kind: RecordKind, id: &str) -> Result<bool, HparamsError> {
        Ok(self.record_path(kind, id)?.is_file())
    }

    /// Serialize `record` as pretty JSON under `id`.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` in [`SaveMode::CreateNew`] when the record is
    /// already present, `Json` if serialization fails and `Io` for any other
    /// filesystem failure.
    pub fn write<T: Serialize>(
        &self,
        kind: RecordKind,
        id: &str,
        record: &T,
        mode: SaveMode,
    ) -> Result<PathBuf, HparamsError> {
        let path = self.record_path(kind, id)?;
        let mut text = serde_json::to_string_pretty(record)?;
        text.push('\n');

        let mut file = match mode {
            SaveMode::CreateNew => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => HparamsError::AlreadyExists { path: path.clone() },
                    _ => HparamsError::Io(e),
                })?,
            SaveMode::Overwrite => File::create(&path)?,
        };
        file.write_all(text.as_bytes())?;

        tracing::info!(kind = kind.prefix(), id, path = %path.display(), "saved record");
        Ok(path)
    }

    /// Read and deserialize the record for `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record exists and `Json` if it does not parse.
    pub fn read<T: DeserializeOwned>(&self, kind: RecordKind, id: &str) -> Result<T, HparamsError> {
        let path = self.record_path(kind, id)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(HparamsError::NotFound { path });
            }
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_str(&text)?;
        tracing::info!(kind = kind.prefix(), id, path = %path.display(), "loaded record");
        Ok(record)
    }

    /// Identifiers of every record of `kind` in the store, sorted.
    ///
    /// A missing directory holds no records.
    pub fn list(&self, kind: RecordKind) -> Result<Vec<String>, HparamsError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let prefix = format!("{}_", kind.prefix());
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Some(id) = name
                    .strip_prefix(&prefix)
                    .and_then(|rest| rest.strip_suffix(".json"))
                {
                    if !id.is_empty() {
                        ids.push(id.to_string());
                    }
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn validate_record_id(id: &str) -> Result<(), HparamsError> {
    let reason = if id.is_empty() {
        Some("identifier is empty")
    } else if id.contains(['/', '\\', '\0']) {
        Some("identifier contains a path separator")
    } else if id.contains("..") {
        Some("identifier contains '..'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(HparamsError::InvalidIdentifier {
            value: id.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
