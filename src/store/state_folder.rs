// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::client::{ExpansionStore, TreeExpansionState};

const STATE_FILE_NAME: &str = "cursus-tree-state.json";
const LOG_FILE_NAME: &str = "cursus.log";
const STATE_VERSION: u32 = 1;

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    UnsupportedVersion { path: PathBuf, version: u32 },
    SymlinkRefused { path: PathBuf },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::UnsupportedVersion { path, version } => {
                write!(f, "unsupported state version {version} in {path:?}")
            }
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::UnsupportedVersion { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place without syncing.
    #[default]
    BestEffort,

    /// Also syncs the file contents and the directory entry where the platform allows.
    Durable,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFileJson {
    version: u32,
    #[serde(default)]
    trees: BTreeMap<String, TreeExpansionState>,
}

/// Folder holding the browser's persisted UI state and its log file.
///
/// Expansion states are kept in memory and the whole file is rewritten atomically on
/// every save.
#[derive(Debug, Clone)]
pub struct StateFolder {
    root: PathBuf,
    durability: WriteDurability,
    trees: BTreeMap<String, TreeExpansionState>,
}

impl StateFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), durability: WriteDurability::default(), trees: BTreeMap::new() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    /// Opens the folder and reads whatever state it already holds.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut folder = Self::new(root);
        folder.trees = folder.load_states()?;
        Ok(folder)
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }

    pub fn load_states(&self) -> Result<BTreeMap<String, TreeExpansionState>, StoreError> {
        let path = self.state_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let json: StateFileJson = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        if json.version != STATE_VERSION {
            return Err(StoreError::UnsupportedVersion { path, version: json.version });
        }
        Ok(json.trees)
    }

    pub fn save_states(&self) -> Result<(), StoreError> {
        let path = self.state_path();
        let json = StateFileJson { version: STATE_VERSION, trees: self.trees.clone() };
        let raw = serde_json::to_string_pretty(&json)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        write_atomic(&self.root, &path, format!("{raw}\n").as_bytes(), self.durability)
    }
}

impl ExpansionStore for StateFolder {
    fn load(&self, key: &str) -> Option<TreeExpansionState> {
        self.trees.get(key).cloned()
    }

    fn save(&mut self, key: &str, state: &TreeExpansionState) -> Result<(), StoreError> {
        self.trees.insert(key.to_owned(), state.clone());
        self.save_states()
    }
}

fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(root).map_err(|source| StoreError::Io { path: root.to_path_buf(), source })?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused { path: path.to_path_buf() });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    }

    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path = parent.join(format!(".cursus.tmp.{}.{nanos}", file_name.to_string_lossy()));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    file.write_all(contents).map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    }
    drop(file);

    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io { path: path.to_path_buf(), source });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent)
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
            dir.sync_all().map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
