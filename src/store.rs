//! File-backed record store.
//!
//! The whole store is one JSON document mapping repository names to ordered
//! lists of records. It is read fully on load and rewritten fully after every
//! mutation.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::record::Record;

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "refm_db.json";

const APP_DIR_NAME: &str = "refm";

/// Errors that can occur when reading or mutating the store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Repository '{0}' already exists.")]
    RepositoryExists(String),

    #[error("Repository '{0}' does not exist.")]
    RepositoryNotFound(String),

    #[error("store file '{}' is not valid: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize store: {0}")]
    Serialize(serde_json::Error),

    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no data directory: neither XDG_DATA_HOME nor a home directory is available")]
    NoDataDir,
}

impl StoreError {
    /// Whether the error comes from user input rather than the environment.
    ///
    /// User errors are reported and the invocation ends normally.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::RepositoryExists(_) | StoreError::RepositoryNotFound(_)
        )
    }
}

/// Repositories of records, bound to the file they persist to.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    repositories: IndexMap<String, Vec<Record>>,
}

impl Store {
    /// Loads the store from `path`.
    ///
    /// A missing file yields an empty store. A file that is not a valid store
    /// document is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let repositories = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| {
                StoreError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => IndexMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let store = Self { path, repositories };
        debug!(
            "loaded {} repositories from {}",
            store.repositories.len(),
            store.path.display()
        );
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a repository with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.repositories.contains_key(name)
    }

    /// The records of a repository, in insertion order.
    pub fn repository(&self, name: &str) -> Option<&[Record]> {
        self.repositories.get(name).map(Vec::as_slice)
    }

    /// Iterates over `(name, records)` pairs, in creation order.
    pub fn repositories(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.repositories
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    /// Creates an empty repository and persists the store.
    ///
    /// # Errors
    ///
    /// [`StoreError::RepositoryExists`] if the name is taken; the store is left
    /// untouched and nothing is written.
    pub fn create_repository(&mut self, name: &str) -> Result<(), StoreError> {
        if self.contains(name) {
            return Err(StoreError::RepositoryExists(name.to_string()));
        }

        self.repositories.insert(name.to_string(), Vec::new());
        if let Err(e) = self.persist() {
            self.repositories.shift_remove(name);
            return Err(e);
        }

        debug!("created repository '{}'", name);
        Ok(())
    }

    /// Appends a record to a repository and persists the store.
    ///
    /// # Errors
    ///
    /// [`StoreError::RepositoryNotFound`] if the repository does not exist; it
    /// is not created and nothing is written.
    pub fn append_record(&mut self, name: &str, record: Record) -> Result<(), StoreError> {
        let records = self
            .repositories
            .get_mut(name)
            .ok_or_else(|| StoreError::RepositoryNotFound(name.to_string()))?;
        records.push(record);

        if let Err(e) = self.persist() {
            if let Some(records) = self.repositories.get_mut(name) {
                records.pop();
            }
            return Err(e);
        }

        debug!("appended record to repository '{}'", name);
        Ok(())
    }

    /// Writes the whole store to its backing file.
    ///
    /// The document goes to a temporary file in the same directory which then
    /// replaces the backing file in a single rename, so readers never see a
    /// partially written store. A symlinked backing file is resolved first so
    /// the link survives and its target receives the write. The permissions of
    /// an existing file are carried over to the new one.
    pub fn persist(&self) -> Result<(), StoreError> {
        let target = match fs::canonicalize(&self.path) {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.path.clone(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let json =
            serde_json::to_vec_pretty(&self.repositories).map_err(StoreError::Serialize)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        if let Ok(meta) = fs::metadata(&target) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;

        debug!("persisted store to {}", target.display());
        Ok(())
    }
}

/// Resolves the default store location and creates its directory.
///
/// The base is `$XDG_DATA_HOME/refm` when the variable is set and non-empty,
/// otherwise `~/.local/share/refm`.
pub fn default_store_path() -> Result<PathBuf, StoreError> {
    let base = data_dir_from(env::var_os("XDG_DATA_HOME"), dirs::home_dir())?;
    fs::create_dir_all(&base)?;
    Ok(base.join(STORE_FILE_NAME))
}

fn data_dir_from(
    xdg_data_home: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf, StoreError> {
    match xdg_data_home.filter(|value| !value.is_empty()) {
        Some(xdg) => Ok(PathBuf::from(xdg).join(APP_DIR_NAME)),
        None => home
            .map(|home| home.join(".local").join("share").join(APP_DIR_NAME))
            .ok_or(StoreError::NoDataDir),
    }
}
