//! Flat-file storage for website records and application state
//!
//! The record store is a single pretty-printed JSON array on disk. Every
//! mutation is a full read-modify-write of that file, serialized through one
//! async mutex so concurrent requests cannot lose each other's updates.
//! Writes go to a sibling temporary file that is then renamed into place,
//! so readers never observe a half-written file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::error::StoreError;
use crate::model::Website;
use crate::verifier::{HttpVerifier, Verifier};

/// Reads a JSON file, creating it with `T::default()` if it does not exist
///
/// A file that exists but cannot be parsed is reported as
/// [`StoreError::Parse`] and left untouched.
pub(crate) async fn read_json_or_init<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Serialize + Default,
{
    match fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let empty = T::default();
            write_json(path, &empty).await?;
            Ok(empty)
        }
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Atomically replaces the contents of a JSON file
pub(crate) async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let write_err = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let content = serde_json::to_string_pretty(value)
        .map_err(|e| write_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, content).await.map_err(write_err)?;
    if let Err(source) = fs::rename(&tmp_path, path).await {
        if let Err(err) = fs::remove_file(&tmp_path).await {
            warn!(path = %tmp_path.display(), error = %err, "failed to remove temporary file");
        }
        return Err(write_err(source));
    }
    Ok(())
}

/// Handle to the website record file
pub struct RecordStore {
    path: PathBuf,
    /// Held for the whole read-modify-write cycle of a mutation
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all records in stored order
    ///
    /// An absent file is created empty. Reads of an existing file do not take
    /// the write lock since writes replace the file atomically.
    pub async fn list(&self) -> Result<Vec<Website>, StoreError> {
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            return read_json_or_init(&self.path).await;
        }

        let _guard = self.write_lock.lock().await;
        read_json_or_init(&self.path).await
    }

    /// Applies `f` to the stored list under the write lock
    ///
    /// The list is written back only if `f` returns `Ok`; on error the file
    /// is left as it was.
    pub async fn mutate<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Vec<Website>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().await;

        let mut websites: Vec<Website> = read_json_or_init(&self.path).await?;
        let result = f(&mut websites)?;
        write_json(&self.path, &websites).await?;

        Ok(result)
    }
}

/// Application state shared across all request handlers
///
/// Every collaborator is injected here, so tests can swap in temporary files
/// and a fake reachability verifier.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub websites: Arc<RecordStore>,
    pub users: Arc<CredentialStore>,
    pub verifier: Arc<dyn Verifier>,
}

impl AppState {
    /// Builds the state with the HTTP reachability verifier
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let verifier = HttpVerifier::new(config.verify_timeout)?;
        Ok(Self::with_verifier(config, Arc::new(verifier)))
    }

    pub fn with_verifier(config: Config, verifier: Arc<dyn Verifier>) -> Self {
        Self {
            websites: Arc::new(RecordStore::new(config.websites_path.clone())),
            users: Arc::new(CredentialStore::new(config.users_path.clone())),
            config: Arc::new(config),
            verifier,
        }
    }
}
