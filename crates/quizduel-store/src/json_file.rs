//! Atomic JSON document files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use quizduel_core::error::DomainError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

/// A JSON document on disk, replaced as a whole on every write.
///
/// Writes go to a sibling `*.json.tmp` file which is flushed and then
/// renamed over the live file, so readers only ever see a complete
/// document.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Creates a handle for the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the live document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the staging file used while writing.
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Reads the document. A missing file yields `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the file cannot be read or
    /// does not parse.
    pub async fn load<T>(&self) -> Result<T, DomainError>
    where
        T: DeserializeOwned + Default,
    {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                return Err(DomainError::Infrastructure(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::Infrastructure(format!("corrupt document {}: {e}", self.path.display()))
        })
    }

    /// Atomically replaces the document with `value`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization or any file
    /// operation fails; the live file is then left as it was.
    pub async fn store<T>(&self, value: &T) -> Result<(), DomainError>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| DomainError::Infrastructure(format!("failed to encode document: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error("create directory for", &e))?;
        }

        let staging = self.staging_path();
        let mut file = tokio::fs::File::create(&staging)
            .await
            .map_err(|e| self.io_error("create staging file for", &e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| self.io_error("write", &e))?;
        file.sync_all()
            .await
            .map_err(|e| self.io_error("flush", &e))?;
        drop(file);

        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.io_error("replace", &e))
    }

    fn io_error(&self, action: &str, e: &std::io::Error) -> DomainError {
        DomainError::Infrastructure(format!("failed to {action} {}: {e}", self.path.display()))
    }
}
