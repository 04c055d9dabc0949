use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use taskhub_core::session::{KeyValueStore, StorageError};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Session keys kept in a small JSON object on disk.
///
/// Every change rewrites the whole file through a temp file in the same
/// directory, so a crash never leaves half a session behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    #[tracing::instrument]
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let entries = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read session file {}", path.display()))?;
            match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(path = %path.display(), %error, "session file unreadable; starting signed out");
                    BTreeMap::new()
                }
            }
        } else {
            debug!(path = %path.display(), "no session file yet");
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, &self.entries)?;
        writeln!(temp)?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|err| {
            StorageError::Write(format!("failed to persist {}: {}", self.path.display(), err))
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// `<data dir>/taskhub/session.json`.
pub fn default_session_path() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_dir().ok_or_else(|| anyhow!("cannot determine data directory"))?;
    Ok(dir.join("taskhub").join("session.json"))
}
