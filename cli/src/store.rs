use minesweep_core::{GameError, KeyValueStore, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key-value store kept as one JSON object in a file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> GameError {
    GameError::Storage(format!("{}: {}", path.display(), err))
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file or one that is not a JSON object of strings is an empty store, the next
    /// write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable store {}: {}", path.display(), err);
                BTreeMap::new()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(storage_error(&path, err)),
        };
        log::debug!("Opened store {} with {} keys", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let text =
            serde_json::to_string_pretty(&self.entries).map_err(|err| storage_error(&self.path, err))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(|err| storage_error(&tmp, err))?;
        fs::rename(&tmp, &self.path).map_err(|err| storage_error(&self.path, err))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
