//=========================================================================
// File Backend
//=========================================================================
//
// Score backend persisted as a JSON document.
//
// Layout:
//   { "namespaces": { "<namespace>": { "<key>": <u64>, ... }, ... } }
//
// The document is loaded once on open and kept in memory. Every `set`
// rewrites the whole file through a temp file in the same directory
// followed by a rename, so a crash never leaves a half-written store.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

//=== Internal Dependencies ===============================================

use super::{PersistenceError, ScoreBackend};

//=== ScoreDocument =======================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ScoreDocument {
    #[serde(default)]
    namespaces: BTreeMap<String, BTreeMap<String, u64>>,
}

//=== FileBackend =========================================================

/// [`ScoreBackend`] stored in a JSON file that survives restarts.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    document: ScoreDocument,
}

impl FileBackend {
    //--- Construction -----------------------------------------------------

    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store; it is created on the first write.
    /// An unreadable or malformed file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();

        let document = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| PersistenceError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No score store at {}, starting empty", path.display());
                ScoreDocument::default()
            }
            Err(source) => return Err(PersistenceError::Io { path, source }),
        };

        info!("Opened score store at {}", path.display());
        Ok(Self { path, document })
    }

    /// Returns the file this store writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    //--- Internal Helpers -------------------------------------------------

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let bytes = serde_json::to_vec_pretty(&self.document)?;
        let mut file = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        file.write_all(&bytes).map_err(|e| self.io_error(e))?;
        file.flush().map_err(|e| self.io_error(e))?;
        file.as_file().sync_all().map_err(|e| self.io_error(e))?;
        file.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

impl ScoreBackend for FileBackend {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<u64>, PersistenceError> {
        Ok(self
            .document
            .namespaces
            .get(namespace)
            .and_then(|values| values.get(key))
            .copied())
    }

    fn set(&mut self, namespace: &str, key: &str, value: u64) -> Result<(), PersistenceError> {
        let previous = self
            .document
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);

        if let Err(e) = self.flush() {
            // Keep memory in step with what is on disk
            let values = self.document.namespaces.entry(namespace.to_string()).or_default();
            match previous {
                Some(old) => {
                    values.insert(key.to_string(), old);
                }
                None => {
                    values.remove(key);
                    if values.is_empty() {
                        self.document.namespaces.remove(namespace);
                    }
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("scores.json")).unwrap();

        assert_eq!(backend.get("default", "highscore").unwrap(), None);
        assert!(!backend.path().exists());
    }

    #[test]
    fn values_survive_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.set("default", "highscore", 42_000).unwrap();
        backend.set("full-tilt", "highscore", 7).unwrap();
        drop(backend);

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(reopened.get("default", "highscore").unwrap(), Some(42_000));
        assert_eq!(reopened.get("full-tilt", "highscore").unwrap(), Some(7));
    }

    #[test]
    fn first_write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("scores.json");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.set("default", "highscore", 1).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn written_file_is_a_score_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.set("default", "highscore", 123).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["namespaces"]["default"]["highscore"], 123);
    }

    #[test]
    fn document_without_namespaces_opens_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{}").unwrap();

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.get("default", "highscore").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "not json").unwrap();

        let result = FileBackend::open(&path);
        assert!(matches!(result, Err(PersistenceError::Corrupt { .. })));
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        let mut backend = FileBackend::open(blocker.join("scores.json")).unwrap();

        // Parent "directory" becomes a regular file, so every flush fails
        fs::write(&blocker, "a file, not a directory").unwrap();
        let result = backend.set("default", "highscore", 500);

        assert!(matches!(result, Err(PersistenceError::Io { .. })));
        assert_eq!(backend.get("default", "highscore").unwrap(), None);
    }

    #[test]
    fn failed_replace_is_reported_as_io() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let mut backend = FileBackend::open(&path).unwrap();
        backend.set("default", "highscore", 10).unwrap();

        // The temp file is written, but cannot be renamed over a directory
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        let result = backend.set("default", "highscore", 20);

        match result {
            Err(PersistenceError::Io { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected an Io error, got {:?}", other),
        }
        assert_eq!(backend.get("default", "highscore").unwrap(), Some(10));
    }
}
