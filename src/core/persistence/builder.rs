//=========================================================================
// Score Store Builder
//=========================================================================
//
// Configuration for the persistent high-score observer.
//
// Architecture:
// ```text
//     ScoreStoreBuilder  ──build()──>  ScoreKeeper<FileBackend>
//         │
//         ├─ with_path()        default: <data dir>/pinball_hub/scores.json
//         └─ with_namespace()   default: "default"
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use log::info;

//=== Internal Dependencies ===============================================

use super::{FileBackend, MemoryBackend, PersistenceError, ScorePersistence, DEFAULT_NAMESPACE};
use crate::core::observer::ScoreKeeper;

//=== Default Location ====================================================

const STORE_DIR: &str = "pinball_hub";
const STORE_FILE: &str = "scores.json";

/// Returns the per-user score file location, if the platform has one.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(STORE_DIR).join(STORE_FILE))
}

//=== ScoreStoreBuilder ===================================================

/// Builder for configuring and constructing a persistent [`ScoreKeeper`].
///
/// # Default Values
///
/// - **Path**: [`default_store_path`]
/// - **Namespace**: [`DEFAULT_NAMESPACE`]
///
/// # Examples
///
/// ```no_run
/// use pinball_hub::prelude::*;
///
/// let keeper = ScoreStoreBuilder::new()
///     .with_path("/tmp/pinball/scores.json")
///     .with_namespace("full-tilt")
///     .build()?;
/// # Ok::<(), PersistenceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ScoreStoreBuilder {
    path: Option<PathBuf>,
    namespace: String,
}

impl ScoreStoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            path: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Sets the file the scores are stored in.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the namespace the high score is kept under.
    ///
    /// # Panics
    ///
    /// Panics if `namespace` is empty.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        assert!(!namespace.is_empty(), "Score namespace must not be empty");
        self.namespace = namespace;
        self
    }

    /// Opens the configured store.
    ///
    /// Fails with [`PersistenceError::NoDataDir`] if no path was set and
    /// the platform has no data directory.
    pub fn build(self) -> Result<ScoreKeeper<FileBackend>, PersistenceError> {
        let path = match self.path {
            Some(path) => path,
            None => default_store_path().ok_or(PersistenceError::NoDataDir)?,
        };

        info!("Building score keeper (namespace: '{}', store: {})", self.namespace, path.display());
        let backend = FileBackend::open(path)?;
        Ok(ScoreKeeper::new(ScorePersistence::new(backend), self.namespace))
    }

    /// Builds a keeper whose scores live only as long as the process.
    pub fn build_in_memory(self) -> ScoreKeeper<MemoryBackend> {
        ScoreKeeper::new(ScorePersistence::new(MemoryBackend::new()), self.namespace)
    }
}

impl Default for ScoreStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
