//=========================================================================
// Score Persistence
//=========================================================================
//
// Durable "keep the highest score seen" storage, one value per namespace.
//
// Architecture:
//   ScorePersistence<B>
//     └─ backend: B: ScoreBackend   (namespace, key) → u64
//
// Two API flavours:
//   read / record_if_higher          degrade to 0 / false on failure
//   try_read / try_record_if_higher  surface PersistenceError
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Module Declarations =================================================

mod builder;
mod error;
mod file_backend;
mod memory_backend;

//=== Public API ==========================================================

pub use builder::{default_store_path, ScoreStoreBuilder};
pub use error::PersistenceError;
pub use file_backend::FileBackend;
pub use memory_backend::MemoryBackend;

/// Namespace used when the caller does not pick one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Key of the high score inside a namespace.
pub const HIGH_SCORE_KEY: &str = "highscore";

//=== ScoreBackend Trait ==================================================

/// Namespaced integer key-value store.
///
/// Implementations decide durability; [`FileBackend`] survives restarts,
/// [`MemoryBackend`] does not.
pub trait ScoreBackend {
    /// Returns the value under `key` in `namespace`, or `None` if unset.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<u64>, PersistenceError>;

    /// Stores `value` under `key` in `namespace`.
    fn set(&mut self, namespace: &str, key: &str, value: u64) -> Result<(), PersistenceError>;
}

//=== ScorePersistence ====================================================

/// Monotonic high-score store over a [`ScoreBackend`].
///
/// The stored value for a namespace only ever grows.
///
/// # Examples
///
/// ```rust
/// use pinball_hub::prelude::*;
///
/// let mut scores = ScorePersistence::new(MemoryBackend::new());
///
/// assert!(scores.record_if_higher(DEFAULT_NAMESPACE, 100));
/// assert!(!scores.record_if_higher(DEFAULT_NAMESPACE, 50));
/// assert_eq!(scores.read(DEFAULT_NAMESPACE), 100);
/// ```
pub struct ScorePersistence<B: ScoreBackend> {
    backend: B,
}

impl<B: ScoreBackend> ScorePersistence<B> {
    /// Wraps `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the store and returns the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    //--- Explicit API -----------------------------------------------------

    /// Returns the stored high score, 0 if none was ever recorded.
    pub fn try_read(&self, namespace: &str) -> Result<u64, PersistenceError> {
        Ok(self.backend.get(namespace, HIGH_SCORE_KEY)?.unwrap_or(0))
    }

    /// Stores `candidate` if it beats the stored high score.
    ///
    /// Returns `Ok(true)` if a new record was written.
    pub fn try_record_if_higher(
        &mut self,
        namespace: &str,
        candidate: u64,
    ) -> Result<bool, PersistenceError> {
        let stored = self.try_read(namespace)?;
        if candidate <= stored {
            return Ok(false);
        }

        self.backend.set(namespace, HIGH_SCORE_KEY, candidate)?;
        debug!("High score for '{}' raised from {} to {}", namespace, stored, candidate);
        Ok(true)
    }

    //--- Lenient API ------------------------------------------------------

    /// Like [`ScorePersistence::try_read`], reporting 0 when the store is
    /// unavailable.
    pub fn read(&self, namespace: &str) -> u64 {
        self.try_read(namespace).unwrap_or_else(|e| {
            warn!("Reading high score for '{}' failed, using 0: {}", namespace, e);
            0
        })
    }

    /// Like [`ScorePersistence::try_record_if_higher`], reporting false
    /// when the store is unavailable.
    ///
    /// A failed read never falls through to a write, so an unreadable store
    /// cannot be overwritten with a lower score.
    pub fn record_if_higher(&mut self, namespace: &str, candidate: u64) -> bool {
        self.try_record_if_higher(namespace, candidate)
            .unwrap_or_else(|e| {
                warn!("Recording high score {} for '{}' failed: {}", candidate, namespace, e);
                false
            })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
