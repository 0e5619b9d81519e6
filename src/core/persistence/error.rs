//=========================================================================
// Persistence Errors
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::path::PathBuf;

use thiserror::Error;

//=== PersistenceError ====================================================

/// Score store failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed.
    #[error("score store at {} is unavailable: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file exists but does not hold a score document.
    #[error("score store at {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The score document could not be encoded.
    #[error("failed to encode score store: {0}")]
    Encode(#[from] serde_json::Error),

    /// No per-user data directory exists on this platform.
    #[error("no data directory available for the score store")]
    NoDataDir,

    /// A backend reported itself unavailable.
    #[error("score backend unavailable: {0}")]
    Unavailable(String),
}
