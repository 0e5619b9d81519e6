//=========================================================================
// Memory Backend
//=========================================================================
//
// Process-local score backend. Nothing survives a restart; used for tests
// and for tables that keep no records.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::{PersistenceError, ScoreBackend};

//=== MemoryBackend =======================================================

/// In-memory [`ScoreBackend`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    namespaces: HashMap<String, HashMap<String, u64>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreBackend for MemoryBackend {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<u64>, PersistenceError> {
        Ok(self
            .namespaces
            .get(namespace)
            .and_then(|values| values.get(key))
            .copied())
    }

    fn set(&mut self, namespace: &str, key: &str, value: u64) -> Result<(), PersistenceError> {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_empty_backend_is_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("default", "highscore").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut backend = MemoryBackend::new();
        backend.set("default", "highscore", 10).unwrap();
        backend.set("default", "highscore", 5).unwrap();

        assert_eq!(backend.get("default", "highscore").unwrap(), Some(5));
        assert_eq!(backend.get("other", "highscore").unwrap(), None);
    }
}
