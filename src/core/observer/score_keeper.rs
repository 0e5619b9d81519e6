//=========================================================================
// Score Keeper
//=========================================================================
//
// Observer bridging the hub to a score store: presented high scores are
// recorded if they beat the stored one, and high-score queries are
// answered from the store.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;

//=== Internal Dependencies ===============================================

use super::{ObserverResult, StateObserver};
use crate::core::persistence::{ScoreBackend, ScorePersistence};

//=== ScoreKeeper =========================================================

/// [`StateObserver`] that persists high scores under one namespace.
///
/// Usually built with [`ScoreStoreBuilder`].
///
/// [`ScoreStoreBuilder`]: crate::core::persistence::ScoreStoreBuilder
pub struct ScoreKeeper<B: ScoreBackend> {
    persistence: ScorePersistence<B>,
    namespace: String,
}

impl<B: ScoreBackend> ScoreKeeper<B> {
    /// Keeps scores from `persistence` under `namespace`.
    pub fn new(persistence: ScorePersistence<B>, namespace: impl Into<String>) -> Self {
        Self {
            persistence,
            namespace: namespace.into(),
        }
    }

    /// Returns the namespace scores are kept under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the underlying store.
    pub fn persistence(&self) -> &ScorePersistence<B> {
        &self.persistence
    }
}

impl<B: ScoreBackend> StateObserver for ScoreKeeper<B> {
    fn on_high_score_presented(&mut self, score: u64) -> ObserverResult {
        if self.persistence.try_record_if_higher(&self.namespace, score)? {
            info!("New high score {} recorded for '{}'", score, self.namespace);
        }
        Ok(())
    }

    fn high_score(&mut self) -> Option<u64> {
        Some(self.persistence.read(&self.namespace))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::hub::{GameState, StateHub, UNKNOWN_HIGH_SCORE};
    use crate::core::observer::ObserverError;
    use crate::core::persistence::{
        FileBackend, MemoryBackend, PersistenceError, ScoreStoreBuilder, DEFAULT_NAMESPACE,
    };

    struct BrokenBackend;

    impl ScoreBackend for BrokenBackend {
        fn get(&self, _namespace: &str, _key: &str) -> Result<Option<u64>, PersistenceError> {
            Err(PersistenceError::Unavailable("disk gone".to_string()))
        }

        fn set(&mut self, _namespace: &str, _key: &str, _value: u64) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("disk gone".to_string()))
        }
    }

    fn memory_keeper() -> Rc<RefCell<ScoreKeeper<MemoryBackend>>> {
        Rc::new(RefCell::new(ScoreStoreBuilder::new().build_in_memory()))
    }

    #[test]
    fn fresh_store_answers_zero() {
        let hub = StateHub::new();
        let keeper = memory_keeper();
        hub.register(&keeper);

        assert_eq!(hub.query_high_score(), 0);
    }

    #[test]
    fn presented_scores_only_raise_the_record() {
        let hub = StateHub::new();
        let keeper = memory_keeper();
        hub.register(&keeper);

        hub.present_high_score(100);
        hub.present_high_score(50);
        assert_eq!(hub.query_high_score(), 100);

        hub.present_high_score(150);
        assert_eq!(hub.query_high_score(), 150);
        assert_eq!(keeper.borrow().persistence().read(DEFAULT_NAMESPACE), 150);
    }

    #[test]
    fn posted_scores_are_not_persisted() {
        let hub = StateHub::new();
        let keeper = memory_keeper();
        hub.register(&keeper);

        hub.set_state(GameState::IN_GAME);
        hub.post_score(80_000);
        hub.set_state(GameState::GAME_OVER);

        assert_eq!(hub.query_high_score(), 0);
    }

    #[test]
    fn unregistered_keeper_leaves_query_unknown() {
        let hub = StateHub::new();
        let keeper = memory_keeper();
        let handle = hub.register(&keeper);
        hub.present_high_score(10);

        hub.unregister(handle);
        assert_eq!(hub.query_high_score(), UNKNOWN_HIGH_SCORE);
    }

    #[test]
    fn broken_store_fails_the_notification_and_answers_zero() {
        let mut keeper = ScoreKeeper::new(ScorePersistence::new(BrokenBackend), DEFAULT_NAMESPACE);

        let result = keeper.on_high_score_presented(500);
        assert!(matches!(result, Err(ObserverError::Persistence(_))));
        assert_eq!(keeper.high_score(), Some(0));
    }

    #[test]
    fn record_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        {
            let hub = StateHub::new();
            let keeper = Rc::new(RefCell::new(
                ScoreStoreBuilder::new().with_path(&path).build().unwrap(),
            ));
            hub.register(&keeper);
            hub.present_high_score(31_337);
        }

        let hub = StateHub::new();
        let keeper: Rc<RefCell<ScoreKeeper<FileBackend>>> = Rc::new(RefCell::new(
            ScoreStoreBuilder::new().with_path(&path).build().unwrap(),
        ));
        hub.register(&keeper);
        assert_eq!(hub.query_high_score(), 31_337);
    }
}
