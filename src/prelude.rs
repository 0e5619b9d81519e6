//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use pinball_hub::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Hub
pub use crate::core::hub::{
    Delivery, GameState, ObserverHandle, StateHub, TextCategory, UNKNOWN_HIGH_SCORE,
};

// Observers
pub use crate::core::observer::{
    ChannelObserver, FeedControl, HubEvent, ObserverError, ObserverResult, PresentationFeed,
    ScoreKeeper, StateObserver,
};

// Persistence
pub use crate::core::persistence::{
    FileBackend, MemoryBackend, PersistenceError, ScoreBackend, ScorePersistence,
    ScoreStoreBuilder, DEFAULT_NAMESPACE,
};
