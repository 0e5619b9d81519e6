//=========================================================================
// Observer Contract
//=========================================================================
//
// The capability set a collaborator implements to receive broadcasts
// from the StateHub.
//
// Architecture:
//   StateHub ── on_*() ──> StateObserver (N, registration order)
//            ── high_score() ──> first observer that answers
//
// Stock observers:
//   ScoreKeeper      answers high-score queries from a score store
//   ChannelObserver  forwards every event to another thread
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::hub::{GameState, TextCategory};
use crate::core::persistence::PersistenceError;

//=== Module Declarations =================================================

mod channel_observer;
mod presentation_feed;
mod score_keeper;

//=== Public API ==========================================================

pub use channel_observer::{ChannelObserver, HubEvent};
pub use presentation_feed::{FeedControl, PresentationFeed};
pub use score_keeper::ScoreKeeper;

//=== ObserverError =======================================================

/// Failure reported by an observer while handling a notification.
///
/// The hub logs these and moves on to the next observer; they never reach
/// the caller of the mutator.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// The observer's score store could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The presentation channel is full.
    #[error("presentation channel is full, event dropped")]
    Backlogged,

    /// The receiving side of the presentation channel is gone.
    #[error("presentation channel disconnected")]
    Disconnected,

    /// Any other observer-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Result type returned by every notification handler.
pub type ObserverResult = Result<(), ObserverError>;

//=== StateObserver Trait =================================================

/// Receives game-state and presentation broadcasts from a [`StateHub`].
///
/// Every handler has a no-op default, so an observer implements only the
/// capabilities it cares about.
///
/// # Minimal Implementation
///
/// ```rust
/// # use pinball_hub::prelude::*;
/// struct PlungerLight {
///     lit: bool,
/// }
///
/// impl StateObserver for PlungerLight {
///     fn on_ball_in_plunger_changed(&mut self, in_plunger: bool) -> ObserverResult {
///         self.lit = in_plunger;
///         Ok(())
///     }
/// }
/// ```
///
/// [`StateHub`]: crate::core::hub::StateHub
pub trait StateObserver {
    /// The game phase was replaced.
    fn on_state_changed(&mut self, _state: GameState) -> ObserverResult {
        Ok(())
    }

    /// A ball entered or left the plunger lane.
    fn on_ball_in_plunger_changed(&mut self, _in_plunger: bool) -> ObserverResult {
        Ok(())
    }

    /// A finished game's score qualified as a high score.
    fn on_high_score_presented(&mut self, _score: u64) -> ObserverResult {
        Ok(())
    }

    /// Answers a high-score query.
    ///
    /// Return `None` when this observer has no score to offer; the hub then
    /// asks the next observer.
    fn high_score(&mut self) -> Option<u64> {
        None
    }

    /// Text should be shown in the overlay identified by `category`.
    fn on_string_presented(&mut self, _text: &str, _category: TextCategory) -> ObserverResult {
        Ok(())
    }

    /// The overlay identified by `category` should be cleared.
    fn on_clear_text(&mut self, _category: TextCategory) -> ObserverResult {
        Ok(())
    }

    /// The current player's score changed.
    fn on_score_posted(&mut self, _score: u64) -> ObserverResult {
        Ok(())
    }

    /// The remaining ball count changed.
    fn on_ball_count_updated(&mut self, _count: u32) -> ObserverResult {
        Ok(())
    }

    /// A cheat code was entered during this game.
    fn on_cheats_used(&mut self) -> ObserverResult {
        Ok(())
    }
}
