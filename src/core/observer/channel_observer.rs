//=========================================================================
// Channel Observer
//=========================================================================
//
// Forwards hub notifications to another thread.
//
// Architecture:
//   StateHub ─on_*()─> ChannelObserver ─try_send(HubEvent)─> PresentationFeed
//   (game thread)                                              (UI thread)
//
// Sending never blocks the game loop. A full or closed channel is an
// observer failure, which the hub logs and isolates.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, unbounded, Sender, TrySendError};

//=== Internal Dependencies ===============================================

use super::{ObserverError, ObserverResult, PresentationFeed, StateObserver};
use crate::core::hub::{GameState, TextCategory};

//=== HubEvent ============================================================

/// One hub notification, as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    StateChanged(GameState),
    BallInPlungerChanged(bool),
    HighScorePresented(u64),
    StringPresented { text: String, category: TextCategory },
    TextCleared(TextCategory),
    ScorePosted(u64),
    BallCountUpdated(u32),
    CheatsUsed,
}

impl HubEvent {
    /// Calls the handler on `observer` that matches this event.
    pub fn deliver(&self, observer: &mut dyn StateObserver) -> ObserverResult {
        match self {
            HubEvent::StateChanged(state) => observer.on_state_changed(*state),
            HubEvent::BallInPlungerChanged(in_plunger) => {
                observer.on_ball_in_plunger_changed(*in_plunger)
            }
            HubEvent::HighScorePresented(score) => observer.on_high_score_presented(*score),
            HubEvent::StringPresented { text, category } => {
                observer.on_string_presented(text, *category)
            }
            HubEvent::TextCleared(category) => observer.on_clear_text(*category),
            HubEvent::ScorePosted(score) => observer.on_score_posted(*score),
            HubEvent::BallCountUpdated(count) => observer.on_ball_count_updated(*count),
            HubEvent::CheatsUsed => observer.on_cheats_used(),
        }
    }
}

//=== ChannelObserver =====================================================

/// [`StateObserver`] that turns every notification into a [`HubEvent`].
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use pinball_hub::prelude::*;
///
/// let hub = StateHub::new();
/// let (observer, mut feed) = ChannelObserver::bounded(64);
/// let observer = Rc::new(RefCell::new(observer));
/// hub.register(&observer);
///
/// hub.post_score(2_500);
///
/// // On the presentation thread
/// feed.collect_frame();
/// assert_eq!(feed.events(), &[HubEvent::ScorePosted(2_500)]);
/// ```
pub struct ChannelObserver {
    sender: Sender<HubEvent>,
}

impl ChannelObserver {
    /// Creates an observer and its feed over a channel holding at most
    /// `capacity` undelivered events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn bounded(capacity: usize) -> (Self, PresentationFeed) {
        assert!(capacity > 0, "Channel capacity must be positive");
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, PresentationFeed::new(receiver))
    }

    /// Creates an observer and its feed over an unbounded channel.
    pub fn unbounded() -> (Self, PresentationFeed) {
        let (sender, receiver) = unbounded();
        (Self { sender }, PresentationFeed::new(receiver))
    }

    fn forward(&self, event: HubEvent) -> ObserverResult {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => ObserverError::Backlogged,
            TrySendError::Disconnected(_) => ObserverError::Disconnected,
        })
    }
}

impl StateObserver for ChannelObserver {
    fn on_state_changed(&mut self, state: GameState) -> ObserverResult {
        self.forward(HubEvent::StateChanged(state))
    }

    fn on_ball_in_plunger_changed(&mut self, in_plunger: bool) -> ObserverResult {
        self.forward(HubEvent::BallInPlungerChanged(in_plunger))
    }

    fn on_high_score_presented(&mut self, score: u64) -> ObserverResult {
        self.forward(HubEvent::HighScorePresented(score))
    }

    fn on_string_presented(&mut self, text: &str, category: TextCategory) -> ObserverResult {
        self.forward(HubEvent::StringPresented {
            text: text.to_string(),
            category,
        })
    }

    fn on_clear_text(&mut self, category: TextCategory) -> ObserverResult {
        self.forward(HubEvent::TextCleared(category))
    }

    fn on_score_posted(&mut self, score: u64) -> ObserverResult {
        self.forward(HubEvent::ScorePosted(score))
    }

    fn on_ball_count_updated(&mut self, count: u32) -> ObserverResult {
        self.forward(HubEvent::BallCountUpdated(count))
    }

    fn on_cheats_used(&mut self) -> ObserverResult {
        self.forward(HubEvent::CheatsUsed)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
