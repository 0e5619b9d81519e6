//=========================================================================
// State Hub
//=========================================================================
//
// Owns the transient game state and fans out every change to the
// registered observers, synchronously and in registration order.
//
// Fan-out policy:
//   1. Snapshot the registry at call start
//   2. Skip entries unregistered or dropped since the snapshot
//   3. Invoke each remaining observer, isolating errors and panics
//   4. Prune observers found dropped
//
// Re-entrancy: an observer may call back into the hub. The nested call
// takes its own snapshot. Observers already inside a handler cannot be
// borrowed again, so their copy of the nested event is deferred and
// delivered as soon as the outer handler returns.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::registry::{ObserverRef, ObserverRegistry};
use super::{Delivery, GameState, ObserverHandle, TextCategory};
use crate::core::observer::{HubEvent, ObserverResult, StateObserver};

//=== Constants ===========================================================

/// Returned by [`StateHub::query_high_score`] when no observer answers.
pub const UNKNOWN_HIGH_SCORE: i64 = -1;

//=== Invocation ==========================================================

enum Invocation<R> {
    Completed(R),
    Busy,
    Panicked(String),
}

//=== Deferred ============================================================

/// Nested notification waiting for a busy observer.
struct Deferred {
    handle: ObserverHandle,
    observer: ObserverRef,
    event: HubEvent,
}

//=== StateHub ============================================================

/// Broadcast hub between the table simulation and its observers.
///
/// The hub is an explicitly constructed context object: create one per
/// game instance and pass it to whatever needs it. It is single-threaded
/// (`!Send`); use a [`ChannelObserver`] to reach other threads.
///
/// Observers are held by `Weak` reference. The hub never keeps an
/// observer alive, and an observer dropped without unregistering is
/// skipped and pruned instead of invoked.
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use pinball_hub::prelude::*;
///
/// #[derive(Default)]
/// struct BallCounter {
///     balls: u32,
/// }
///
/// impl StateObserver for BallCounter {
///     fn on_ball_count_updated(&mut self, count: u32) -> ObserverResult {
///         self.balls = count;
///         Ok(())
///     }
/// }
///
/// let hub = StateHub::new();
/// let counter = Rc::new(RefCell::new(BallCounter::default()));
/// let handle = hub.register(&counter);
///
/// hub.post_ball_count(3);
/// assert_eq!(counter.borrow().balls, 3);
///
/// hub.unregister(handle);
/// hub.post_ball_count(2);
/// assert_eq!(counter.borrow().balls, 3);
/// ```
///
/// [`ChannelObserver`]: crate::core::observer::ChannelObserver
pub struct StateHub {
    state: Cell<GameState>,
    ball_in_plunger: Cell<bool>,
    registry: RefCell<ObserverRegistry>,
    score_authority: Cell<Option<ObserverHandle>>,
    deferred: RefCell<Vec<Deferred>>,
}

impl StateHub {
    //--- Construction -----------------------------------------------------

    /// Creates a hub with no observers, the default phase and an empty
    /// plunger lane.
    pub fn new() -> Self {
        Self {
            state: Cell::new(GameState::default()),
            ball_in_plunger: Cell::new(false),
            registry: RefCell::new(ObserverRegistry::new()),
            score_authority: Cell::new(None),
            deferred: RefCell::new(Vec::new()),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Appends `observer` to the notification order.
    ///
    /// Registering the same observer twice is allowed; it then receives
    /// every notification twice.
    pub fn register<O>(&self, observer: &Rc<RefCell<O>>) -> ObserverHandle
    where
        O: StateObserver + 'static,
    {
        let weak = Rc::downgrade(observer);
        let weak: ObserverRef = weak;
        self.insert(weak)
    }

    /// Same as [`StateHub::register`] for an already type-erased observer.
    pub fn register_dyn(&self, observer: &Rc<RefCell<dyn StateObserver>>) -> ObserverHandle {
        self.insert(Rc::downgrade(observer))
    }

    /// Removes the registration behind `handle`.
    ///
    /// Returns false, and does nothing else, if the handle is stale.
    /// Handles are only meaningful to the hub that issued them.
    pub fn unregister(&self, handle: ObserverHandle) -> bool {
        let removed = self.registry.borrow_mut().remove(handle);
        if removed {
            debug!("Unregistered observer {:?}", handle);
            self.forget_authority(handle);
        } else {
            debug!("Observer {:?} not registered, skipping removal", handle);
        }
        removed
    }

    /// Removes the earliest registration of `observer`.
    ///
    /// Other registrations of the same observer stay in place.
    pub fn unregister_observer<O: ?Sized>(&self, observer: &Rc<RefCell<O>>) -> bool {
        let found = self.registry.borrow().find_first(Rc::as_ptr(observer));
        match found {
            Some(handle) => self.unregister(handle),
            None => false,
        }
    }

    /// Returns the number of live registrations.
    ///
    /// Observers dropped without unregistering are pruned first.
    pub fn observer_count(&self) -> usize {
        self.prune_dropped();
        self.registry.borrow().len()
    }

    //--- Score Authority --------------------------------------------------

    /// Designates the observer behind `handle` as the one asked first for
    /// the high score.
    ///
    /// Returns false if `handle` is not registered.
    pub fn set_score_authority(&self, handle: ObserverHandle) -> bool {
        if !self.registry.borrow().contains(handle) {
            warn!("Cannot make unregistered observer {:?} the score authority", handle);
            return false;
        }
        if let Some(previous) = self.score_authority.replace(Some(handle)) {
            if previous != handle {
                debug!("Score authority moved from {:?} to {:?}", previous, handle);
            }
        }
        true
    }

    /// Removes the score authority designation.
    pub fn clear_score_authority(&self) {
        self.score_authority.set(None);
    }

    /// Returns the designated score authority, if any.
    pub fn score_authority(&self) -> Option<ObserverHandle> {
        self.score_authority.get()
    }

    //--- State ------------------------------------------------------------

    /// Returns the last phase set.
    pub fn state(&self) -> GameState {
        self.state.get()
    }

    /// Returns whether a ball rests in the plunger lane.
    pub fn is_ball_in_plunger(&self) -> bool {
        self.ball_in_plunger.get()
    }

    /// Replaces the game phase, then notifies every observer.
    pub fn set_state(&self, state: GameState) -> Delivery {
        self.state.set(state);
        debug!("set_state: {:?}", state);
        self.fan_out(HubEvent::StateChanged(state))
    }

    /// Replaces the plunger lane status, then notifies every observer.
    pub fn set_ball_in_plunger(&self, in_plunger: bool) -> Delivery {
        self.ball_in_plunger.set(in_plunger);
        debug!("set_ball_in_plunger: {}", in_plunger);
        self.fan_out(HubEvent::BallInPlungerChanged(in_plunger))
    }

    //--- Presentation -----------------------------------------------------

    /// Broadcasts the current player's score.
    pub fn post_score(&self, score: u64) -> Delivery {
        self.fan_out(HubEvent::ScorePosted(score))
    }

    /// Broadcasts the remaining ball count.
    pub fn post_ball_count(&self, count: u32) -> Delivery {
        self.fan_out(HubEvent::BallCountUpdated(count))
    }

    /// Broadcasts that a cheat was used during this game.
    pub fn cheats_used(&self) -> Delivery {
        self.fan_out(HubEvent::CheatsUsed)
    }

    /// Broadcasts text for the overlay identified by `category`.
    pub fn print_string(&self, text: &str, category: TextCategory) -> Delivery {
        self.fan_out(HubEvent::StringPresented {
            text: text.to_string(),
            category,
        })
    }

    /// Broadcasts that the overlay identified by `category` should clear.
    pub fn clear_text(&self, category: TextCategory) -> Delivery {
        self.fan_out(HubEvent::TextCleared(category))
    }

    //--- High Score -------------------------------------------------------

    /// Broadcasts that `score` reached high-score status.
    ///
    /// The hub stores nothing; recording the score is an observer's job.
    pub fn present_high_score(&self, score: u64) -> Delivery {
        self.fan_out(HubEvent::HighScorePresented(score))
    }

    /// Asks for the high score and returns the first answer.
    ///
    /// The score authority, if set, is asked first. Otherwise observers
    /// are asked in registration order and the first `Some` wins; later
    /// observers are not consulted.
    pub fn high_score(&self) -> Option<u64> {
        if let Some(score) = self.ask_authority() {
            return Some(score);
        }

        let authority = self.score_authority.get();
        let snapshot = self.registry.borrow().snapshot();
        let mut answer = None;
        let mut saw_dropped = false;

        for (handle, observer) in snapshot {
            if Some(handle) == authority || !self.registry.borrow().contains(handle) {
                continue;
            }
            let Some(observer) = observer.upgrade() else {
                saw_dropped = true;
                continue;
            };
            match invoke(&observer, |o| o.high_score()) {
                Invocation::Completed(Some(score)) => {
                    answer = Some(score);
                }
                Invocation::Completed(None) => {}
                Invocation::Busy => {
                    warn!("Observer {:?} is busy, skipping high score query", handle);
                    continue;
                }
                Invocation::Panicked(message) => {
                    error!("Observer {:?} panicked answering high score: {}", handle, message);
                }
            }
            self.flush_deferred();
            if answer.is_some() {
                break;
            }
        }

        if saw_dropped {
            self.prune_dropped();
        }
        answer
    }

    /// Like [`StateHub::high_score`], with [`UNKNOWN_HIGH_SCORE`] standing
    /// in for "no answer".
    pub fn query_high_score(&self) -> i64 {
        self.high_score()
            .map_or(UNKNOWN_HIGH_SCORE, |score| i64::try_from(score).unwrap_or(i64::MAX))
    }

    //--- Internal Helpers -------------------------------------------------

    fn insert(&self, observer: ObserverRef) -> ObserverHandle {
        let handle = self.registry.borrow_mut().insert(observer);
        debug!("Registered observer {:?}", handle);
        handle
    }

    fn forget_authority(&self, handle: ObserverHandle) {
        if self.score_authority.get() == Some(handle) {
            debug!("Score authority {:?} unregistered", handle);
            self.score_authority.set(None);
        }
    }

    fn ask_authority(&self) -> Option<u64> {
        let handle = self.score_authority.get()?;
        let observer = self.registry.borrow().get(handle).and_then(Weak::upgrade);

        let Some(observer) = observer else {
            debug!("Score authority {:?} is gone, falling back to first responder", handle);
            self.score_authority.set(None);
            return None;
        };

        let answer = match invoke(&observer, |o| o.high_score()) {
            Invocation::Completed(answer) => answer,
            Invocation::Busy => {
                warn!("Score authority {:?} is busy, falling back to first responder", handle);
                return None;
            }
            Invocation::Panicked(message) => {
                error!("Score authority {:?} panicked answering high score: {}", handle, message);
                None
            }
        };
        self.flush_deferred();
        answer
    }

    fn prune_dropped(&self) {
        let pruned = self.registry.borrow_mut().prune_dropped();
        if pruned > 0 {
            debug!("Pruned {} dropped observer(s)", pruned);
        }
    }

    fn fan_out(&self, event: HubEvent) -> Delivery {
        self.flush_deferred();

        let snapshot = self.registry.borrow().snapshot();
        let mut delivery = Delivery::default();
        let mut saw_dropped = false;

        for (handle, weak) in snapshot {
            if !self.registry.borrow().contains(handle) {
                debug!("Observer {:?} unregistered during {:?} fan-out", handle, event);
                delivery.skipped += 1;
                continue;
            }
            let Some(observer) = weak.upgrade() else {
                saw_dropped = true;
                delivery.skipped += 1;
                continue;
            };

            match invoke(&observer, |o| event.deliver(o)) {
                Invocation::Completed(Ok(())) => delivery.delivered += 1,
                Invocation::Completed(Err(e)) => {
                    warn!("Observer {:?} failed to handle {:?}: {}", handle, event, e);
                    delivery.failed += 1;
                }
                Invocation::Busy => {
                    debug!("Observer {:?} is busy, deferring {:?}", handle, event);
                    self.deferred.borrow_mut().push(Deferred {
                        handle,
                        observer: weak,
                        event: event.clone(),
                    });
                    delivery.deferred += 1;
                    continue;
                }
                Invocation::Panicked(message) => {
                    error!("Observer {:?} panicked handling {:?}: {}", handle, event, message);
                    delivery.failed += 1;
                }
            }
            self.flush_deferred();
        }

        if saw_dropped {
            self.prune_dropped();
        }

        delivery
    }

    /// Delivers deferred notifications to observers that are no longer
    /// busy, oldest first.
    ///
    /// Runs until a pass makes no progress. Entries whose observer is still
    /// inside a handler stay queued ahead of anything deferred meanwhile.
    fn flush_deferred(&self) {
        loop {
            let batch = mem::take(&mut *self.deferred.borrow_mut());
            if batch.is_empty() {
                return;
            }

            let mut progressed = false;
            let mut waiting = Vec::new();

            for deferred in batch {
                if !self.registry.borrow().contains(deferred.handle) {
                    debug!("Dropping deferred {:?} for unregistered observer", deferred.event);
                    progressed = true;
                    continue;
                }
                let Some(observer) = deferred.observer.upgrade() else {
                    progressed = true;
                    continue;
                };

                match invoke(&observer, |o| deferred.event.deliver(o)) {
                    Invocation::Busy => waiting.push(deferred),
                    Invocation::Completed(Ok(())) => progressed = true,
                    Invocation::Completed(Err(e)) => {
                        warn!(
                            "Observer {:?} failed to handle deferred {:?}: {}",
                            deferred.handle, deferred.event, e
                        );
                        progressed = true;
                    }
                    Invocation::Panicked(message) => {
                        error!(
                            "Observer {:?} panicked handling deferred {:?}: {}",
                            deferred.handle, deferred.event, message
                        );
                        progressed = true;
                    }
                }
            }

            let mut queue = self.deferred.borrow_mut();
            waiting.append(&mut queue);
            *queue = waiting;

            if !progressed {
                return;
            }
        }
    }
}

impl Default for StateHub {
    fn default() -> Self {
        Self::new()
    }
}

//=== Invocation Helpers ==================================================

fn invoke<R>(
    observer: &Rc<RefCell<dyn StateObserver>>,
    call: impl FnOnce(&mut dyn StateObserver) -> R,
) -> Invocation<R> {
    let Ok(mut guard) = observer.try_borrow_mut() else {
        return Invocation::Busy;
    };

    match panic::catch_unwind(AssertUnwindSafe(|| call(&mut *guard))) {
        Ok(result) => Invocation::Completed(result),
        Err(payload) => Invocation::Panicked(panic_message(payload.as_ref()).to_owned()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
