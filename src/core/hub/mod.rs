//=========================================================================
// State Hub
//=========================================================================
//
// Single authoritative broadcast point for game-phase and plunger
// transitions and for presentation events.
//
// Architecture:
//   StateHub
//     ├─ state / ball_in_plunger       (last write wins)
//     ├─ registry: ObserverRegistry    (Weak refs, registration order)
//     ├─ score_authority               (optional preferred responder)
//     └─ deferred                      (nested events for busy observers)
//
// Flow:
//   mutator → update own copy → snapshot registry → notify each observer
//
//=========================================================================

//=== Module Declarations =================================================

mod game_state;
mod registry;
mod state_hub;

//=== Public API ==========================================================

pub use game_state::{GameState, TextCategory};
pub use registry::ObserverHandle;
pub use state_hub::{StateHub, UNKNOWN_HIGH_SCORE};

//=== Delivery ============================================================

/// Outcome of one fan-out.
///
/// `delivered + failed + skipped + deferred` equals the number of
/// registrations that existed when the fan-out started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    /// Observers whose handler returned `Ok`.
    pub delivered: usize,

    /// Observers whose handler returned an error or panicked.
    pub failed: usize,

    /// Registrations not invoked: dropped or unregistered mid-fan-out.
    pub skipped: usize,

    /// Observers busy in an outer notification. They receive the event
    /// once their current handler returns.
    pub deferred: usize,
}

impl Delivery {
    /// Returns true if every observer handled, or will handle, the event.
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}
