//=========================================================================
// Pinball Hub — Library Root
//
// This crate defines the coordination layer between a pinball table's
// simulation and everything that presents or persists its results.
//
// Responsibilities:
// - Expose the game-state broadcast hub (`StateHub`)
// - Define the observer contract presentation layers implement
// - Provide durable "keep the highest score" storage
//
// Typical usage:
// ```no_run
// use std::cell::RefCell;
// use std::rc::Rc;
// use pinball_hub::prelude::*;
//
// let hub = StateHub::new();
// let keeper = Rc::new(RefCell::new(ScoreStoreBuilder::new().build().unwrap()));
// hub.register(&keeper);
//
// hub.set_state(GameState::IN_GAME);
// hub.present_high_score(125_000);
// assert_eq!(hub.query_high_score(), 125_000);
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the hub, the observer contract and the stock observers,
// and the score persistence layer.
//
pub mod core;

//--- Convenience ---------------------------------------------------------
//
// `prelude` re-exports the types most callers need.
//
pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use crate::core::hub::{GameState, StateHub, TextCategory};
