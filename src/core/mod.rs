//=========================================================================
// Core Systems
//
// Everything between the table simulation and the presentation/platform
// services.
//
// Architecture:
// ```text
//   simulation ──set_state()/post_score()/...──> StateHub
//                                                  │ fan-out (registration order)
//                        ┌─────────────────────────┼──────────────────────┐
//                        ▼                         ▼                      ▼
//                   ScoreKeeper             ChannelObserver         other observers
//                        │                         │
//                 ScorePersistence          PresentationFeed (UI thread)
//                        │
//                   ScoreBackend
// ```
//
// Notes:
// The hub runs on the game-loop thread and never touches storage itself.
// Persistence is reached only through an observer, and the only path to
// another thread is the channel observer.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod hub;
pub mod observer;
pub mod persistence;
