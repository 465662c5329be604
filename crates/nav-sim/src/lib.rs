//! `nav-sim` — tick loop orchestrator for the `rts_nav` core.
//!
//! # Tick loop
//!
//! ```text
//! every tick:
//!   ⓪ Orders     — queued move orders are clustered into searches (one
//!                  batch per order); cancellations retire controllers.
//!   ① Scheduler  — flush add/remove commands, spend the expansion budget,
//!                  hand finished paths to the waiting controllers.
//!   ② Proximity  — rebuild the R-tree over live agents.
//!   ③ Intents    — SteeringController::step for each moving agent against
//!                  one immutable SteerContext.
//!   ④ Apply      — in ascending AgentId order:
//!                    position / facing        → AgentStore
//!                    waypoint reached         → group shortcut snapshot
//!                    repath request           → fresh individual search
//!                    completed                → controller retired
//!   ⑤ Yield      — live, non-attacking agents without a moving controller
//!                  step out of any overlap, through the same commit check.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`sim`]      | `NavSim<O>`, `SimOrder`                               |
//! | [`builder`]  | `NavSimBuilder` (validates config and placement)      |
//! | [`observer`] | `NavObserver` hooks, `TickStats`, `NoopObserver`      |
//! | [`error`]    | `SimError`, `SimResult<T>`                            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use nav_agent::{AgentSpec, AgentStoreBuilder};
//! use nav_grid::GridMap;
//! use nav_sim::{NavSimBuilder, NoopObserver};
//! use nav_steer::MoveTarget;
//!
//! let map = GridMap::from_ascii(ascii)?;
//! let mut b = AgentStoreBuilder::new();
//! let scout = b.add(AgentSpec::new(PlayerId(0), start));
//! let mut sim = NavSimBuilder::new(b.build()?, map).build()?;
//! sim.submit_move_order(&[scout], MoveTarget::Position(goal))?;
//! sim.run_until_idle(2_000, &mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::NavSimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NavObserver, NoopObserver, TickStats};
pub use sim::{NavSim, SimOrder};
