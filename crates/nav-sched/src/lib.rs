//! `nav-sched` — cross-tick execution of pathfinding searches.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`scheduler`] | `PathfinderScheduler`, `SchedTick`, `PathDelivery`, `Assignment` |
//! | [`cluster`]   | `plan_batch`, `BatchPlan`, circles, slice groups            |
//! | [`command`]   | `SchedCommand`, `CommandQueue` (deferred adds/removals)     |
//! | [`error`]     | `SchedError`, `SchedResult<T>`                              |
//!
//! # Budget model (summary)
//!
//! Each tick the scheduler performs at most `expansion_budget` expansions in
//! total.  With `n` running searches, each gets
//!
//! ```text
//! allotment = min(⌈budget / n⌉, budget left this tick)
//! ```
//!
//! so early searches in the active list may use up the tick and later ones
//! wait for the next.  A delayed search spends its turn counting down.
//!
//! # Sharing (summary)
//!
//! A move order for several agents of the same player heading far away is
//! clustered: agents standing together in an open sector of a circle share
//! one search from their averaged position.  An agent that cannot see that
//! averaged source in a straight line always gets its own search instead.

pub mod cluster;
pub mod command;
pub mod error;
pub mod scheduler;


pub use cluster::{BatchPlan, ClusterCircle, SharedGroup, SliceGroup, plan_batch};
pub use command::{CommandQueue, SchedCommand};
pub use error::{SchedError, SchedResult};
pub use scheduler::{Assignment, FinishedSearch, PathDelivery, PathfinderScheduler, SchedTick};
