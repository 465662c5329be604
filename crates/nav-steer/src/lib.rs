//! `nav-steer` — per-agent steering along delivered paths.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`controller`] | `SteeringController`, `Deflection`                         |
//! | [`state`]      | `SteeringState` machine, `MoveOutcome`                     |
//! | [`avoid`]      | `lookahead`, `choose_deflection`, `flee_vector`, `commit`  |
//! | [`history`]    | `PositionHistory` (stall window)                           |
//! | [`intent`]     | `SteerIntent` (one tick's requested changes)               |
//! | [`context`]    | `SteerContext<'a>` (read-only tick snapshot)               |
//! | [`target`]     | `MoveTarget`                                               |
//! | [`error`]      | `SteerError`, `SteerResult<T>`                             |
//!
//! # Two-phase use
//!
//! 1. **Intent phase**: for every controller, in ascending `AgentId` order,
//!    call `step(&ctx)`.  Controllers read the shared `SteerContext` and
//!    mutate only themselves.
//!
//! 2. **Apply phase**: the caller commits each `SteerIntent` (position,
//!    facing), submits re-path requests and retires completed controllers.
//!    Agents marked `holding` in the context are then moved by
//!    `yield_vector`, through the same `commit` check.

pub mod avoid;
pub mod context;
pub mod controller;
pub mod error;
pub mod history;
pub mod intent;
pub mod state;
pub mod target;


pub use avoid::{
    DEFLECTION_STEP, Obstacle, Passable, choose_deflection, commit, deflection_offsets, flee_vector, lookahead,
    yield_vector,
};
pub use context::SteerContext;
pub use controller::{Deflection, SteeringController};
pub use error::{SteerError, SteerResult};
pub use history::PositionHistory;
pub use intent::SteerIntent;
pub use state::{MoveOutcome, SteeringState};
pub use target::MoveTarget;
