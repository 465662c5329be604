//! `nav-core` — foundational types for the `rts_nav` pathfinding core.
//!
//! This crate is a dependency of every other `nav-*` crate.  It has no
//! `nav-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `PlayerId`, `SearchId`                         |
//! | [`geometry`]    | `WorldPos`, `WVec`, `CellPos`, `CornerPos`, `Layer`       |
//! | [`angle`]       | `WAngle` (1024 units per turn)                            |
//! | [`time`]        | `Tick`, `SimClock`                                        |
//! | [`rng`]         | `SimRng` (scenario generation only)                       |
//! | [`config`]      | `NavConfig` and its per-subsystem sections                |
//! | [`error`]       | `NavError`, `NavResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod angle;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use angle::WAngle;
pub use config::{NavConfig, PathfinderConfig, SchedulerConfig, SteeringConfig};
pub use error::{NavError, NavResult};
pub use geometry::{CELL_SIZE, CellPos, CornerPos, HALF_CELL, Layer, WVec, WorldPos};
pub use ids::{AgentId, PlayerId, SearchId};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
