//! `nav-grid` — terrain view, corner graph and line of sight.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`oracle`]  | `BlockingOracle` trait, `GridBounds`, `FnOracle`             |
//! | [`grid`]    | `GridMap` (terrain + occupancy), `GridMapBuilder`, ASCII maps |
//! | [`line`]    | corner-to-corner and world-segment line-of-sight walkers      |
//! | [`corners`] | corner neighbours, endpoint snapping                         |
//! | [`loader`]  | `load_blocked_csv`                                           |
//! | [`error`]   | `GridError`, `GridResult<T>`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod corners;
pub mod error;
pub mod grid;
pub mod line;
pub mod loader;
pub mod oracle;


pub use corners::{NEIGHBOR_OFFSETS, can_step, is_corner_usable, nearest_usable_corner, neighbors};
pub use error::{GridError, GridResult};
pub use grid::{GridMap, GridMapBuilder};
pub use line::{corner_line_of_sight, first_blocked_on_segment, segment_clear};
pub use loader::{load_blocked_csv, load_blocked_reader};
pub use oracle::{BlockingOracle, FnOracle, GridBounds};
