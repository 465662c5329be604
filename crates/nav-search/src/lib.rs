//! `nav-search` — incremental any-angle pathfinding over grid corners.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`search`]     | `PathfinderSearch`, `SearchRequest`, `SearchStatus`         |
//! | [`state`]      | `SearchState` records, `ListTag`, the open list             |
//! | [`path`]       | `Path` (waypoint deque)                                     |
//! | [`pad`]        | `pad_corner` (footprint padding at convex corners)          |
//! | [`pathfinder`] | `ThetaStarPathfinder` (run-to-completion convenience)       |
//!
//! # Determinism
//!
//! Expansion order depends only on the map, the endpoints and the fixed
//! neighbour order; equal-priority entries pop in insertion order.  Costs are
//! integer world units.  Two runs of the same query produce identical paths.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Path` and request types. |

pub mod pad;
pub mod path;
pub mod pathfinder;
pub mod search;
pub mod state;

#[cfg(test)]
mod tests;

pub use pad::pad_corner;
pub use path::Path;
pub use pathfinder::ThetaStarPathfinder;
pub use search::{PathfinderSearch, SearchRequest, SearchStatus};
pub use state::{ListTag, SearchState};
