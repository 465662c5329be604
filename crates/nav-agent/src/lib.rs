//! `nav-agent` — Structure-of-Arrays agent storage for `rts_nav`.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`store`]       | `AgentStore` (SoA arrays)                                 |
//! | [`builder`]     | `AgentSpec`, `AgentStoreBuilder` (validated construction) |
//! | [`proximity`]   | `ProximityIndex` (per-tick R-tree over live agents)       |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `serde`    | Derives `Serialize`/`Deserialize` on `AgentSpec`.          |

pub mod builder;
pub mod proximity;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::{AgentSpec, AgentStoreBuilder};
pub use proximity::ProximityIndex;
pub use store::AgentStore;
