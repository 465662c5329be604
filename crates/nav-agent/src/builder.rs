//! Fluent builder for constructing an `AgentStore`.
//!
//! # Usage
//!
//! ```rust
//! use nav_agent::{AgentSpec, AgentStoreBuilder};
//! use nav_core::{PlayerId, WorldPos};
//!
//! let mut b = AgentStoreBuilder::new();
//! let a = b.add(AgentSpec::new(PlayerId(0), WorldPos::flat(1_500, 1_500)));
//! let c = b.add(AgentSpec::new(PlayerId(1), WorldPos::flat(9_000, 1_500)).speed(128));
//! let store = b.build().unwrap();
//!
//! assert_eq!(store.count, 2);
//! assert_eq!(store.speed[c.index()], 128);
//! assert!(store.alive[a.index()]);
//! ```

use nav_core::{AgentId, HALF_CELL, Layer, NavError, NavResult, PlayerId, WAngle, WorldPos};

use crate::AgentStore;

// ── AgentSpec ─────────────────────────────────────────────────────────────────

/// Initial state of one agent.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSpec {
    pub owner:  PlayerId,
    pub pos:    WorldPos,
    pub layer:  Layer,
    pub facing: WAngle,
    pub radius: i32,
    pub speed:  i32,
}

impl AgentSpec {
    pub const DEFAULT_RADIUS: i32 = 256;
    pub const DEFAULT_SPEED: i32 = 96;

    pub fn new(owner: PlayerId, pos: WorldPos) -> Self {
        Self {
            owner,
            pos,
            layer:  Layer::GROUND,
            facing: WAngle::ZERO,
            radius: Self::DEFAULT_RADIUS,
            speed:  Self::DEFAULT_SPEED,
        }
    }

    pub fn radius(mut self, radius: i32) -> Self {
        self.radius = radius;
        self
    }

    pub fn speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn facing(mut self, facing: WAngle) -> Self {
        self.facing = facing;
        self
    }
}

// ── AgentStoreBuilder ─────────────────────────────────────────────────────────

/// Fluent builder for [`AgentStore`].
///
/// Agents receive sequential ids in the order they are added.  Footprint and
/// speed are validated once in [`build`](Self::build): inconsistent footprint
/// data is a load-time error, never a per-tick one.
pub struct AgentStoreBuilder {
    specs: Vec<AgentSpec>,
}

impl AgentStoreBuilder {
    pub fn new() -> Self {
        Self { specs: Vec::new() }
    }

    pub fn with_capacity(agents: usize) -> Self {
        Self { specs: Vec::with_capacity(agents) }
    }

    /// Add an agent and return its `AgentId` (sequential from 0).
    pub fn add(&mut self, spec: AgentSpec) -> AgentId {
        let id = AgentId(self.specs.len() as u32);
        self.specs.push(spec);
        id
    }

    /// Chaining form of [`add`](Self::add) for when ids are not needed.
    pub fn agent(mut self, spec: AgentSpec) -> Self {
        self.add(spec);
        self
    }

    pub fn agent_count(&self) -> usize {
        self.specs.len()
    }

    /// Validate every spec and construct the store.
    pub fn build(self) -> NavResult<AgentStore> {
        let mut store = AgentStore::with_capacity(self.specs.len());

        for (i, spec) in self.specs.into_iter().enumerate() {
            if spec.radius <= 0 || spec.radius >= HALF_CELL {
                return Err(NavError::Config(format!(
                    "agent {i}: footprint radius {} must be in 1..{HALF_CELL}",
                    spec.radius
                )));
            }
            if spec.speed <= 0 {
                return Err(NavError::Config(format!(
                    "agent {i}: speed {} must be positive",
                    spec.speed
                )));
            }
            if !spec.owner.is_valid() {
                return Err(NavError::Config(format!("agent {i}: owner is unset")));
            }

            store.pos.push(spec.pos);
            store.layer.push(spec.layer);
            store.facing.push(spec.facing);
            store.radius.push(spec.radius);
            store.speed.push(spec.speed);
            store.owner.push(spec.owner);
            store.attacking.push(false);
            store.alive.push(true);
            store.visible.push(true);
            store.returning_to_cell.push(false);
            store.count += 1;
        }

        Ok(store)
    }
}

impl Default for AgentStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
