//! Core agent storage: `AgentStore` (SoA data).
//!
//! # Ownership
//!
//! The simulation owns the store and is its only writer.  Steering intents are
//! computed against `&AgentStore` for every agent first, then applied in
//! ascending `AgentId` order, so no agent ever sees another agent's
//! half-committed move within a tick.

use nav_core::{AgentId, CellPos, Layer, PlayerId, WAngle, WorldPos};

/// Structure-of-Arrays storage for all agent state.
///
/// Every `Vec` field has exactly `count` elements; the `AgentId` value is the
/// index into all of them:
///
/// ```ignore
/// let p = store.pos[agent.index()];  // O(1), cache-friendly
/// ```
///
/// Agents are never removed.  A killed agent keeps its slot with
/// `alive = false` so ids stay stable for the lifetime of the simulation.
pub struct AgentStore {
    /// Number of agents.  Equals the length of every SoA `Vec`.
    pub count: usize,

    // ── Kinematics ────────────────────────────────────────────────────────
    /// Authoritative position.  Written once per tick in the apply phase.
    pub pos: Vec<WorldPos>,

    /// Movement layer the agent occupies.
    pub layer: Vec<Layer>,

    /// Facing, updated under the steering turn-rate limit.
    pub facing: Vec<WAngle>,

    // ── Footprint & mobility ──────────────────────────────────────────────
    /// Collision footprint radius (world units, below half a cell).
    pub radius: Vec<i32>,

    /// Nominal movement per tick (world units).
    pub speed: Vec<i32>,

    // ── Ownership & status flags ──────────────────────────────────────────
    pub owner: Vec<PlayerId>,

    /// Engaged in an attack: holds position against repulsion and counts as
    /// an obstacle in other agents' lookahead.
    pub attacking: Vec<bool>,

    pub alive: Vec<bool>,

    /// Visible to the players that may target it.  A hidden agent cannot be
    /// followed; followers fall back to its last visible position.
    pub visible: Vec<bool>,

    /// Briefly detached from steering while re-entering a cell; such agents
    /// never take part in shared searches.
    pub returning_to_cell: Vec<bool>,
}

impl AgentStore {
    /// `true` if there are no agents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// `true` if `agent` names a slot in this store.
    #[inline]
    pub fn contains(&self, agent: AgentId) -> bool {
        agent.index() < self.count
    }

    #[inline]
    pub fn is_alive(&self, agent: AgentId) -> bool {
        self.contains(agent) && self.alive[agent.index()]
    }

    /// The cell the agent currently stands in.
    #[inline]
    pub fn cell(&self, agent: AgentId) -> CellPos {
        let i = agent.index();
        self.pos[i].to_cell(self.layer[i])
    }

    /// Number of agents still alive.
    pub fn alive_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    // ── Package-private constructor used by AgentStoreBuilder ─────────────

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            count: 0,
            pos: Vec::with_capacity(capacity),
            layer: Vec::with_capacity(capacity),
            facing: Vec::with_capacity(capacity),
            radius: Vec::with_capacity(capacity),
            speed: Vec::with_capacity(capacity),
            owner: Vec::with_capacity(capacity),
            attacking: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            visible: Vec::with_capacity(capacity),
            returning_to_cell: Vec::with_capacity(capacity),
        }
    }
}
