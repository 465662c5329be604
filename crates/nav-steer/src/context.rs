//! Read-only world view shared by every controller during the intent phase.

use nav_agent::{AgentStore, ProximityIndex};
use nav_core::{SteeringConfig, Tick, WorldPos};
use nav_grid::BlockingOracle;

/// Built once per tick by the simulation and borrowed by every
/// [`SteeringController::step`](crate::SteeringController::step) call.
/// Nothing here is written while a context is alive.
pub struct SteerContext<'a> {
    pub tick:      Tick,
    pub agents:    &'a AgentStore,
    pub oracle:    &'a dyn BlockingOracle,
    pub proximity: &'a ProximityIndex,
    pub config:    &'a SteeringConfig,
    /// Last waypoint each agent completed, indexed by `AgentId`.  Used by
    /// group members to skip waypoints a neighbour already reached.
    pub completed: &'a [Option<WorldPos>],
    /// `true` for agents without a moving controller, indexed by `AgentId`.
    /// They block lookaheads and yield to overlapping neighbours.
    pub holding: &'a [bool],
}
