//! What a move order is heading for.

use nav_agent::AgentStore;
use nav_core::{AgentId, WorldPos};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveTarget {
    Position(WorldPos),
    /// Follow another agent while it is alive and visible.
    Agent(AgentId),
}

impl MoveTarget {
    /// Where the target is right now, if it can be seen.
    ///
    /// A position target is always valid.  An agent target is valid while
    /// the agent exists, is alive and is visible.
    pub fn live_position(&self, agents: &AgentStore) -> Option<WorldPos> {
        match *self {
            MoveTarget::Position(p) => Some(p),
            MoveTarget::Agent(a) => {
                let i = a.index();
                (agents.is_alive(a) && agents.visible[i]).then(|| agents.pos[i])
            }
        }
    }
}
