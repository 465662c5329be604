//! The result of one controller step, applied by the simulation afterwards.

use std::mem::discriminant;

use nav_core::{AgentId, WAngle, WVec, WorldPos};
use nav_search::SearchRequest;

use crate::state::{MoveOutcome, SteeringState};

/// Everything a controller wants done for its agent this tick.
///
/// Produced against an immutable world snapshot; the simulation applies
/// intents in ascending `AgentId` order.
#[derive(Clone, Debug)]
pub struct SteerIntent {
    pub agent:    AgentId,
    /// Position to commit.
    pub position: WorldPos,
    pub velocity: WVec,
    pub facing:   WAngle,
    pub previous: SteeringState,
    pub state:    SteeringState,
    /// Signed deflection adopted this tick, in angle units.
    pub deflection: Option<i32>,
    pub waypoint_reached: Option<WorldPos>,
    /// Fresh unshared search to submit; the controller waits for it.
    pub repath:    Option<SearchRequest>,
    pub completed: Option<MoveOutcome>,
}

impl SteerIntent {
    /// An intent that leaves the agent where it is.
    pub fn hold(agent: AgentId, position: WorldPos, facing: WAngle, state: SteeringState) -> Self {
        Self {
            agent,
            position,
            velocity: WVec::ZERO,
            facing,
            previous: state,
            state,
            deflection: None,
            waypoint_reached: None,
            repath: None,
            completed: None,
        }
    }

    /// `true` if the step moved the controller to a different kind of state.
    pub fn state_changed(&self) -> bool {
        discriminant(&self.previous) != discriminant(&self.state)
    }
}
