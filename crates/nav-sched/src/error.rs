use thiserror::Error;

use nav_core::AgentId;

#[derive(Debug, Error)]
pub enum SchedError {
    #[error("{0} is not in the agent store")]
    UnknownAgent(AgentId),

    #[error("{0} is dead and cannot be ordered")]
    DeadAgent(AgentId),
}

pub type SchedResult<T> = Result<T, SchedError>;
