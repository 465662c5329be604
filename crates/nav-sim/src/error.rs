use nav_core::{AgentId, NavError, WorldPos};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Nav(#[from] NavError),

    #[error("agent {0} does not exist")]
    UnknownAgent(AgentId),

    #[error("agent {0} is dead")]
    DeadAgent(AgentId),

    #[error("agent {agent} starts at {pos}, outside the map")]
    OutsideMap { agent: AgentId, pos: WorldPos },

    #[error("move order names no agents")]
    EmptyOrder,
}

pub type SimResult<T> = Result<T, SimError>;
