use nav_core::{AgentId, SearchId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SteerError {
    #[error("{agent} is not waiting for {search}")]
    UnexpectedDelivery { agent: AgentId, search: SearchId },

    #[error("{0} has already completed its move")]
    AlreadyCompleted(AgentId),
}

pub type SteerResult<T> = Result<T, SteerError>;
