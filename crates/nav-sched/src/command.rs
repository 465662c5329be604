//! Deferred scheduler mutations.
//!
//! Adds and removals requested between ticks are buffered here and applied
//! in submission order at the top of the next
//! [`tick`](crate::PathfinderScheduler::tick), so the active list is never
//! changed while it is being expanded.

use nav_core::{AgentId, WorldPos};
use nav_search::PathfinderSearch;

pub enum SchedCommand {
    /// Start ticking a new search.
    Add(Box<PathfinderSearch>),

    /// Detach `agent` from its active searches, or only from those heading
    /// to `destination` when given.  A search left with no agents is
    /// cancelled.
    Remove { agent: AgentId, destination: Option<WorldPos> },
}

/// FIFO buffer of [`SchedCommand`]s.
#[derive(Default)]
pub struct CommandQueue {
    pending: Vec<SchedCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: SchedCommand) {
        self.pending.push(command);
    }

    /// Take every pending command, oldest first.
    pub fn drain(&mut self) -> Vec<SchedCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
