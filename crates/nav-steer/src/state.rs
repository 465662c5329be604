//! Steering state machine.
//!
//! ```text
//!              deliver(path)
//! AwaitingPath ─────────────► Following ◄──────► Blocked
//!      ▲                          │                 │
//!      └──── repath (bounded) ────┴─────────────────┤
//!                                                   ▼
//!                                               Completed
//! ```

use nav_core::SearchId;

/// Why a move ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveOutcome {
    /// The last waypoint was reached.
    Arrived,
    /// The target agent vanished with no last known position to fall back on.
    TargetLost,
    /// Stuck after every allowed re-path; the agent halts where it is.
    Stuck,
    /// Replaced by a new order or cancelled by the host.
    Cancelled,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SteeringState {
    /// Waiting for `search` to deliver a path.  Holds position.
    AwaitingPath { search: SearchId },
    Following,
    /// Local avoidance or stall in progress.
    Blocked,
    Completed(MoveOutcome),
}

impl SteeringState {
    #[inline]
    pub fn is_completed(self) -> bool {
        matches!(self, SteeringState::Completed(_))
    }

    /// `true` in the two states that produce motion.
    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(self, SteeringState::Following | SteeringState::Blocked)
    }

    /// Short label for logs and output rows.
    pub fn label(self) -> &'static str {
        match self {
            SteeringState::AwaitingPath { .. } => "awaiting_path",
            SteeringState::Following => "following",
            SteeringState::Blocked => "blocked",
            SteeringState::Completed(_) => "completed",
        }
    }
}
