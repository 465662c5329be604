//! Plain data row types written by output backends.

/// One agent's navigation state at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSnapshotRow {
    pub agent_id: u32,
    pub tick:     u64,
    pub x:        i32,
    pub y:        i32,
    pub layer:    u8,
    /// Facing in angle units (1024 per turn).
    pub facing:   i32,
    pub alive:    bool,
    /// Steering state label, `"idle"` when the agent has no move activity.
    pub state:    &'static str,
    pub waypoints_left: u32,
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:              u64,
    pub elapsed_ms:        u64,
    pub expansions:        u32,
    pub active_searches:   u32,
    pub finished_searches: u32,
    pub deliveries:        u32,
    pub moving:            u32,
    pub completed:         u32,
}

/// One waypoint of a path delivered to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathWaypointRow {
    pub tick:      u64,
    pub search_id: u32,
    pub agent_id:  u32,
    /// Position of the waypoint in the path, from 0.
    pub seq:       u32,
    pub x:         i32,
    pub y:         i32,
}
