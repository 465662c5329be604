//! Tuning configuration for search, scheduling and steering.
//!
//! The defaults are empirically chosen values; none of them are load-bearing
//! for correctness.  What *is* load-bearing is internal consistency, which
//! [`NavConfig::validate`] checks once when a simulation is built.  A config
//! that fails validation is a fatal load-time error.

use crate::{CELL_SIZE, NavError, NavResult, WAngle};

// ── PathfinderConfig ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathfinderConfig {
    /// Hard cap on expansions for one search over its whole lifetime.
    pub max_expansions: u32,
    /// Chebyshev rings searched around a blocked or isolated endpoint corner.
    pub nearest_corner_search_radius: i32,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            max_expansions:               20_000,
            nearest_corner_search_radius: 16,
        }
    }
}

// ── SchedulerConfig ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Expansions shared by all active searches in one tick.
    pub expansion_budget: u32,
    /// Orders shorter than this (world units) always get individual searches.
    pub min_share_distance: i32,
    /// Radius of a clustering circle (world units).
    pub cluster_radius: i32,
    /// Angular slices per clustering circle.  Must divide 1024.
    pub slice_count: u32,
    /// Delay step (ticks) between successive shared searches of one batch.
    pub merge_stagger_ticks: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            expansion_budget:    2_000,
            min_share_distance:  8 * CELL_SIZE,
            cluster_radius:      4 * CELL_SIZE,
            slice_count:         16,
            merge_stagger_ticks: 1,
        }
    }
}

impl SchedulerConfig {
    /// Angular width of one slice.
    #[inline]
    pub fn slice_width(&self) -> WAngle {
        WAngle(WAngle::FULL / self.slice_count.max(1) as i32)
    }
}

// ── SteeringConfig ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SteeringConfig {
    /// Positions sampled along the candidate motion by the lookahead test.
    pub lookahead_steps: u32,
    /// Only agents that are attacking count as lookahead blockers.
    pub lookahead_attacking_only: bool,
    /// Ticks a deflection vector stays active once adopted.
    pub deflection_ttl: u32,
    /// Length of the rolling position buffer used for stuck detection.
    pub stuck_buffer_len: usize,
    /// Consecutive stalled ticks before a fresh individual path is requested.
    pub repath_after_stuck_ticks: u32,
    /// Re-path attempts before the move is abandoned.
    pub max_repath_retries: u32,
    /// Extra gap beyond touching at which agents start repelling each other.
    pub separation_margin: i32,
    /// Maximum facing change per tick (1024 = full turn).
    pub turn_rate: i32,
    /// A grouped agent may skip a waypoint a group member within this
    /// distance has already completed.
    pub group_shortcut_radius: i32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            lookahead_steps:          3,
            lookahead_attacking_only: true,
            deflection_ttl:           4,
            stuck_buffer_len:         8,
            repath_after_stuck_ticks: 12,
            max_repath_retries:       2,
            separation_margin:        256,
            turn_rate:                64,
            group_shortcut_radius:    2 * CELL_SIZE,
        }
    }
}

// ── NavConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration.
///
/// Typically loaded from a JSON file by the application crate (enable the
/// `serde` feature) and handed to the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Game milliseconds per tick.  Only used for reporting.
    pub tick_ms: u32,
    /// Emit an observer snapshot every N ticks.  0 disables snapshots.
    pub snapshot_interval_ticks: u64,
    pub pathfinder: PathfinderConfig,
    pub scheduler:  SchedulerConfig,
    pub steering:   SteeringConfig,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            tick_ms:                 40,
            snapshot_interval_ticks: 1,
            pathfinder:              PathfinderConfig::default(),
            scheduler:               SchedulerConfig::default(),
            steering:                SteeringConfig::default(),
        }
    }
}

impl NavConfig {
    /// Check internal consistency.  Returns the first problem found.
    pub fn validate(&self) -> NavResult<()> {
        let fail = |msg: String| Err(NavError::Config(msg));

        if self.tick_ms == 0 {
            return fail("tick_ms must be positive".into());
        }

        let p = &self.pathfinder;
        if p.max_expansions == 0 {
            return fail("pathfinder.max_expansions must be positive".into());
        }
        if p.nearest_corner_search_radius < 0 {
            return fail(format!(
                "pathfinder.nearest_corner_search_radius must not be negative (got {})",
                p.nearest_corner_search_radius
            ));
        }

        let s = &self.scheduler;
        if s.expansion_budget == 0 {
            return fail("scheduler.expansion_budget must be positive".into());
        }
        if s.slice_count == 0 || WAngle::FULL % s.slice_count as i32 != 0 {
            return fail(format!(
                "scheduler.slice_count must divide {} (got {})",
                WAngle::FULL,
                s.slice_count
            ));
        }
        if s.cluster_radius <= 0 {
            return fail("scheduler.cluster_radius must be positive".into());
        }
        if s.min_share_distance < 0 {
            return fail("scheduler.min_share_distance must not be negative".into());
        }

        let st = &self.steering;
        if st.lookahead_steps == 0 {
            return fail("steering.lookahead_steps must be positive".into());
        }
        if st.stuck_buffer_len < 2 {
            return fail(format!(
                "steering.stuck_buffer_len must be at least 2 (got {})",
                st.stuck_buffer_len
            ));
        }
        if (st.repath_after_stuck_ticks as usize) < st.stuck_buffer_len {
            return fail(format!(
                "steering.repath_after_stuck_ticks ({}) must not be below stuck_buffer_len ({})",
                st.repath_after_stuck_ticks, st.stuck_buffer_len
            ));
        }
        if st.turn_rate <= 0 || st.turn_rate > WAngle::FULL / 2 {
            return fail(format!(
                "steering.turn_rate must be in 1..={} (got {})",
                WAngle::FULL / 2,
                st.turn_rate
            ));
        }
        if st.separation_margin < 0 || st.group_shortcut_radius < 0 {
            return fail("steering distances must not be negative".into());
        }

        Ok(())
    }
}
