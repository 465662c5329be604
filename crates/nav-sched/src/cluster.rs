//! Clustering of one move order into shared and individual searches.
//!
//! # Batch model
//!
//! [`plan_batch`] is a pure function of the map, the agent store and the
//! order.  Everything it builds (circles, slice groups, per-player buckets)
//! lives in the returned [`BatchPlan`]; the scheduler turns that plan into
//! searches and drops it.  Nothing survives between batches.
//!
//! ```text
//! order ──► individual? ─yes──────────────────────────────────► individual
//!              │ no
//!              ▼
//!       bucket by (owner, layer)
//!              ▼
//!       circles around leftover averages
//!              ▼
//!       slices (blocked / open) ──► contiguous open runs = SliceGroups
//!              ▼
//!       averaged source, per-member line check ──► SharedGroup / individual
//! ```

use std::collections::BTreeMap;

use nav_agent::AgentStore;
use nav_core::{AgentId, Layer, PlayerId, SchedulerConfig, WAngle, WVec, WorldPos};
use nav_grid::{BlockingOracle, nearest_usable_corner, segment_clear};

// ── Plan types ────────────────────────────────────────────────────────────────

/// A clustering circle and the blocked state of its slices.
#[derive(Clone, Debug)]
pub struct ClusterCircle {
    pub owner:   PlayerId,
    pub layer:   Layer,
    pub center:  WorldPos,
    pub radius:  i32,
    pub members: Vec<AgentId>,
    /// One flag per slice; slice `i` spans angles `[i·w, (i+1)·w)`.
    pub blocked: Vec<bool>,
}

/// A run of contiguous open slices of one circle.
#[derive(Clone, Debug)]
pub struct SliceGroup {
    /// Index into [`BatchPlan::circles`].
    pub circle:  usize,
    /// Slice indices in angular order; a run may wrap past the last slice.
    pub slices:  Vec<usize>,
    pub members: Vec<AgentId>,
}

/// Agents that will share one search from an averaged source.
#[derive(Clone, Debug)]
pub struct SharedGroup {
    pub source:  WorldPos,
    pub layer:   Layer,
    /// Largest footprint radius among the members.
    pub radius:  i32,
    pub members: Vec<AgentId>,
    /// Ticks the shared search waits before its first expansion.
    pub delay:   u32,
}

/// The outcome of clustering one order.
#[derive(Clone, Debug, Default)]
pub struct BatchPlan {
    pub destination:  WorldPos,
    pub circles:      Vec<ClusterCircle>,
    pub slice_groups: Vec<SliceGroup>,
    pub shared:       Vec<SharedGroup>,
    /// Agents that get their own search, in order of first mention.
    pub individual:   Vec<AgentId>,
}

impl BatchPlan {
    /// Number of searches this plan creates.
    pub fn search_count(&self) -> usize {
        self.shared.len() + self.individual.len()
    }
}

// ── Planning ──────────────────────────────────────────────────────────────────

/// Split `order` into shared groups and individual searches.
///
/// `order` must name live agents of `agents`; duplicates are ignored.
/// `corner_search_radius` bounds the snap of an averaged source onto a usable
/// corner.
pub fn plan_batch(
    oracle: &dyn BlockingOracle,
    agents: &AgentStore,
    order: &[AgentId],
    destination: WorldPos,
    config: &SchedulerConfig,
    corner_search_radius: i32,
) -> BatchPlan {
    let mut plan = BatchPlan { destination, ..BatchPlan::default() };

    let mut seen = Vec::with_capacity(order.len());
    let mut buckets: BTreeMap<(PlayerId, Layer), Vec<AgentId>> = BTreeMap::new();
    for &agent in order {
        if seen.contains(&agent) {
            continue;
        }
        seen.push(agent);
        let i = agent.index();
        let hop = agents.pos[i].distance_2d(destination);
        if hop < config.min_share_distance || agents.returning_to_cell[i] {
            plan.individual.push(agent);
        } else {
            buckets.entry((agents.owner[i], agents.layer[i])).or_default().push(agent);
        }
    }

    for ((owner, layer), bucket) in buckets {
        if bucket.len() < 2 {
            plan.individual.extend(bucket);
            continue;
        }
        let mut leftovers = bucket;
        while !leftovers.is_empty() {
            let circle = carve_circle(oracle, agents, &mut leftovers, owner, layer, config);
            let circle_index = plan.circles.len();
            for run in open_runs(&circle.blocked) {
                let members: Vec<AgentId> = circle
                    .members
                    .iter()
                    .copied()
                    .filter(|&a| run.contains(&slice_of(circle.center, agents.pos[a.index()], config.slice_count)))
                    .collect();
                if !members.is_empty() {
                    plan.slice_groups.push(SliceGroup { circle: circle_index, slices: run, members });
                }
            }
            // Members standing in a blocked slice are not in any group.
            for &a in &circle.members {
                let slice = slice_of(circle.center, agents.pos[a.index()], config.slice_count);
                if circle.blocked[slice] {
                    plan.individual.push(a);
                }
            }
            plan.circles.push(circle);
        }
    }

    for group in &plan.slice_groups {
        let layer = plan.circles[group.circle].layer;
        match share_group(oracle, agents, &group.members, layer, corner_search_radius) {
            Some((mut shared, excluded)) => {
                shared.delay = (plan.shared.len() as u32) % (config.merge_stagger_ticks + 1);
                plan.shared.push(shared);
                plan.individual.extend(excluded);
            }
            None => plan.individual.extend(group.members.iter().copied()),
        }
    }

    plan
}

/// Take the next circle's members out of `leftovers`.
///
/// The circle is centred on the average of all leftovers; members are the
/// leftovers within the radius.  If that catches nobody, the circle is
/// re-centred on the first leftover instead.
fn carve_circle(
    oracle: &dyn BlockingOracle,
    agents: &AgentStore,
    leftovers: &mut Vec<AgentId>,
    owner: PlayerId,
    layer: Layer,
    config: &SchedulerConfig,
) -> ClusterCircle {
    let positions: Vec<WorldPos> = leftovers.iter().map(|a| agents.pos[a.index()]).collect();
    let radius = config.cluster_radius;
    let mut center = WorldPos::average(&positions).unwrap_or_default();

    let within = |center: WorldPos| -> Vec<AgentId> {
        leftovers
            .iter()
            .copied()
            .filter(|a| agents.pos[a.index()].distance_2d(center) <= radius)
            .collect()
    };
    let mut members = within(center);
    if members.is_empty() {
        center = positions[0];
        members = within(center);
    }
    leftovers.retain(|a| !members.contains(a));

    let blocked = blocked_slices(oracle, center, radius, layer, config.slice_count);
    ClusterCircle { owner, layer, center, radius, members, blocked }
}

/// Averaged source for `members` plus the members that cannot see it.
///
/// Returns `None` when fewer than two members remain or the source has no
/// usable corner.
pub(crate) fn share_group(
    oracle: &dyn BlockingOracle,
    agents: &AgentStore,
    members: &[AgentId],
    layer: Layer,
    corner_search_radius: i32,
) -> Option<(SharedGroup, Vec<AgentId>)> {
    if members.len() < 2 {
        return None;
    }
    let positions: Vec<WorldPos> = members.iter().map(|a| agents.pos[a.index()]).collect();
    let average = WorldPos::average(&positions)?;
    let source = nearest_usable_corner(oracle, average, layer, corner_search_radius)?.to_world();

    let (sharing, excluded): (Vec<AgentId>, Vec<AgentId>) = members
        .iter()
        .copied()
        .partition(|a| segment_clear(oracle, agents.pos[a.index()], source, layer));
    if sharing.len() < 2 {
        return None;
    }
    let radius = sharing.iter().map(|a| agents.radius[a.index()]).max().unwrap_or(0);
    Some((SharedGroup { source, layer, radius, members: sharing, delay: 0 }, excluded))
}

// ── Slices ────────────────────────────────────────────────────────────────────

/// Slice index of `pos` around `center`.  A point at the centre is in slice 0.
pub fn slice_of(center: WorldPos, pos: WorldPos, slice_count: u32) -> usize {
    let width = WAngle::FULL / slice_count as i32;
    let angle = WAngle::of(pos - center).units().rem_euclid(WAngle::FULL);
    (angle / width) as usize
}

/// A slice is blocked when either of its boundary rays, cast from the centre
/// out to the circle edge, crosses a blocked cell.
pub fn blocked_slices(
    oracle: &dyn BlockingOracle,
    center: WorldPos,
    radius: i32,
    layer: Layer,
    slice_count: u32,
) -> Vec<bool> {
    let n = slice_count as usize;
    let width = WAngle::FULL / slice_count as i32;
    let rays: Vec<bool> = (0..n)
        .map(|j| {
            let end = center + WVec::from_angle(WAngle::new(j as i32 * width), radius);
            !segment_clear(oracle, center, end, layer)
        })
        .collect();
    (0..n).map(|i| rays[i] || rays[(i + 1) % n]).collect()
}

/// Maximal runs of open slices, wrapping around the circle.
pub fn open_runs(blocked: &[bool]) -> Vec<Vec<usize>> {
    let n = blocked.len();
    let Some(first_blocked) = blocked.iter().position(|&b| b) else {
        return if n == 0 { Vec::new() } else { vec![(0..n).collect()] };
    };

    // Start scanning right after a blocked slice so no run is split by the
    // wrap point.
    let mut runs = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for k in 1..=n {
        let i = (first_blocked + k) % n;
        if blocked[i] {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(i);
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
