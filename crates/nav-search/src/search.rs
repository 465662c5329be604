//! `PathfinderSearch`: one incremental Theta* search over grid corners.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──► Running ──expand(n)──► … ──► Found  (path ready)
//!                                   └──► Failed (empty path)
//! ```
//!
//! A search is created by the scheduler, advanced by bounded
//! [`expand`](PathfinderSearch::expand) calls spread over many ticks, and
//! finishes exactly once.  All progress lives in the open list and the state
//! arena, so "suspending" is simply returning from `expand`.
//!
//! # Algorithm
//!
//! Best-first search ordered by `f = g + h` with `h` the straight-line
//! distance to the goal corner.  When a corner is expanded, each traversable
//! neighbour is first offered to the expanded corner's *parent*: if the
//! parent sees the neighbour, the neighbour is re-parented there with cost
//! `g(parent) + |parent → neighbour|`, skipping the intermediate corner.
//! Otherwise the ordinary grid step is used.
//!
//! The search stops successfully once the popped corner's `f` is no better
//! than the goal's best known `g`; with a consistent heuristic no remaining
//! entry can improve on it.

use rustc_hash::FxHashMap;

use nav_core::{AgentId, CornerPos, Layer, PathfinderConfig, SearchId, WorldPos};
use nav_grid::{BlockingOracle, corner_line_of_sight, nearest_usable_corner, neighbors, segment_clear};

use crate::pad::pad_corner;
use crate::path::Path;
use crate::state::{ListTag, OpenList, SearchState};

// ── SearchRequest ─────────────────────────────────────────────────────────────

/// Everything needed to start a search.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchRequest {
    pub source:      WorldPos,
    pub destination: WorldPos,
    pub layer:       Layer,
    /// Footprint radius used for corner padding.
    pub radius:      i32,
}

impl SearchRequest {
    pub fn new(source: WorldPos, destination: WorldPos, layer: Layer, radius: i32) -> Self {
        Self { source, destination, layer, radius }
    }
}

// ── SearchStatus ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    Running,
    /// Goal reached; the path is available.
    Found,
    /// Open list exhausted, expansion cap hit, or no usable endpoint.  The
    /// path is empty.
    Failed,
}

impl SearchStatus {
    #[inline]
    pub fn is_finished(self) -> bool {
        self != SearchStatus::Running
    }
}

// ── PathfinderSearch ──────────────────────────────────────────────────────────

pub struct PathfinderSearch {
    id:      SearchId,
    request: SearchRequest,

    start: CornerPos,
    goal:  CornerPos,
    /// The goal corner had to be found by ring search rather than taken from
    /// the destination's own cell.
    goal_remapped: bool,

    states: FxHashMap<CornerPos, SearchState>,
    open:   OpenList,

    expansions:     u32,
    max_expansions: u32,
    status:         SearchStatus,

    corner_path: Vec<CornerPos>,
    path:        Path,

    /// Ticks to sit idle before the first expansion.
    delay: u32,
    /// Agents that will receive this search's path.
    agents: Vec<AgentId>,
}

impl PathfinderSearch {
    /// Snap both endpoints to usable corners and seed the open list.
    ///
    /// Finishes immediately (without expanding) when `source == destination`
    /// or when either endpoint has no usable corner nearby.
    pub fn new(
        id: SearchId,
        request: SearchRequest,
        config: &PathfinderConfig,
        oracle: &dyn BlockingOracle,
    ) -> Self {
        let layer = request.layer;
        let radius = config.nearest_corner_search_radius;
        let mut search = Self {
            id,
            request,
            start: CornerPos::default(),
            goal: CornerPos::default(),
            goal_remapped: false,
            states: FxHashMap::default(),
            open: OpenList::default(),
            expansions: 0,
            max_expansions: config.max_expansions,
            status: SearchStatus::Running,
            corner_path: Vec::new(),
            path: Path::empty(),
            delay: 0,
            agents: Vec::new(),
        };

        if search.request.source == search.request.destination {
            search.status = SearchStatus::Found;
            return search;
        }

        let start = nearest_usable_corner(oracle, search.request.source, layer, radius);
        let goal = nearest_usable_corner(oracle, search.request.destination, layer, radius);
        let (Some(start), Some(goal)) = (start, goal) else {
            log::debug!("{id}: no usable corner near an endpoint");
            search.status = SearchStatus::Failed;
            return search;
        };

        search.start = start;
        search.goal = goal;
        search.goal_remapped = {
            let dest = search.request.destination;
            let cell = dest.to_cell(layer);
            oracle.is_blocked(cell)
                || !(cell.x..=cell.x + 1).contains(&goal.x)
                || !(cell.y..=cell.y + 1).contains(&goal.y)
        };

        let mut state = SearchState::unvisited(start, start.distance(goal));
        state.g = 0;
        let f = state.f();
        search.open.push(start, f, &mut state);
        search.states.insert(start, state);
        search
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> SearchId {
        self.id
    }

    #[inline]
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    #[inline]
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Total expansions performed so far.
    #[inline]
    pub fn expansions(&self) -> u32 {
        self.expansions
    }

    /// Number of corners that have a search record.
    #[inline]
    pub fn visited(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    pub fn start_corner(&self) -> CornerPos {
        self.start
    }

    pub fn goal_corner(&self) -> CornerPos {
        self.goal
    }

    /// The record for `corner`, if the search has reached it.
    pub fn state(&self, corner: CornerPos) -> Option<&SearchState> {
        self.states.get(&corner)
    }

    /// Every visited corner and its record, in no particular order.  Meant
    /// for debug overlays.
    pub fn states(&self) -> impl Iterator<Item = (&CornerPos, &SearchState)> + '_ {
        self.states.iter()
    }

    /// The finished path.  Empty while running and after failure.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unpadded corner sequence of a found path, start to goal.
    #[inline]
    pub fn corner_path(&self) -> &[CornerPos] {
        &self.corner_path
    }

    // ── Sharing & staggering ──────────────────────────────────────────────

    #[inline]
    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    pub fn add_agent(&mut self, agent: AgentId) {
        if !self.agents.contains(&agent) {
            self.agents.push(agent);
        }
    }

    /// Detach `agent`; returns `true` if it was attached.
    pub fn remove_agent(&mut self, agent: AgentId) -> bool {
        let before = self.agents.len();
        self.agents.retain(|&a| a != agent);
        self.agents.len() != before
    }

    #[inline]
    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn set_delay(&mut self, ticks: u32) {
        self.delay = ticks;
    }

    /// Spend one tick of delay.  Returns `true` if the search must sit this
    /// tick out.
    pub fn consume_delay(&mut self) -> bool {
        if self.delay > 0 {
            self.delay -= 1;
            true
        } else {
            false
        }
    }

    // ── Expansion ─────────────────────────────────────────────────────────

    /// Perform up to `budget` expansions.  Returns the number performed.
    pub fn expand(&mut self, oracle: &dyn BlockingOracle, budget: u32) -> u32 {
        let mut done = 0;
        while done < budget && self.status == SearchStatus::Running {
            if self.expansions >= self.max_expansions {
                log::debug!("{}: expansion cap {} reached", self.id, self.max_expansions);
                self.finish_failed();
                break;
            }
            let Some((f, current)) = self.open.pop() else {
                log::debug!("{}: open list exhausted after {} expansions", self.id, self.expansions);
                self.finish_failed();
                break;
            };
            done += 1;
            self.expansions += 1;

            let goal_g = self.states.get(&self.goal).map_or(i64::MAX, |s| s.g);
            if f >= goal_g {
                self.finish_found(oracle);
                break;
            }

            let (cur_g, cur_parent) = match self.states.get_mut(&current) {
                Some(s) => {
                    s.list = ListTag::Closed;
                    s.open_key = None;
                    (s.g, s.parent)
                }
                None => continue,
            };
            let parent_g = self.states.get(&cur_parent).map_or(i64::MAX, |s| s.g);

            for n in neighbors(oracle, current) {
                if self.states.get(&n).is_some_and(|s| s.list == ListTag::Closed) {
                    continue;
                }
                let (g, parent) = if cur_parent != current && corner_line_of_sight(oracle, cur_parent, n) {
                    (parent_g + cur_parent.distance(n), cur_parent)
                } else {
                    (cur_g + current.distance(n), current)
                };

                let goal = self.goal;
                let state = self
                    .states
                    .entry(n)
                    .or_insert_with(|| SearchState::unvisited(n, n.distance(goal)));
                if g < state.g {
                    state.g = g;
                    state.parent = parent;
                    let f = state.f();
                    self.open.push(n, f, state);
                }
            }
        }
        done
    }

    /// Run to completion (bounded by the expansion cap).
    pub fn run_to_end(&mut self, oracle: &dyn BlockingOracle) {
        while !self.is_finished() {
            self.expand(oracle, u32::MAX);
        }
    }

    // ── Completion ────────────────────────────────────────────────────────

    fn finish_failed(&mut self) {
        self.status = SearchStatus::Failed;
        self.path = Path::empty();
    }

    fn finish_found(&mut self, oracle: &dyn BlockingOracle) {
        // Walk parent keys from the goal; the start is its own parent.
        let mut corners = vec![self.goal];
        let mut cur = self.goal;
        for _ in 0..self.states.len() {
            match self.states.get(&cur) {
                Some(s) if s.parent != cur => {
                    cur = s.parent;
                    corners.push(cur);
                }
                _ => break,
            }
        }
        corners.reverse();

        let layer = self.request.layer;
        let radius = self.request.radius;
        let mut points: Vec<WorldPos> = corners.iter().map(|&c| pad_corner(oracle, c, radius)).collect();

        // Finish at the literal destination when it is reachable from the
        // goal corner's cell; otherwise stop at the (remapped) goal corner.
        let dest = self.request.destination;
        if !self.goal_remapped {
            let n = points.len();
            if n >= 2 && segment_clear(oracle, points[n - 2], dest, layer) {
                points[n - 1] = dest;
            } else {
                points.push(dest);
            }
        }

        self.path = Path::new(points);
        self.corner_path = corners;
        self.status = SearchStatus::Found;
        log::debug!(
            "{}: found {} waypoints after {} expansions ({} corners visited)",
            self.id,
            self.path.len(),
            self.expansions,
            self.states.len()
        );
    }
}
