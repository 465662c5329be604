//! `SteeringController`: turns a delivered path into per-tick motion.
//!
//! # Step
//!
//! ```text
//! step(ctx)
//!   1. resolve target (live position, else last known, else TargetLost)
//!   2. advance waypoints (own radius, or a group member already there)
//!   3. seek = toward waypoint, length min(speed, distance)
//!   4. lookahead(seek) ─ clear ─────────────► Following, use seek
//!                      └ hit ─► deflection ─► Blocked,   use deflected
//!                                └ none ───► Blocked,   keep blocked vector
//!   5. + flee from neighbours, clamp to speed, turn facing
//!   6. stall: too little net movement, or no progress toward the
//!      waypoint for a full window → Blocked, later re-path, then Stuck
//! ```

use nav_core::{AgentId, SearchId, SteeringConfig, WAngle, WVec, WorldPos};
use nav_grid::segment_clear;
use nav_search::{Path, SearchRequest};

use crate::avoid::{Passable, choose_deflection, commit, flee_vector, lookahead};
use crate::context::SteerContext;
use crate::error::{SteerError, SteerResult};
use crate::history::PositionHistory;
use crate::intent::SteerIntent;
use crate::state::{MoveOutcome, SteeringState};
use crate::target::MoveTarget;

/// A deflected heading kept for a few ticks.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Deflection {
    /// Signed offset from the seek direction, in angle units.
    pub offset: i32,
    pub vector: WVec,
    pub ttl:    u32,
}

pub struct SteeringController {
    agent:  AgentId,
    target: MoveTarget,
    /// Last position the target was seen at.
    last_known: Option<WorldPos>,

    state: SteeringState,
    path:  Path,
    /// Set on delivery; the first step may skip the path's first waypoint.
    fresh_path: bool,
    last_completed: Option<WorldPos>,

    history:       PositionHistory,
    /// Current waypoint and the closest this agent has come to it.
    closest:       Option<(WorldPos, i32)>,
    /// Ticks since `closest` last improved by half a tick of movement.
    no_progress:   u32,
    stalled_ticks: u32,
    retries:       u32,

    deflection:     Option<Deflection>,
    blocked_vector: Option<WVec>,

    /// Agents moved by the same order.
    group: Vec<AgentId>,
}

impl SteeringController {
    /// A controller waiting for `search`.  `last_known` is the target
    /// position at order time, if it was visible.
    pub fn new(
        agent: AgentId,
        target: MoveTarget,
        last_known: Option<WorldPos>,
        search: SearchId,
        config: &SteeringConfig,
    ) -> Self {
        Self {
            agent,
            target,
            last_known,
            state: SteeringState::AwaitingPath { search },
            path: Path::empty(),
            fresh_path: false,
            last_completed: None,
            history: PositionHistory::new(config.stuck_buffer_len),
            closest: None,
            no_progress: 0,
            stalled_ticks: 0,
            retries: 0,
            deflection: None,
            blocked_vector: None,
            group: Vec::new(),
        }
    }

    /// Agents ordered together with this one.
    pub fn with_group(mut self, group: Vec<AgentId>) -> Self {
        self.group = group;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    #[inline]
    pub fn state(&self) -> SteeringState {
        self.state
    }

    pub fn target(&self) -> MoveTarget {
        self.target
    }

    /// Remaining waypoints.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_completed(&self) -> Option<WorldPos> {
        self.last_completed
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn stalled_ticks(&self) -> u32 {
        self.stalled_ticks
    }

    /// Ticks without getting closer to the current waypoint.
    pub fn ticks_without_progress(&self) -> u32 {
        self.no_progress
    }

    pub fn deflection(&self) -> Option<Deflection> {
        self.deflection
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    /// The search this controller is waiting for, if any.
    pub fn awaited_search(&self) -> Option<SearchId> {
        match self.state {
            SteeringState::AwaitingPath { search } => Some(search),
            _ => None,
        }
    }

    // ── Transitions driven by the host ────────────────────────────────────

    /// Hand over the path of the awaited search.
    ///
    /// An empty path degenerates to a direct hop to the target.  Deliveries
    /// for any other search are refused.
    pub fn deliver(&mut self, search: SearchId, path: Path) -> SteerResult<()> {
        match self.state {
            SteeringState::AwaitingPath { search: awaited } if awaited == search => {
                self.path = if path.is_empty() {
                    self.last_known.map(Path::direct).unwrap_or_default()
                } else {
                    path
                };
                self.fresh_path = true;
                self.reset_stall();
                self.state = SteeringState::Following;
                Ok(())
            }
            SteeringState::Completed(_) => Err(SteerError::AlreadyCompleted(self.agent)),
            _ => Err(SteerError::UnexpectedDelivery { agent: self.agent, search }),
        }
    }

    /// Wait for `search` (the re-path submitted for this controller's last
    /// `repath` request).
    pub fn await_search(&mut self, search: SearchId) {
        if !self.state.is_completed() {
            self.state = SteeringState::AwaitingPath { search };
        }
    }

    pub fn cancel(&mut self) {
        self.finish(MoveOutcome::Cancelled);
    }

    // ── Step ──────────────────────────────────────────────────────────────

    /// Compute this tick's motion.  Reads only `ctx` and the controller's own
    /// state.
    pub fn step(&mut self, ctx: &SteerContext<'_>) -> SteerIntent {
        let agent = self.agent;
        let i = agent.index();
        let agents = ctx.agents;
        let (pos, layer, radius, speed) = (agents.pos[i], agents.layer[i], agents.radius[i], agents.speed[i]);
        let mut intent = SteerIntent::hold(agent, pos, agents.facing[i], self.state);

        if !self.state.is_moving() {
            return intent;
        }
        if !agents.is_alive(agent) {
            return self.complete(intent, MoveOutcome::Cancelled);
        }

        // 1. Target.
        let goal = match self.target.live_position(agents) {
            Some(p) => {
                self.last_known = Some(p);
                p
            }
            None => match self.last_known {
                Some(p) => p,
                None => return self.complete(intent, MoveOutcome::TargetLost),
            },
        };
        if matches!(self.target, MoveTarget::Agent(_)) && self.path.len() == 1 && self.path.front() != Some(goal) {
            self.path = Path::direct(goal);
        }

        // 2. Waypoints.
        if self.fresh_path {
            self.fresh_path = false;
            if let Some(second) = self.path.get(1) {
                if segment_clear(ctx.oracle, pos, second, layer) {
                    self.path.pop_front();
                }
            }
        }
        while let Some(wp) = self.path.front() {
            // Reaching a followed agent means touching it, not standing on it.
            let reach = match self.target {
                MoveTarget::Agent(t) if self.path.len() == 1 => {
                    radius + agents.radius.get(t.index()).copied().unwrap_or(0)
                }
                _ => radius,
            };
            if pos.distance_2d(wp) <= reach || self.group_reached(ctx, pos, wp) {
                self.last_completed = Some(wp);
                intent.waypoint_reached = Some(wp);
                self.path.pop_front();
            } else {
                break;
            }
        }
        let Some(waypoint) = self.path.front() else {
            return self.complete(intent, MoveOutcome::Arrived);
        };

        // 3. Seek.
        let to_wp = waypoint - pos;
        let seek = to_wp.with_length_2d(speed.min(to_wp.length_2d()));

        // 4. Lookahead and deflection.
        let target = match self.target {
            MoveTarget::Agent(t) => Some(t),
            MoveTarget::Position(_) => None,
        };
        let pass = Passable::new(target, &self.group);
        let active = self.deflection.filter(|d| d.ttl > 0);
        let seek_hit = lookahead(ctx, agent, seek, pass);
        let motion = match (seek_hit, active) {
            (None, None) => {
                self.deflection = None;
                self.blocked_vector = None;
                self.state = SteeringState::Following;
                seek
            }
            (_, Some(d)) if lookahead(ctx, agent, d.vector, pass).is_none() => {
                self.deflection = Some(Deflection { ttl: d.ttl - 1, ..d });
                self.state = SteeringState::Blocked;
                d.vector
            }
            (None, Some(_)) => {
                self.deflection = None;
                self.state = SteeringState::Following;
                seek
            }
            (Some(obstacle), _) => {
                self.state = SteeringState::Blocked;
                match choose_deflection(ctx, agent, seek, obstacle.position(ctx), pass) {
                    Some((offset, vector)) => {
                        log::trace!("{agent}: deflecting by {offset} around {obstacle:?}");
                        self.deflection = Some(Deflection { offset, vector, ttl: ctx.config.deflection_ttl });
                        self.blocked_vector = None;
                        intent.deflection = Some(offset);
                        vector
                    }
                    None => {
                        self.deflection = None;
                        *self.blocked_vector.insert(seek)
                    }
                }
            }
        };

        // 5. Separation, speed cap, facing.
        let velocity = (motion + flee_vector(ctx, agent)).clamp_length_2d(speed);
        let (position, velocity) = commit(ctx.oracle, pos, layer, &[velocity, motion]);
        intent.position = position;
        intent.velocity = velocity;
        if !velocity.is_zero() {
            intent.facing = intent.facing.turn_towards(WAngle::of(velocity), ctx.config.turn_rate);
        }

        // 6. Stall detection.
        self.history.push(position);
        let remaining = position.distance_2d(waypoint);
        match self.closest {
            Some((wp, best)) if wp == waypoint => {
                if remaining + speed / 2 <= best {
                    self.closest = Some((waypoint, remaining));
                    self.no_progress = 0;
                } else {
                    self.no_progress += 1;
                }
            }
            _ => {
                self.closest = Some((waypoint, remaining));
                self.no_progress = 0;
            }
        }
        let idle = self.history.net_displacement().is_some_and(|d| d < speed);
        let wandering = self.no_progress as usize >= ctx.config.stuck_buffer_len;
        let stalled = (idle || wandering) && self.last_completed != Some(waypoint);
        if stalled {
            self.stalled_ticks += 1;
            self.state = SteeringState::Blocked;
        } else {
            self.stalled_ticks = 0;
        }
        if self.stalled_ticks >= ctx.config.repath_after_stuck_ticks {
            if self.retries >= ctx.config.max_repath_retries {
                log::warn!("{agent}: still stuck after {} re-paths, halting", self.retries);
                return self.complete(intent, MoveOutcome::Stuck);
            }
            self.retries += 1;
            log::debug!("{agent}: stuck for {} ticks, re-path {}", self.stalled_ticks, self.retries);
            self.reset_stall();
            self.deflection = None;
            self.blocked_vector = None;
            self.path = Path::empty();
            self.state = SteeringState::AwaitingPath { search: SearchId::INVALID };
            intent.repath = Some(SearchRequest::new(position, goal, layer, radius));
        }

        intent.state = self.state;
        intent
    }

    /// `true` if another member of the group has completed `wp` and this
    /// agent is close enough to take the shortcut.
    fn group_reached(&self, ctx: &SteerContext<'_>, pos: WorldPos, wp: WorldPos) -> bool {
        if pos.distance_2d(wp) > ctx.config.group_shortcut_radius {
            return false;
        }
        let done_by_member = self
            .group
            .iter()
            .any(|&g| g != self.agent && ctx.completed.get(g.index()).copied().flatten() == Some(wp));
        if !done_by_member {
            return false;
        }
        let layer = ctx.agents.layer[self.agent.index()];
        self.path.get(1).is_none_or(|next| segment_clear(ctx.oracle, pos, next, layer))
    }

    fn complete(&mut self, mut intent: SteerIntent, outcome: MoveOutcome) -> SteerIntent {
        self.finish(outcome);
        intent.state = self.state;
        intent.completed = Some(outcome);
        intent
    }

    fn finish(&mut self, outcome: MoveOutcome) {
        self.state = SteeringState::Completed(outcome);
        self.path = Path::empty();
        self.reset_stall();
        self.deflection = None;
        self.blocked_vector = None;
    }

    fn reset_stall(&mut self) {
        self.history.clear();
        self.closest = None;
        self.no_progress = 0;
        self.stalled_ticks = 0;
    }
}
