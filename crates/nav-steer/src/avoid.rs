//! Local avoidance: lookahead probing, deflection and separation.

use nav_core::{AgentId, CellPos, HALF_CELL, Layer, WAngle, WVec, WorldPos};
use nav_grid::BlockingOracle;

use crate::context::SteerContext;

/// Smallest deflection step, 22.5°.
pub const DEFLECTION_STEP: i32 = WAngle::FULL / 16;

/// Footprint probe offsets: centre and the four axis points at the radius.
const PROBES: [(i32, i32); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];

/// Something a lookahead ran into.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Obstacle {
    Terrain(CellPos),
    Agent(AgentId),
}

impl Obstacle {
    pub fn position(self, ctx: &SteerContext<'_>) -> WorldPos {
        match self {
            Obstacle::Terrain(cell) => cell.center(),
            Obstacle::Agent(a) => ctx.agents.pos[a.index()],
        }
    }
}

/// Agents a lookahead may walk through.
#[derive(Copy, Clone, Default, Debug)]
pub struct Passable<'a> {
    /// The agent being followed.
    pub target: Option<AgentId>,
    /// Members of the same order.  Held members do not block.
    pub group: &'a [AgentId],
}

impl<'a> Passable<'a> {
    pub fn new(target: Option<AgentId>, group: &'a [AgentId]) -> Self {
        Self { target, group }
    }
}

/// Project `agent`'s footprint along `motion` for the configured number of
/// steps and report the first obstacle met.
///
/// A terrain probe only counts when it would move from an open cell into a
/// blocked one, so an agent already brushing a wall is not stopped by it.
/// Another agent counts when it is attacking or holding still outside the
/// mover's group; with `lookahead_attacking_only` off, every agent counts.
/// It must also overlap the sample, and the sample must be closer to it
/// than the agent is now.
pub fn lookahead(ctx: &SteerContext<'_>, agent: AgentId, motion: WVec, pass: Passable<'_>) -> Option<Obstacle> {
    if motion.is_zero() {
        return None;
    }
    let i = agent.index();
    let agents = ctx.agents;
    let (pos, layer, radius) = (agents.pos[i], agents.layer[i], agents.radius[i]);

    for k in 1..=ctx.config.lookahead_steps as i32 {
        let sample = pos + motion * k;

        for (px, py) in PROBES {
            let offset = WVec::flat(px * radius, py * radius);
            let ahead = (sample + offset).to_cell(layer);
            if ctx.oracle.is_blocked(ahead) && !ctx.oracle.is_blocked((pos + offset).to_cell(layer)) {
                return Some(Obstacle::Terrain(ahead));
            }
        }

        for other in ctx.proximity.within(sample, layer, radius + HALF_CELL) {
            if other == agent || pass.target == Some(other) {
                continue;
            }
            let j = other.index();
            let holding = ctx.holding.get(j).copied().unwrap_or(false) && !pass.group.contains(&other);
            if ctx.config.lookahead_attacking_only && !agents.attacking[j] && !holding {
                continue;
            }
            let theirs = agents.pos[j];
            let d = sample.distance_2d(theirs);
            if d < radius + agents.radius[j] && d < pos.distance_2d(theirs) {
                return Some(Obstacle::Agent(other));
            }
        }
    }
    None
}

/// Signed deflection offsets in try order: ±22.5°, ±45°, … ±157.5°, 180°.
/// `left_first` picks the sign tried first at each magnitude.
pub fn deflection_offsets(left_first: bool) -> impl Iterator<Item = i32> {
    let sign = if left_first { 1 } else { -1 };
    (1..=WAngle::FULL / 2 / DEFLECTION_STEP).flat_map(move |k| {
        let a = k * DEFLECTION_STEP;
        let both = a < WAngle::FULL / 2;
        [Some(sign * a), both.then_some(-sign * a)].into_iter().flatten()
    })
}

/// First deflected copy of `seek` whose lookahead is clear.
///
/// The side away from `obstacle` is tried first: an obstacle to the right of
/// the heading deflects left.  Returns the signed offset and the vector.
pub fn choose_deflection(
    ctx: &SteerContext<'_>,
    agent: AgentId,
    seek: WVec,
    obstacle: WorldPos,
    pass: Passable<'_>,
) -> Option<(i32, WVec)> {
    let pos = ctx.agents.pos[agent.index()];
    let left_first = seek.cross_2d(obstacle - pos) <= 0;
    deflection_offsets(left_first)
        .map(|offset| (offset, seek.rotate(WAngle::new(offset))))
        .find(|&(_, v)| lookahead(ctx, agent, v, pass).is_none())
}

/// Repulsion from nearby agents, at most one tick of movement long.
///
/// Each neighbour within touching distance plus the separation margin pushes
/// with a strength falling linearly to zero at that reach; attacking
/// neighbours push twice as hard.  An attacking agent holds its ground and
/// gets no push at all.
pub fn flee_vector(ctx: &SteerContext<'_>, agent: AgentId) -> WVec {
    separation(ctx, agent, ctx.config.separation_margin)
}

/// Push for an agent without a moving controller: away from every neighbour
/// whose footprint overlaps its own.  Zero once nothing overlaps, and zero
/// for attacking agents.
pub fn yield_vector(ctx: &SteerContext<'_>, agent: AgentId) -> WVec {
    separation(ctx, agent, 0)
}

fn separation(ctx: &SteerContext<'_>, agent: AgentId, margin: i32) -> WVec {
    let i = agent.index();
    let agents = ctx.agents;
    if agents.attacking[i] {
        return WVec::ZERO;
    }
    let (pos, layer, radius, speed) = (agents.pos[i], agents.layer[i], agents.radius[i], agents.speed[i]);

    let mut total = WVec::ZERO;
    for other in ctx.proximity.within(pos, layer, radius + HALF_CELL + margin) {
        if other == agent {
            continue;
        }
        let j = other.index();
        let reach = radius + agents.radius[j] + margin;
        let away = pos - agents.pos[j];
        let d = away.length_2d();
        if d >= reach {
            continue;
        }
        let mut strength = (speed as i64 * (reach - d) as i64 / reach as i64) as i32;
        if agents.attacking[j] {
            strength *= 2;
        }
        total += if d == 0 {
            // Stacked exactly: split along x by id.
            WVec::flat(if agent > other { strength } else { -strength }, 0)
        } else {
            away.with_length_2d(strength)
        };
    }
    total.clamp_length_2d(speed)
}

/// First candidate velocity whose end point stays on the map and does not
/// step from an open cell into a blocked one.  Falls back to standing still.
pub fn commit(oracle: &dyn BlockingOracle, pos: WorldPos, layer: Layer, candidates: &[WVec]) -> (WorldPos, WVec) {
    let from_open = !oracle.is_blocked(pos.to_cell(layer));
    let bounds = oracle.bounds();
    for &v in candidates {
        let next = bounds.clamp_world(pos + v);
        if !from_open || !oracle.is_blocked(next.to_cell(layer)) {
            return (next, next - pos);
        }
    }
    (pos, WVec::ZERO)
}
