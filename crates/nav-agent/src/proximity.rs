//! Per-tick spatial index over live agents.
//!
//! # Lifetime
//!
//! Rebuilt once at the start of the steering phase from the positions
//! committed last tick (`RTree::bulk_load`, O(N log N)), then queried
//! read-only by every agent's intent computation.  Positions committed during
//! the apply phase are not reflected until the next rebuild.
//!
//! # Determinism
//!
//! R-tree iteration order depends on tree shape, so every query that returns
//! several agents sorts its result by `AgentId`.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use nav_core::{AgentId, Layer, WorldPos};

use crate::AgentStore;

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D `[x, y]` point in world units with the
/// agent it belongs to.  `i64` so squared distances cannot overflow.
#[derive(Clone)]
struct AgentEntry {
    point: [i64; 2],
    layer: Layer,
    id:    AgentId,
}

impl RTreeObject for AgentEntry {
    type Envelope = AABB<[i64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentEntry {
    fn distance_2(&self, point: &[i64; 2]) -> i64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

#[inline]
fn key(pos: WorldPos) -> [i64; 2] {
    [pos.x as i64, pos.y as i64]
}

// ── ProximityIndex ────────────────────────────────────────────────────────────

pub struct ProximityIndex {
    tree: RTree<AgentEntry>,
}

impl ProximityIndex {
    pub fn empty() -> Self {
        Self { tree: RTree::new() }
    }

    /// Index every live agent in `store`.
    pub fn build(store: &AgentStore) -> Self {
        let entries: Vec<AgentEntry> = store
            .agent_ids()
            .filter(|&a| store.alive[a.index()])
            .map(|a| AgentEntry {
                point: key(store.pos[a.index()]),
                layer: store.layer[a.index()],
                id:    a,
            })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Live agents on `layer` within `radius` of `pos` (inclusive), sorted
    /// by id.
    pub fn within(&self, pos: WorldPos, layer: Layer, radius: i32) -> Vec<AgentId> {
        let r = radius.max(0) as i64;
        let mut out: Vec<AgentId> = self
            .tree
            .locate_within_distance(key(pos), r * r)
            .filter(|e| e.layer == layer)
            .map(|e| e.id)
            .collect();
        out.sort_unstable();
        out
    }

    /// The closest live agent on `layer` to `pos`, other than `exclude`.
    /// Equidistant agents resolve to the lowest id.
    pub fn nearest(&self, pos: WorldPos, layer: Layer, exclude: Option<AgentId>) -> Option<AgentId> {
        let mut best: Option<(i64, AgentId)> = None;
        for e in self.tree.nearest_neighbor_iter(&key(pos)) {
            if e.layer != layer || Some(e.id) == exclude {
                continue;
            }
            let d = e.distance_2(&key(pos));
            match best {
                Some((bd, _)) if d > bd => break,
                Some((bd, bid)) if d == bd && bid < e.id => {}
                _ => best = Some((d, e.id)),
            }
        }
        best.map(|(_, id)| id)
    }
}

impl Default for ProximityIndex {
    fn default() -> Self {
        Self::empty()
    }
}
