//! Corner-graph helpers: neighbour enumeration and endpoint snapping.

use nav_core::{CornerPos, Layer, WorldPos};

use crate::line::corner_line_of_sight;
use crate::oracle::BlockingOracle;

/// King-move offsets in a fixed order.  Expansion order (and therefore
/// insertion order into the open list) follows this table.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// `true` if the single step `from → to` between adjacent corners is
/// traversable.
#[inline]
pub fn can_step(oracle: &dyn BlockingOracle, from: CornerPos, to: CornerPos) -> bool {
    from.is_adjacent(to)
        && oracle.bounds().contains_corner(to)
        && corner_line_of_sight(oracle, from, to)
}

/// Traversable neighbours of `corner`, in [`NEIGHBOR_OFFSETS`] order.
pub fn neighbors(oracle: &dyn BlockingOracle, corner: CornerPos) -> impl Iterator<Item = CornerPos> + '_ {
    NEIGHBOR_OFFSETS
        .iter()
        .map(move |&(dx, dy)| corner.offset(dx, dy))
        .filter(move |&n| can_step(oracle, corner, n))
}

/// Chebyshev radius of the window a corner must be able to walk out of to
/// count as usable.
const POCKET_RADIUS: i32 = 2;

/// A corner is usable as a search endpoint if it is on the map and not
/// isolated: stepping through traversable moves it can leave the
/// `(2·POCKET_RADIUS + 1)²` window around itself.
///
/// This rejects fully blocked corners (no moves at all) as well as the
/// corners of a single open cell walled in on all sides, whose moves only
/// lead to each other.
pub fn is_corner_usable(oracle: &dyn BlockingOracle, corner: CornerPos) -> bool {
    const SIDE: usize = (2 * POCKET_RADIUS + 1) as usize;
    if !oracle.bounds().contains_corner(corner) {
        return false;
    }
    let mut seen = [[false; SIDE]; SIDE];
    seen[POCKET_RADIUS as usize][POCKET_RADIUS as usize] = true;
    let mut stack = vec![corner];

    while let Some(c) = stack.pop() {
        for n in neighbors(oracle, c) {
            let (dx, dy) = (n.x - corner.x, n.y - corner.y);
            if dx.abs() >= POCKET_RADIUS || dy.abs() >= POCKET_RADIUS {
                return true;
            }
            let (ix, iy) = ((dx + POCKET_RADIUS) as usize, (dy + POCKET_RADIUS) as usize);
            if !seen[iy][ix] {
                seen[iy][ix] = true;
                stack.push(n);
            }
        }
    }
    false
}

/// Snap a world point to a usable corner.
///
/// 1. The four corners of the cell containing `pos` are ranked by distance
///    to `pos`; the closest, clamped to the map, is the candidate.
/// 2. If the candidate is unusable, Chebyshev rings of radius `1..=radius`
///    around it are scanned.  The first ring holding any usable corner wins,
///    and within that ring the corner closest to `pos` is picked (ties go to
///    the lowest `(y, x)`).
///
/// Returns `None` if nothing usable lies within `radius` rings.
pub fn nearest_usable_corner(
    oracle: &dyn BlockingOracle,
    pos: WorldPos,
    layer: Layer,
    radius: i32,
) -> Option<CornerPos> {
    let bounds = oracle.bounds();
    let pos = bounds.clamp_world(pos);
    let cell = pos.to_cell(layer);

    let candidate = [(0, 0), (1, 0), (0, 1), (1, 1)]
        .iter()
        .map(|&(dx, dy)| CornerPos::new(cell.x + dx, cell.y + dy, layer))
        .min_by_key(|c| (c.to_world().distance_2d_squared(pos), c.y, c.x))
        .map(|c| bounds.clamp_corner(c))?;

    if is_corner_usable(oracle, candidate) {
        return Some(candidate);
    }

    for r in 1..=radius {
        let mut best: Option<(i64, CornerPos)> = None;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx.abs() != r && dy.abs() != r {
                    continue;
                }
                let c = candidate.offset(dx, dy);
                if !is_corner_usable(oracle, c) {
                    continue;
                }
                let d = c.to_world().distance_2d_squared(pos);
                // Row-major scan order already yields lowest (y, x) first.
                if best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, c));
                }
            }
        }
        if let Some((_, c)) = best {
            log::trace!("snapped {pos} to {c} at ring {r}");
            return Some(c);
        }
    }
    None
}
