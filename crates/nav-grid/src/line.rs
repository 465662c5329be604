//! Line-of-sight walkers.
//!
//! Two flavours share one set of traversal rules:
//!
//! - [`corner_line_of_sight`] — between two *corners*, used by the any-angle
//!   search both for neighbour validity and for parent relaxation.  An
//!   incremental Bresenham-style walk in corner space with an integer error
//!   accumulator.
//! - [`segment_clear`] / [`first_blocked_on_segment`] — between two arbitrary
//!   *world points*, used by clustering and steering.  An integer grid
//!   traversal that visits every cell the segment touches.
//!
//! # Rules
//!
//! 1. Every cell the line passes through the interior of must be open.
//! 2. A line running exactly *along* a grid edge is blocked only if the cells
//!    on **both** sides of that edge are blocked.
//! 3. A line passing exactly *through* an intermediate corner is blocked if
//!    either diagonal pair of cells around that corner is fully blocked (no
//!    squeezing between two diagonally touching obstacles).
//!
//! Endpoints are exempt from rule 3 so a path may start or end on a pinched
//! corner.
//!
//! The world walker applies rule 2 conservatively: a point lying exactly on
//! a boundary belongs to the cell above/right of it (floor division), and
//! that cell is checked.

use nav_core::{CellPos, CornerPos, Layer, WorldPos, CELL_SIZE};

use crate::oracle::BlockingOracle;

/// `true` if either diagonal pair of cells around the lattice point `(x, y)`
/// is fully blocked.
#[inline]
fn is_pinched(oracle: &dyn BlockingOracle, x: i32, y: i32, layer: Layer) -> bool {
    let b = |cx: i32, cy: i32| oracle.is_blocked(CellPos::new(cx, cy, layer));
    let (sw, se, nw, ne) = (b(x - 1, y - 1), b(x, y - 1), b(x - 1, y), b(x, y));
    (sw && ne) || (se && nw)
}

// ── Corner to corner ──────────────────────────────────────────────────────────

/// Unobstructed straight line between two corners on the same layer.
///
/// Corners on different layers never see each other.
pub fn corner_line_of_sight(oracle: &dyn BlockingOracle, from: CornerPos, to: CornerPos) -> bool {
    if from.layer != to.layer {
        return false;
    }
    let layer = from.layer;
    let blocked = |x: i32, y: i32| oracle.is_blocked(CellPos::new(x, y, layer));

    let (mut x0, mut y0) = (from.x, from.y);
    let (x1, y1) = (to.x, to.y);
    let (mut dx, mut dy) = (x1 - x0, y1 - y0);
    let sx = if dx < 0 { dx = -dx; -1 } else { 1 };
    let sy = if dy < 0 { dy = -dy; -1 } else { 1 };
    // Offset from a corner to the cell lying ahead of it in the step direction.
    let ox = (sx - 1) / 2;
    let oy = (sy - 1) / 2;
    let mut f = 0;

    if dx >= dy {
        while x0 != x1 {
            f += dy;
            if f >= dx {
                if blocked(x0 + ox, y0 + oy) {
                    return false;
                }
                y0 += sy;
                f -= dx;
            }
            if f != 0 && blocked(x0 + ox, y0 + oy) {
                return false;
            }
            if dy == 0 && blocked(x0 + ox, y0) && blocked(x0 + ox, y0 - 1) {
                return false;
            }
            x0 += sx;
            if f == 0 && x0 != x1 && is_pinched(oracle, x0, y0, layer) {
                return false;
            }
        }
    } else {
        while y0 != y1 {
            f += dx;
            if f >= dy {
                if blocked(x0 + ox, y0 + oy) {
                    return false;
                }
                x0 += sx;
                f -= dy;
            }
            if f != 0 && blocked(x0 + ox, y0 + oy) {
                return false;
            }
            if dx == 0 && blocked(x0, y0 + oy) && blocked(x0 - 1, y0 + oy) {
                return false;
            }
            y0 += sy;
            if f == 0 && y0 != y1 && is_pinched(oracle, x0, y0, layer) {
                return false;
            }
        }
    }
    true
}

// ── World segment ─────────────────────────────────────────────────────────────

/// The first blocked cell met walking from `a` to `b`, or `None` if the
/// segment is clear.
///
/// Crossing boundaries are compared as exact rationals (`distance · |d|`
/// cross-multiplied in `i64`), so the walk is deterministic and never skips a
/// cell to rounding.
pub fn first_blocked_on_segment(
    oracle: &dyn BlockingOracle,
    a: WorldPos,
    b: WorldPos,
    layer: Layer,
) -> Option<CellPos> {
    let mut cell = a.to_cell(layer);
    let end = b.to_cell(layer);
    if oracle.is_blocked(cell) {
        return Some(cell);
    }

    let dx = (b.x - a.x) as i64;
    let dy = (b.y - a.y) as i64;
    let (adx, ady) = (dx.abs(), dy.abs());
    let sx = dx.signum() as i32;
    let sy = dy.signum() as i32;
    let cs = CELL_SIZE as i64;
    let max_steps = (end.x - cell.x).abs() + (end.y - cell.y).abs() + 2;

    for _ in 0..max_steps {
        if cell.x == end.x && cell.y == end.y {
            return None;
        }

        // Distance (along each axis) from `a` to the next boundary crossing.
        let nx = match sx {
            1 => (cell.x as i64 + 1) * cs - a.x as i64,
            -1 => a.x as i64 - cell.x as i64 * cs,
            _ => i64::MAX,
        };
        let ny = match sy {
            1 => (cell.y as i64 + 1) * cs - a.y as i64,
            -1 => a.y as i64 - cell.y as i64 * cs,
            _ => i64::MAX,
        };
        // Parametric crossing times are nx/adx and ny/ady; compare without
        // dividing.  A crossing past t = 1 means the segment ends first.
        let x_ok = sx != 0 && nx <= adx;
        let y_ok = sy != 0 && ny <= ady;
        if !x_ok && !y_ok {
            return None;
        }
        let tx = if x_ok { nx as i128 * ady.max(1) as i128 } else { i128::MAX };
        let ty = if y_ok { ny as i128 * adx.max(1) as i128 } else { i128::MAX };

        if tx < ty {
            cell = cell.offset(sx, 0);
        } else if ty < tx {
            cell = cell.offset(0, sy);
        } else {
            // Exactly through a lattice point.
            let side_a = cell.offset(sx, 0);
            let side_b = cell.offset(0, sy);
            if oracle.is_blocked(side_a) && oracle.is_blocked(side_b) {
                return Some(side_a);
            }
            cell = cell.offset(sx, sy);
        }

        if oracle.is_blocked(cell) {
            return Some(cell);
        }
    }
    None
}

/// `true` if every cell the segment `a → b` touches is open.
#[inline]
pub fn segment_clear(oracle: &dyn BlockingOracle, a: WorldPos, b: WorldPos, layer: Layer) -> bool {
    first_blocked_on_segment(oracle, a, b, layer).is_none()
}
