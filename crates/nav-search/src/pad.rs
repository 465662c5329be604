//! Corner padding.
//!
//! A path that turns around a convex obstacle corner would drag the agent's
//! footprint across the blocked cell.  Each waypoint is nudged diagonally by
//! the footprint radius, away from a lone blocked cell or into a lone open
//! cell.  All other patterns keep the exact corner:
//!
//! | Blocked cells around the corner | Offset                          |
//! |---------------------------------|---------------------------------|
//! | 0, 4                            | none                            |
//! | 1                               | `(±r, ±r)` away from that cell  |
//! | 2 (wall or diagonal pair)       | none                            |
//! | 3                               | `(±r, ±r)` into the open cell   |

use nav_core::{CornerPos, WorldPos};
use nav_grid::BlockingOracle;

/// Diagonal direction from a corner into each of its cells, in
/// [`CornerPos::cells`] order.
const CELL_DIRS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// World position of `corner` after padding for a footprint of `radius`.
pub fn pad_corner(oracle: &dyn BlockingOracle, corner: CornerPos, radius: i32) -> WorldPos {
    let pos = corner.to_world();
    let blocked = corner.cells().map(|c| oracle.is_blocked(c));
    let count = blocked.iter().filter(|&&b| b).count();

    let dir = match count {
        1 => blocked.iter().position(|&b| b).map(|i| (-CELL_DIRS[i].0, -CELL_DIRS[i].1)),
        3 => blocked.iter().position(|&b| !b).map(|i| CELL_DIRS[i]),
        _ => None,
    };

    match dir {
        Some((dx, dy)) => WorldPos::new(pos.x + dx * radius, pos.y + dy * radius, pos.z),
        None => pos,
    }
}
