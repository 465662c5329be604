//! The blocking oracle: the only view of terrain the navigation core has.
//!
//! # Contract
//!
//! `is_blocked` is a pure, side-effect-free predicate.  Cells outside
//! [`GridBounds`] must report blocked; every walker in this crate relies on
//! that to keep searches inside the map without separate bounds checks.
//!
//! The oracle is injected once (a `&dyn BlockingOracle` handed to each
//! subsystem) rather than looked up per call.

use nav_core::{CellPos, CornerPos, Layer, WorldPos, CELL_SIZE};

// ── GridBounds ────────────────────────────────────────────────────────────────

/// Playable map size in cells.  Cells span `0..width × 0..height`; corners
/// span `0..=width × 0..=height`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    pub width:  i32,
    pub height: i32,
}

impl GridBounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn contains_cell(&self, cell: CellPos) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    #[inline]
    pub fn contains_corner(&self, corner: CornerPos) -> bool {
        (0..=self.width).contains(&corner.x) && (0..=self.height).contains(&corner.y)
    }

    /// Nearest in-bounds corner.
    #[inline]
    pub fn clamp_corner(&self, corner: CornerPos) -> CornerPos {
        CornerPos::new(
            corner.x.clamp(0, self.width),
            corner.y.clamp(0, self.height),
            corner.layer,
        )
    }

    /// Clamp a world point onto the map rectangle (edges inclusive).
    #[inline]
    pub fn clamp_world(&self, pos: WorldPos) -> WorldPos {
        WorldPos::new(
            pos.x.clamp(0, self.width * CELL_SIZE),
            pos.y.clamp(0, self.height * CELL_SIZE),
            pos.z,
        )
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

// ── BlockingOracle ────────────────────────────────────────────────────────────

/// "Can an agent occupy or cross this cell?"
pub trait BlockingOracle {
    /// `true` if `cell` is impassable.  Out-of-bounds cells are always blocked.
    fn is_blocked(&self, cell: CellPos) -> bool;

    /// Playable map extent.
    fn bounds(&self) -> GridBounds;

    /// `true` if every cell around `corner` is blocked.
    fn is_corner_blocked(&self, corner: CornerPos) -> bool {
        corner.cells().iter().all(|&c| self.is_blocked(c))
    }

    /// Convenience: is the cell containing `pos` blocked?
    fn is_blocked_at(&self, pos: WorldPos, layer: Layer) -> bool {
        self.is_blocked(pos.to_cell(layer))
    }
}

impl<T: BlockingOracle + ?Sized> BlockingOracle for &T {
    fn is_blocked(&self, cell: CellPos) -> bool {
        (**self).is_blocked(cell)
    }

    fn bounds(&self) -> GridBounds {
        (**self).bounds()
    }
}

impl<T: BlockingOracle + ?Sized> BlockingOracle for Box<T> {
    fn is_blocked(&self, cell: CellPos) -> bool {
        (**self).is_blocked(cell)
    }

    fn bounds(&self) -> GridBounds {
        (**self).bounds()
    }
}

// ── FnOracle ──────────────────────────────────────────────────────────────────

/// Adapts a closure (typically bridging to a host's movement-cost and
/// building-occupancy tables) into a [`BlockingOracle`].
///
/// The bounds check happens here, so the closure only ever sees in-bounds
/// cells.
pub struct FnOracle<F> {
    bounds: GridBounds,
    f:      F,
}

impl<F> FnOracle<F>
where
    F: Fn(CellPos) -> bool,
{
    pub fn new(width: i32, height: i32, f: F) -> Self {
        Self { bounds: GridBounds::new(width, height), f }
    }
}

impl<F> BlockingOracle for FnOracle<F>
where
    F: Fn(CellPos) -> bool,
{
    fn is_blocked(&self, cell: CellPos) -> bool {
        !self.bounds.contains_cell(cell) || (self.f)(cell)
    }

    fn bounds(&self) -> GridBounds {
        self.bounds
    }
}
