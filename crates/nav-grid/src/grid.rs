//! Default [`BlockingOracle`] implementation: a dense bitmap per layer plus a
//! building-occupancy counter per cell.
//!
//! # Data layout
//!
//! Both arrays are layer-major then row-major:
//!
//! ```text
//! index(cell) = (layer · height + y) · width + x
//! ```
//!
//! A cell is blocked when its terrain flag is set **or** its occupancy count
//! is non-zero.  Occupancy is a counter rather than a flag so overlapping
//! building footprints can be placed and removed independently.

use nav_core::{CellPos, Layer};

use crate::oracle::{BlockingOracle, GridBounds};
use crate::{GridError, GridResult};

// ── GridMap ───────────────────────────────────────────────────────────────────

pub struct GridMap {
    bounds:    GridBounds,
    layers:    u8,
    terrain:   Vec<bool>,
    occupancy: Vec<u16>,
}

impl GridMap {
    /// An open map with `layers` movement layers.
    pub fn new(width: i32, height: i32, layers: u8) -> GridResult<Self> {
        if width <= 0 || height <= 0 || layers == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let len = (width as usize) * (height as usize) * layers as usize;
        Ok(Self {
            bounds: GridBounds::new(width, height),
            layers,
            terrain: vec![false; len],
            occupancy: vec![0; len],
        })
    }

    /// Parse a ground-layer map from ASCII art: `#` is blocked, `.` is open.
    ///
    /// The first non-empty line is row `y = 0`.  Leading and trailing
    /// whitespace on each line is ignored; all rows must have equal width.
    ///
    /// ```
    /// use nav_core::CellPos;
    /// use nav_grid::{BlockingOracle, GridMap};
    ///
    /// let map = GridMap::from_ascii("
    ///     ..#
    ///     ...
    /// ").unwrap();
    /// assert!(map.is_blocked(CellPos::ground(2, 0)));
    /// assert!(!map.is_blocked(CellPos::ground(2, 1)));
    /// ```
    pub fn from_ascii(text: &str) -> GridResult<Self> {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let mut map = GridMap::new(width, height, 1)?;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as i32 != width {
                return Err(GridError::Parse(format!(
                    "row {y} has {} columns, expected {width}",
                    row.chars().count()
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '#' => map.set_blocked(CellPos::ground(x as i32, y as i32), true)?,
                    '.' => {}
                    other => {
                        return Err(GridError::Parse(format!(
                            "unexpected {other:?} at column {x}, row {y}"
                        )));
                    }
                }
            }
        }
        Ok(map)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height
    }

    #[inline]
    pub fn layer_count(&self) -> u8 {
        self.layers
    }

    #[inline]
    fn index(&self, cell: CellPos) -> Option<usize> {
        if !self.bounds.contains_cell(cell) || cell.layer.0 >= self.layers {
            return None;
        }
        let w = self.bounds.width as usize;
        let h = self.bounds.height as usize;
        Some((cell.layer.index() * h + cell.y as usize) * w + cell.x as usize)
    }

    // ── Terrain ───────────────────────────────────────────────────────────

    pub fn set_blocked(&mut self, cell: CellPos, blocked: bool) -> GridResult<()> {
        let i = self.index(cell).ok_or(GridError::OutOfBounds(cell))?;
        self.terrain[i] = blocked;
        Ok(())
    }

    /// Terrain flag only, ignoring building occupancy.
    pub fn is_terrain_blocked(&self, cell: CellPos) -> bool {
        self.index(cell).is_none_or(|i| self.terrain[i])
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    /// Register one building footprint covering `cell`.
    pub fn occupy(&mut self, cell: CellPos) -> GridResult<()> {
        let i = self.index(cell).ok_or(GridError::OutOfBounds(cell))?;
        self.occupancy[i] = self.occupancy[i].saturating_add(1);
        Ok(())
    }

    /// Remove one building footprint from `cell`.  Vacating an unoccupied
    /// cell is a no-op.
    pub fn vacate(&mut self, cell: CellPos) -> GridResult<()> {
        let i = self.index(cell).ok_or(GridError::OutOfBounds(cell))?;
        self.occupancy[i] = self.occupancy[i].saturating_sub(1);
        Ok(())
    }

    pub fn occupancy(&self, cell: CellPos) -> u16 {
        self.index(cell).map_or(0, |i| self.occupancy[i])
    }

    /// Number of blocked cells on `layer` (terrain or occupied).
    pub fn blocked_count(&self, layer: Layer) -> usize {
        let mut n = 0;
        for y in 0..self.bounds.height {
            for x in 0..self.bounds.width {
                if self.is_blocked(CellPos::new(x, y, layer)) {
                    n += 1;
                }
            }
        }
        n
    }
}

impl BlockingOracle for GridMap {
    #[inline]
    fn is_blocked(&self, cell: CellPos) -> bool {
        match self.index(cell) {
            None => true,
            Some(i) => self.terrain[i] || self.occupancy[i] > 0,
        }
    }

    #[inline]
    fn bounds(&self) -> GridBounds {
        self.bounds
    }
}

// ── GridMapBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for maps assembled in code (tests, demo scenarios).
///
/// Out-of-bounds cells are collected and reported by [`build`](Self::build)
/// so a long chain of calls stays infallible.
///
/// # Example
///
/// ```
/// use nav_core::{CellPos, Layer};
/// use nav_grid::{BlockingOracle, GridMapBuilder};
///
/// let map = GridMapBuilder::new(20, 20)
///     .wall_x(10, 0, 19, Layer::GROUND)
///     .open(CellPos::ground(10, 7))
///     .build()
///     .unwrap();
/// assert!(map.is_blocked(CellPos::ground(10, 6)));
/// assert!(!map.is_blocked(CellPos::ground(10, 7)));
/// ```
pub struct GridMapBuilder {
    width:  i32,
    height: i32,
    layers: u8,
    ops:    Vec<(CellPos, bool)>,
}

impl GridMapBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height, layers: 1, ops: Vec::new() }
    }

    pub fn layers(mut self, layers: u8) -> Self {
        self.layers = layers;
        self
    }

    pub fn block(mut self, cell: CellPos) -> Self {
        self.ops.push((cell, true));
        self
    }

    /// Clear a cell blocked by an earlier call.  Operations apply in order.
    pub fn open(mut self, cell: CellPos) -> Self {
        self.ops.push((cell, false));
        self
    }

    /// Block the inclusive rectangle `[x0, x1] × [y0, y1]`.
    pub fn block_rect(mut self, x0: i32, y0: i32, x1: i32, y1: i32, layer: Layer) -> Self {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.ops.push((CellPos::new(x, y, layer), true));
            }
        }
        self
    }

    /// A vertical wall at column `x` from `y0` to `y1` inclusive.
    pub fn wall_x(self, x: i32, y0: i32, y1: i32, layer: Layer) -> Self {
        self.block_rect(x, y0, x, y1, layer)
    }

    /// A horizontal wall at row `y` from `x0` to `x1` inclusive.
    pub fn wall_y(self, y: i32, x0: i32, x1: i32, layer: Layer) -> Self {
        self.block_rect(x0, y, x1, y, layer)
    }

    pub fn build(self) -> GridResult<GridMap> {
        let mut map = GridMap::new(self.width, self.height, self.layers)?;
        for (cell, blocked) in self.ops {
            map.set_blocked(cell, blocked)?;
        }
        Ok(map)
    }
}
