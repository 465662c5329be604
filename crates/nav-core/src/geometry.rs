//! Fixed-precision world geometry.
//!
//! # Units
//!
//! World space uses integer sub-cell units: one grid cell is [`CELL_SIZE`]
//! units wide.  Cell `(x, y)` covers the half-open square
//! `[x·CELL_SIZE, (x+1)·CELL_SIZE) × [y·CELL_SIZE, (y+1)·CELL_SIZE)`, and
//! corner `(x, y)` sits at world `(x·CELL_SIZE, y·CELL_SIZE)`, the point
//! shared by cells `(x-1, y-1)`, `(x, y-1)`, `(x-1, y)` and `(x, y)`.
//!
//! Every operation here is integer arithmetic so results are bit-identical on
//! every client of a lockstep game.  Lengths use `u64::isqrt`, which rounds
//! down.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::WAngle;

/// World units per cell edge.
pub const CELL_SIZE: i32 = 1024;

/// Half a cell: the offset from a cell's corner to its centre.
pub const HALF_CELL: i32 = CELL_SIZE / 2;

// ── Layer ─────────────────────────────────────────────────────────────────────

/// Movement layer tag.  Cells and corners on different layers never touch.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layer(pub u8);

impl Layer {
    pub const GROUND: Layer = Layer(0);
    pub const TUNNEL: Layer = Layer(1);
    pub const BRIDGE: Layer = Layer(2);

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── WVec ──────────────────────────────────────────────────────────────────────

/// A displacement in world units.  `z` is height and is ignored by every
/// `_2d` helper.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WVec {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WVec {
    pub const ZERO: WVec = WVec { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn flat(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0 && self.z == 0
    }

    /// Squared horizontal length.
    #[inline]
    pub fn length_2d_squared(self) -> i64 {
        let x = self.x as i64;
        let y = self.y as i64;
        x * x + y * y
    }

    /// Horizontal length, rounded down.
    #[inline]
    pub fn length_2d(self) -> i32 {
        (self.length_2d_squared() as u64).isqrt() as i32
    }

    #[inline]
    pub fn dot_2d(self, other: WVec) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64
    }

    /// z-component of the 2D cross product.  Positive when `other` lies
    /// counter-clockwise (to the left) of `self`.
    #[inline]
    pub fn cross_2d(self, other: WVec) -> i64 {
        self.x as i64 * other.y as i64 - self.y as i64 * other.x as i64
    }

    /// Same horizontal direction, horizontal length `length`.  The zero vector
    /// stays zero.
    pub fn with_length_2d(self, length: i32) -> WVec {
        let current = self.length_2d();
        if current == 0 {
            return WVec::ZERO;
        }
        WVec::new(
            (self.x as i64 * length as i64 / current as i64) as i32,
            (self.y as i64 * length as i64 / current as i64) as i32,
            self.z,
        )
    }

    /// Clamp the horizontal length to at most `max`.
    pub fn clamp_length_2d(self, max: i32) -> WVec {
        if self.length_2d_squared() > max as i64 * max as i64 {
            self.with_length_2d(max)
        } else {
            self
        }
    }

    /// Rotate horizontally by `angle` (counter-clockwise).
    pub fn rotate(self, angle: WAngle) -> WVec {
        let cos = angle.cos() as i64;
        let sin = angle.sin() as i64;
        let x = self.x as i64;
        let y = self.y as i64;
        WVec::new(
            ((x * cos - y * sin) / WAngle::SCALE as i64) as i32,
            ((x * sin + y * cos) / WAngle::SCALE as i64) as i32,
            self.z,
        )
    }

    /// A horizontal vector of `length` pointing along `angle`.
    pub fn from_angle(angle: WAngle, length: i32) -> WVec {
        WVec::new(
            (length as i64 * angle.cos() as i64 / WAngle::SCALE as i64) as i32,
            (length as i64 * angle.sin() as i64 / WAngle::SCALE as i64) as i32,
            0,
        )
    }
}

impl Add for WVec {
    type Output = WVec;
    #[inline]
    fn add(self, rhs: WVec) -> WVec {
        WVec::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for WVec {
    #[inline]
    fn add_assign(&mut self, rhs: WVec) {
        *self = *self + rhs;
    }
}

impl Sub for WVec {
    type Output = WVec;
    #[inline]
    fn sub(self, rhs: WVec) -> WVec {
        WVec::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for WVec {
    #[inline]
    fn sub_assign(&mut self, rhs: WVec) {
        *self = *self - rhs;
    }
}

impl Neg for WVec {
    type Output = WVec;
    #[inline]
    fn neg(self) -> WVec {
        WVec::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<i32> for WVec {
    type Output = WVec;
    #[inline]
    fn mul(self, rhs: i32) -> WVec {
        WVec::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<i32> for WVec {
    type Output = WVec;
    #[inline]
    fn div(self, rhs: i32) -> WVec {
        WVec::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

// ── WorldPos ──────────────────────────────────────────────────────────────────

/// A point in world space.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldPos {
    pub const ZERO: WorldPos = WorldPos { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Ground-level point.
    #[inline]
    pub const fn flat(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    /// Linear interpolation `a + (b - a) · mul / div`.
    pub fn lerp(a: WorldPos, b: WorldPos, mul: i64, div: i64) -> WorldPos {
        debug_assert!(div != 0);
        let l = |from: i32, to: i32| (from as i64 + (to as i64 - from as i64) * mul / div) as i32;
        WorldPos::new(l(a.x, b.x), l(a.y, b.y), l(a.z, b.z))
    }

    /// Linear interpolation with a parabolic height arc peaking at
    /// `apex_height` above the straight line halfway between `a` and `b`.
    pub fn lerp_quadratic(a: WorldPos, b: WorldPos, apex_height: i32, mul: i64, div: i64) -> WorldPos {
        let mut pos = WorldPos::lerp(a, b, mul, div);
        if div > 0 && (0..=div).contains(&mul) {
            pos.z += (4 * apex_height as i64 * mul * (div - mul) / (div * div)) as i32;
        }
        pos
    }

    /// Horizontal distance, rounded down.
    #[inline]
    pub fn distance_2d(self, other: WorldPos) -> i32 {
        (other - self).length_2d()
    }

    #[inline]
    pub fn distance_2d_squared(self, other: WorldPos) -> i64 {
        (other - self).length_2d_squared()
    }

    /// The cell containing this point on `layer`.
    #[inline]
    pub fn to_cell(self, layer: Layer) -> CellPos {
        CellPos::new(self.x.div_euclid(CELL_SIZE), self.y.div_euclid(CELL_SIZE), layer)
    }

    /// The corner nearest to this point (rounding half-way points up).
    #[inline]
    pub fn nearest_corner(self, layer: Layer) -> CornerPos {
        CornerPos::new(
            (self.x + HALF_CELL).div_euclid(CELL_SIZE),
            (self.y + HALF_CELL).div_euclid(CELL_SIZE),
            layer,
        )
    }

    /// Average of `points`; `None` for an empty slice.
    pub fn average(points: &[WorldPos]) -> Option<WorldPos> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as i64;
        let (sx, sy, sz) = points.iter().fold((0i64, 0i64, 0i64), |(x, y, z), p| {
            (x + p.x as i64, y + p.y as i64, z + p.z as i64)
        });
        Some(WorldPos::new((sx / n) as i32, (sy / n) as i32, (sz / n) as i32))
    }
}

impl Add<WVec> for WorldPos {
    type Output = WorldPos;
    #[inline]
    fn add(self, rhs: WVec) -> WorldPos {
        WorldPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign<WVec> for WorldPos {
    #[inline]
    fn add_assign(&mut self, rhs: WVec) {
        *self = *self + rhs;
    }
}

impl Sub<WVec> for WorldPos {
    type Output = WorldPos;
    #[inline]
    fn sub(self, rhs: WVec) -> WorldPos {
        WorldPos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Sub for WorldPos {
    type Output = WVec;
    #[inline]
    fn sub(self, rhs: WorldPos) -> WVec {
        WVec::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

// ── CellPos ───────────────────────────────────────────────────────────────────

/// A grid cell on a movement layer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub layer: Layer,
}

impl CellPos {
    #[inline]
    pub const fn new(x: i32, y: i32, layer: Layer) -> Self {
        Self { x, y, layer }
    }

    #[inline]
    pub const fn ground(x: i32, y: i32) -> Self {
        Self { x, y, layer: Layer::GROUND }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> CellPos {
        CellPos::new(self.x + dx, self.y + dy, self.layer)
    }

    /// World position of the cell centre (ground height).
    #[inline]
    pub fn center(self) -> WorldPos {
        WorldPos::flat(self.x * CELL_SIZE + HALF_CELL, self.y * CELL_SIZE + HALF_CELL)
    }

    /// Chebyshev (king-move) distance.
    #[inline]
    pub fn chebyshev(self, other: CellPos) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell({},{}@{})", self.x, self.y, self.layer.0)
    }
}

// ── CornerPos ─────────────────────────────────────────────────────────────────

/// A grid corner, the vertex type of the any-angle search graph.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CornerPos {
    pub x: i32,
    pub y: i32,
    pub layer: Layer,
}

impl CornerPos {
    #[inline]
    pub const fn new(x: i32, y: i32, layer: Layer) -> Self {
        Self { x, y, layer }
    }

    #[inline]
    pub const fn ground(x: i32, y: i32) -> Self {
        Self { x, y, layer: Layer::GROUND }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> CornerPos {
        CornerPos::new(self.x + dx, self.y + dy, self.layer)
    }

    /// World position of the corner (ground height).
    #[inline]
    pub fn to_world(self) -> WorldPos {
        WorldPos::flat(self.x * CELL_SIZE, self.y * CELL_SIZE)
    }

    /// The four cells sharing this corner, in the order
    /// `[(x-1,y-1), (x,y-1), (x-1,y), (x,y)]`.
    #[inline]
    pub fn cells(self) -> [CellPos; 4] {
        [
            CellPos::new(self.x - 1, self.y - 1, self.layer),
            CellPos::new(self.x, self.y - 1, self.layer),
            CellPos::new(self.x - 1, self.y, self.layer),
            CellPos::new(self.x, self.y, self.layer),
        ]
    }

    /// Chebyshev (king-move) distance.
    #[inline]
    pub fn chebyshev(self, other: CornerPos) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// `true` for the eight king-move neighbours on the same layer.  Whether
    /// the move is actually traversable is a question for the blocking
    /// oracle.
    #[inline]
    pub fn is_adjacent(self, other: CornerPos) -> bool {
        self.layer == other.layer && self != other && self.chebyshev(other) == 1
    }

    /// Euclidean distance between two corners in world units.
    #[inline]
    pub fn distance(self, other: CornerPos) -> i64 {
        (other.to_world() - self.to_world()).length_2d() as i64
    }
}

impl fmt::Display for CornerPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corner({},{}@{})", self.x, self.y, self.layer.0)
    }
}
