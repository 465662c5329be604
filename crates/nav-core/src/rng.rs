//! Deterministic RNG for scenario generation.
//!
//! The core itself never draws random numbers: search order and steering are
//! fully determined by inputs.  `SimRng` exists for tools that *build* inputs
//! (demo scenarios, randomised obstacle maps in tests) and must still produce
//! the same world on every client from a shared seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{CELL_SIZE, CellPos, Layer, WorldPos};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded `SmallRng` wrapper.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent child stream, e.g. one per spawned squad.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// A uniformly chosen cell in a `width × height` map.
    pub fn cell(&mut self, width: i32, height: i32, layer: Layer) -> CellPos {
        CellPos::new(self.0.gen_range(0..width.max(1)), self.0.gen_range(0..height.max(1)), layer)
    }

    /// `center` displaced by up to `radius` world units on each axis.
    pub fn jitter(&mut self, center: WorldPos, radius: i32) -> WorldPos {
        if radius <= 0 {
            return center;
        }
        WorldPos::new(
            center.x + self.0.gen_range(-radius..=radius),
            center.y + self.0.gen_range(-radius..=radius),
            center.z,
        )
    }

    /// A random point strictly inside `cell`, at least `margin` units from
    /// its edges.
    pub fn point_in_cell(&mut self, cell: CellPos, margin: i32) -> WorldPos {
        let margin = margin.clamp(0, CELL_SIZE / 2 - 1);
        let origin = WorldPos::flat(cell.x * CELL_SIZE, cell.y * CELL_SIZE);
        WorldPos::flat(
            origin.x + self.0.gen_range(margin..CELL_SIZE - margin),
            origin.y + self.0.gen_range(margin..CELL_SIZE - margin),
        )
    }
}
