//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  Everything in the core
//! (expansion budgets, stagger delays, stuck thresholds, vector lifetimes) is
//! measured in ticks so lockstep clients agree exactly.  `SimClock` maps
//! ticks to elapsed milliseconds for logging and output only.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current tick and its mapping to game time.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Game milliseconds represented by one tick.  Default: 40 (25 Hz).
    pub tick_ms: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_ms: u32) -> Self {
        Self { tick_ms, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed game milliseconds since tick 0.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.current_tick.0 * self.tick_ms as u64
    }

    /// How many ticks span `ms` milliseconds (rounds up).
    #[inline]
    pub fn ticks_for_ms(&self, ms: u64) -> u64 {
        ms.div_ceil(self.tick_ms.max(1) as u64)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(40)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.elapsed_ms();
        write!(f, "{} ({}:{:02}.{:03})", self.current_tick, ms / 60_000, (ms / 1000) % 60, ms % 1000)
    }
}
