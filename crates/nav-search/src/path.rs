//! `Path`: the finished product of a search.

use std::collections::VecDeque;

use nav_core::WorldPos;

/// An ordered sequence of world-space waypoints from source to destination.
///
/// Produced once by a finished search and then owned by the consumer, which
/// pops waypoints off the front as they are reached.  An empty path means
/// "no route found" (or "already there"); callers fall back to direct-line
/// movement.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    waypoints: VecDeque<WorldPos>,
}

impl Path {
    /// Build a path, dropping adjacent duplicate waypoints.
    pub fn new(points: impl IntoIterator<Item = WorldPos>) -> Self {
        let mut waypoints: VecDeque<WorldPos> = VecDeque::new();
        for p in points {
            if waypoints.back() != Some(&p) {
                waypoints.push_back(p);
            }
        }
        Self { waypoints }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A single hop straight to `destination`.
    pub fn direct(destination: WorldPos) -> Self {
        Self::new([destination])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// The waypoint currently being steered towards.
    #[inline]
    pub fn front(&self) -> Option<WorldPos> {
        self.waypoints.front().copied()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<WorldPos> {
        self.waypoints.get(i).copied()
    }

    #[inline]
    pub fn last(&self) -> Option<WorldPos> {
        self.waypoints.back().copied()
    }

    /// Consume the front waypoint.
    #[inline]
    pub fn pop_front(&mut self) -> Option<WorldPos> {
        self.waypoints.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldPos> + '_ {
        self.waypoints.iter()
    }

    pub fn to_vec(&self) -> Vec<WorldPos> {
        self.waypoints.iter().copied().collect()
    }

    /// Total 2D polyline length in world units.
    pub fn length(&self) -> i64 {
        self.waypoints
            .iter()
            .zip(self.waypoints.iter().skip(1))
            .map(|(a, b)| a.distance_2d(*b) as i64)
            .sum()
    }

    /// Length of the polyline starting at `from` and running through every
    /// remaining waypoint.
    pub fn length_from(&self, from: WorldPos) -> i64 {
        match self.front() {
            None => 0,
            Some(first) => from.distance_2d(first) as i64 + self.length(),
        }
    }
}

impl FromIterator<WorldPos> for Path {
    fn from_iter<I: IntoIterator<Item = WorldPos>>(iter: I) -> Self {
        Path::new(iter)
    }
}
