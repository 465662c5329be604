//! One-shot pathfinding front end.

use nav_core::{Layer, PathfinderConfig, SearchId, WorldPos};
use nav_grid::BlockingOracle;

use crate::path::Path;
use crate::search::{PathfinderSearch, SearchRequest};

/// Runs a [`PathfinderSearch`] to completion in a single call.
///
/// The scheduler never uses this (it spreads searches over ticks); it exists
/// for tools, tests and hosts that want an immediate answer.
pub struct ThetaStarPathfinder {
    config: PathfinderConfig,
}

impl ThetaStarPathfinder {
    pub fn new(config: PathfinderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Path from `source` to `destination` for a footprint of `radius`.
    /// Empty if `source == destination` or no route exists.
    pub fn find_path(
        &self,
        oracle: &dyn BlockingOracle,
        source: WorldPos,
        destination: WorldPos,
        layer: Layer,
        radius: i32,
    ) -> Path {
        let request = SearchRequest::new(source, destination, layer, radius);
        let mut search = PathfinderSearch::new(SearchId(0), request, &self.config, oracle);
        search.run_to_end(oracle);
        search.path().clone()
    }
}

impl Default for ThetaStarPathfinder {
    fn default() -> Self {
        Self::new(PathfinderConfig::default())
    }
}
