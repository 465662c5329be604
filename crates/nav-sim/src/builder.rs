//! Fluent builder for constructing a [`NavSim`].

use nav_agent::AgentStore;
use nav_core::{AgentId, NavConfig};
use nav_grid::BlockingOracle;

use crate::{NavSim, SimError, SimResult};

/// Fluent builder for [`NavSim<O>`].
///
/// # Required inputs
///
/// - [`AgentStore`] from [`nav_agent::AgentStoreBuilder`]
/// - `O: BlockingOracle`, usually a [`nav_grid::GridMap`]
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                 |
/// |---------------|-------------------------|
/// | `.config(c)`  | `NavConfig::default()`  |
///
/// # Example
///
/// ```rust,ignore
/// let agents = AgentStoreBuilder::new().agent(spec).build()?;
/// let mut sim = NavSimBuilder::new(agents, map).config(config).build()?;
/// sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(goal))?;
/// sim.run_until_idle(1_000, &mut NoopObserver);
/// ```
pub struct NavSimBuilder<O: BlockingOracle> {
    config: Option<NavConfig>,
    agents: AgentStore,
    oracle: O,
}

impl<O: BlockingOracle> NavSimBuilder<O> {
    pub fn new(agents: AgentStore, oracle: O) -> Self {
        Self { config: None, agents, oracle }
    }

    pub fn config(mut self, config: NavConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the configuration and agent placement and return a
    /// ready-to-run [`NavSim`].
    ///
    /// This is the only place configuration problems surface; nothing in
    /// the tick loop returns errors.
    pub fn build(self) -> SimResult<NavSim<O>> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let bounds = self.oracle.bounds();
        for (i, &pos) in self.agents.pos.iter().enumerate() {
            if bounds.clamp_world(pos) != pos {
                return Err(SimError::OutsideMap { agent: AgentId(i as u32), pos });
            }
        }

        log::info!(
            "nav sim ready: {} agents, {}x{} map, budget {} expansions/tick",
            self.agents.count,
            bounds.width,
            bounds.height,
            config.scheduler.expansion_budget
        );
        Ok(NavSim::from_parts(config, self.agents, self.oracle))
    }
}
