//! `PathfinderScheduler`: owns every in-flight search and shares a fixed
//! expansion budget between them each tick.
//!
//! # Tick
//!
//! ```text
//! tick(oracle)
//!   1. flush the command queue (adds and removals, in submission order)
//!   2. allotment = min(⌈budget / running⌉, budget left this tick)
//!      for each running search, oldest first:
//!          delayed?  spend one tick of delay, no expansions
//!          else      expand(allotment)
//!   3. retire finished searches, delivering a clone of the path to every
//!      attached agent
//! ```
//!
//! The scheduler is the only writer of the active list.  Callers never touch
//! a search directly; they queue commands and read deliveries.

use nav_agent::AgentStore;
use nav_core::{AgentId, PathfinderConfig, SchedulerConfig, SearchId, WorldPos};
use nav_grid::BlockingOracle;
use nav_search::{Path, PathfinderSearch, SearchRequest, SearchStatus};

use crate::cluster::plan_batch;
use crate::command::{CommandQueue, SchedCommand};
use crate::error::{SchedError, SchedResult};

// ── Outputs ───────────────────────────────────────────────────────────────────

/// A finished path handed to one agent.
#[derive(Clone, Debug)]
pub struct PathDelivery {
    pub agent:  AgentId,
    pub search: SearchId,
    pub path:   Path,
}

/// Summary of a search retired this tick.
#[derive(Clone, Debug)]
pub struct FinishedSearch {
    pub id:         SearchId,
    pub status:     SearchStatus,
    pub expansions: u32,
    pub visited:    usize,
    pub agents:     Vec<AgentId>,
    pub path:       Path,
}

/// What one [`PathfinderScheduler::tick`] did.
#[derive(Clone, Debug, Default)]
pub struct SchedTick {
    /// Expansions performed across all searches.  Never exceeds the budget.
    pub expansions: u32,
    /// Searches in the active list after the command flush.
    pub active:     usize,
    pub finished:   Vec<FinishedSearch>,
    pub deliveries: Vec<PathDelivery>,
}

/// Which search an ordered agent was attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub agent:  AgentId,
    pub search: SearchId,
    /// `true` if other agents share the search.
    pub shared: bool,
}

// ── PathfinderScheduler ───────────────────────────────────────────────────────

pub struct PathfinderScheduler {
    config:     SchedulerConfig,
    pathfinder: PathfinderConfig,
    active:     Vec<PathfinderSearch>,
    commands:   CommandQueue,
    next_id:    u32,
}

impl PathfinderScheduler {
    pub fn new(config: SchedulerConfig, pathfinder: PathfinderConfig) -> Self {
        Self {
            config,
            pathfinder,
            active: Vec::new(),
            commands: CommandQueue::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn pathfinder_config(&self) -> &PathfinderConfig {
        &self.pathfinder
    }

    /// Searches in the active list.  Queued adds are not counted until the
    /// next tick applies them.
    #[inline]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Commands waiting for the next tick boundary.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.commands.len()
    }

    pub fn active(&self) -> impl Iterator<Item = &PathfinderSearch> + '_ {
        self.active.iter()
    }

    pub fn search(&self, id: SearchId) -> Option<&PathfinderSearch> {
        self.active.iter().find(|s| s.id() == id)
    }

    /// A fresh id, never handed out before by this scheduler.
    pub fn next_search_id(&mut self) -> SearchId {
        let id = SearchId(self.next_id);
        self.next_id += 1;
        id
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Queue `search` to join the active list at the next tick.
    pub fn add_search(&mut self, search: PathfinderSearch) {
        self.commands.push(SchedCommand::Add(Box::new(search)));
    }

    /// Queue removal of `agent` from its searches (optionally only those
    /// heading to `destination`).  Paths already delivered are unaffected.
    pub fn remove_search(&mut self, agent: AgentId, destination: Option<WorldPos>) {
        self.commands.push(SchedCommand::Remove { agent, destination });
    }

    /// Create and queue an unshared search for `agent`.
    pub fn submit_individual(
        &mut self,
        oracle: &dyn BlockingOracle,
        agent: AgentId,
        request: SearchRequest,
    ) -> SearchId {
        let id = self.next_search_id();
        let mut search = PathfinderSearch::new(id, request, &self.pathfinder, oracle);
        search.add_agent(agent);
        self.add_search(search);
        id
    }

    /// Order every agent in `order` to `destination`.
    ///
    /// Each agent is detached from whatever it was searching for, then the
    /// order is clustered into shared and individual searches which start at
    /// the next tick.  Fails without queuing anything if an agent is unknown
    /// or dead.
    pub fn submit_move_order(
        &mut self,
        oracle: &dyn BlockingOracle,
        agents: &AgentStore,
        order: &[AgentId],
        destination: WorldPos,
    ) -> SchedResult<Vec<Assignment>> {
        for &agent in order {
            if !agents.contains(agent) {
                return Err(SchedError::UnknownAgent(agent));
            }
            if !agents.alive[agent.index()] {
                return Err(SchedError::DeadAgent(agent));
            }
        }
        for &agent in order {
            self.remove_search(agent, None);
        }

        let plan = plan_batch(
            oracle,
            agents,
            order,
            destination,
            &self.config,
            self.pathfinder.nearest_corner_search_radius,
        );

        let mut assignments = Vec::with_capacity(order.len());
        for group in &plan.shared {
            let id = self.next_search_id();
            let request = SearchRequest::new(group.source, destination, group.layer, group.radius);
            let mut search = PathfinderSearch::new(id, request, &self.pathfinder, oracle);
            search.set_delay(group.delay);
            for &agent in &group.members {
                search.add_agent(agent);
                assignments.push(Assignment { agent, search: id, shared: true });
            }
            self.add_search(search);
        }
        for &agent in &plan.individual {
            let i = agent.index();
            let request = SearchRequest::new(agents.pos[i], destination, agents.layer[i], agents.radius[i]);
            let search = self.submit_individual(oracle, agent, request);
            assignments.push(Assignment { agent, search, shared: false });
        }

        log::info!(
            "move order to {destination}: {} agents, {} circles, {} shared + {} individual searches",
            order.len(),
            plan.circles.len(),
            plan.shared.len(),
            plan.individual.len()
        );
        Ok(assignments)
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    pub fn tick(&mut self, oracle: &dyn BlockingOracle) -> SchedTick {
        self.flush();
        let mut report = SchedTick { active: self.active.len(), ..SchedTick::default() };

        let running = self.active.iter().filter(|s| !s.is_finished()).count() as u32;
        if running > 0 {
            let budget = self.config.expansion_budget;
            let share = budget.div_ceil(running);
            let mut remaining = budget;
            for search in self.active.iter_mut().filter(|s| !s.is_finished()) {
                if search.consume_delay() {
                    continue;
                }
                let allotment = share.min(remaining);
                if allotment == 0 {
                    break;
                }
                remaining -= search.expand(oracle, allotment);
            }
            report.expansions = budget - remaining;
            log::trace!(
                "scheduler: {running} running, {share} each, {} of {budget} expansions used",
                report.expansions
            );
        }

        let (finished, active): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.active).into_iter().partition(|s| s.is_finished());
        self.active = active;

        for search in finished {
            match search.status() {
                SearchStatus::Failed => log::warn!(
                    "{}: no path to {} after {} expansions",
                    search.id(),
                    search.request().destination,
                    search.expansions()
                ),
                _ => log::debug!(
                    "{}: delivered {} waypoints to {} agents",
                    search.id(),
                    search.path().len(),
                    search.agents().len()
                ),
            }
            for &agent in search.agents() {
                report.deliveries.push(PathDelivery {
                    agent,
                    search: search.id(),
                    path: search.path().clone(),
                });
            }
            report.finished.push(FinishedSearch {
                id: search.id(),
                status: search.status(),
                expansions: search.expansions(),
                visited: search.visited(),
                agents: search.agents().to_vec(),
                path: search.path().clone(),
            });
        }
        report
    }

    fn flush(&mut self) {
        for command in self.commands.drain() {
            match command {
                SchedCommand::Add(search) => {
                    log::debug!(
                        "{}: added ({} agents, delay {})",
                        search.id(),
                        search.agents().len(),
                        search.delay()
                    );
                    self.active.push(*search);
                }
                SchedCommand::Remove { agent, destination } => {
                    self.active.retain_mut(|s| {
                        let matches = destination.is_none_or(|d| s.request().destination == d);
                        if matches && s.remove_agent(agent) && s.agents().is_empty() {
                            log::debug!("{}: cancelled", s.id());
                            return false;
                        }
                        true
                    });
                }
            }
        }
    }
}
