//! The `NavSim` struct and its tick loop.

use nav_agent::{AgentStore, ProximityIndex};
use nav_core::{AgentId, NavConfig, SimClock, Tick, WVec, WorldPos};
use nav_grid::BlockingOracle;
use nav_sched::PathfinderScheduler;
use nav_steer::{MoveOutcome, MoveTarget, SteerContext, SteerIntent, SteeringController, commit, yield_vector};

use crate::{NavObserver, SimError, SimResult, TickStats};

// ── Queued orders ─────────────────────────────────────────────────────────────

/// Host requests held until the next tick boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimOrder {
    Move { agents: Vec<AgentId>, target: MoveTarget },
    Cancel(AgentId),
}

// ── NavSim ────────────────────────────────────────────────────────────────────

/// The navigation simulation runner.
///
/// `NavSim<O>` holds all navigation state and drives the tick loop:
///
/// 0. **Orders**: queued move orders become one clustering batch each;
///    cancellations retire controllers and detach searches.
/// 1. **Scheduler**: flush, spend the expansion budget, deliver finished
///    paths to the controllers waiting for them.
/// 2. **Proximity**: rebuild the R-tree over live agents.
/// 3. **Intent phase**: every moving controller steps against one immutable
///    [`SteerContext`], in ascending `AgentId` order.
/// 4. **Apply phase** (sequential, ascending `AgentId`): commit positions and
///    facing, submit re-paths, retire completed controllers.
/// 5. **Yield**: live, non-attacking agents without a moving controller step
///    away from anyone overlapping them, computed against the same context.
///
/// Create via [`NavSimBuilder`][crate::NavSimBuilder].
pub struct NavSim<O: BlockingOracle> {
    pub config: NavConfig,

    pub clock: SimClock,

    /// Agent state (SoA arrays).  Controllers read it through `SteerContext`;
    /// only the apply phase and the host setters write it.
    pub agents: AgentStore,

    /// Map collaborator.  May be edited between ticks.
    pub oracle: O,

    pub scheduler: PathfinderScheduler,

    /// One slot per agent; `None` when the agent has no move activity.
    controllers: Vec<Option<SteeringController>>,

    /// Last waypoint each agent completed.
    completed: Vec<Option<WorldPos>>,

    orders: Vec<SimOrder>,
}

impl<O: BlockingOracle> NavSim<O> {
    pub(crate) fn from_parts(config: NavConfig, agents: AgentStore, oracle: O) -> Self {
        let n = agents.count;
        Self {
            clock: SimClock::new(config.tick_ms),
            scheduler: PathfinderScheduler::new(config.scheduler.clone(), config.pathfinder.clone()),
            config,
            agents,
            oracle,
            controllers: (0..n).map(|_| None).collect(),
            completed: vec![None; n],
            orders: Vec::new(),
        }
    }

    // ── Inbound API ───────────────────────────────────────────────────────

    /// Order `agents` to move to `target`.  Takes effect at the next tick.
    pub fn submit_move_order(&mut self, agents: &[AgentId], target: MoveTarget) -> SimResult<()> {
        if agents.is_empty() {
            return Err(SimError::EmptyOrder);
        }
        for &agent in agents {
            self.check_alive(agent)?;
        }
        if let MoveTarget::Agent(t) = target {
            self.check_known(t)?;
        }
        self.orders.push(SimOrder::Move { agents: agents.to_vec(), target });
        Ok(())
    }

    /// Stop `agent`'s current move at the next tick.
    pub fn cancel(&mut self, agent: AgentId) -> SimResult<()> {
        self.check_known(agent)?;
        self.orders.push(SimOrder::Cancel(agent));
        Ok(())
    }

    pub fn set_attacking(&mut self, agent: AgentId, attacking: bool) -> SimResult<()> {
        self.check_known(agent)?;
        self.agents.attacking[agent.index()] = attacking;
        Ok(())
    }

    pub fn set_visible(&mut self, agent: AgentId, visible: bool) -> SimResult<()> {
        self.check_known(agent)?;
        self.agents.visible[agent.index()] = visible;
        Ok(())
    }

    pub fn set_returning_to_cell(&mut self, agent: AgentId, returning: bool) -> SimResult<()> {
        self.check_known(agent)?;
        self.agents.returning_to_cell[agent.index()] = returning;
        Ok(())
    }

    /// Mark `agent` dead.  Its move is cancelled at the next tick.
    pub fn kill(&mut self, agent: AgentId) -> SimResult<()> {
        self.check_known(agent)?;
        let i = agent.index();
        if self.agents.alive[i] {
            self.agents.alive[i] = false;
            self.agents.attacking[i] = false;
            self.orders.push(SimOrder::Cancel(agent));
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn controller(&self, agent: AgentId) -> Option<&SteeringController> {
        self.controllers.get(agent.index())?.as_ref()
    }

    pub fn controllers(&self) -> &[Option<SteeringController>] {
        &self.controllers
    }

    pub fn last_completed_waypoint(&self, agent: AgentId) -> Option<WorldPos> {
        self.completed.get(agent.index()).copied().flatten()
    }

    /// Orders waiting for the next tick.
    pub fn pending_orders(&self) -> &[SimOrder] {
        &self.orders
    }

    /// `true` when nothing is queued, searching or moving.
    pub fn is_idle(&self) -> bool {
        self.orders.is_empty()
            && self.scheduler.active_len() == 0
            && self.scheduler.pending_len() == 0
            && self.controllers.iter().all(Option::is_none)
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run exactly `n` ticks.
    pub fn run_ticks<Obs: NavObserver>(&mut self, n: u64, observer: &mut Obs) {
        for _ in 0..n {
            self.process_tick(observer);
        }
        observer.on_sim_end(self.now());
    }

    /// Run until [`is_idle`](Self::is_idle) or `max_ticks` have passed.
    /// Returns the number of ticks run.
    pub fn run_until_idle<Obs: NavObserver>(&mut self, max_ticks: u64, observer: &mut Obs) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && !self.is_idle() {
            self.process_tick(observer);
            ran += 1;
        }
        observer.on_sim_end(self.now());
        ran
    }

    /// Advance one tick.
    pub fn step<Obs: NavObserver>(&mut self, observer: &mut Obs) -> TickStats {
        self.process_tick(observer)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<Obs: NavObserver>(&mut self, observer: &mut Obs) -> TickStats {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let mut stats = TickStats { tick: now, ..TickStats::default() };

        // ── Phase 0: queued orders ────────────────────────────────────────
        stats.orders = self.apply_orders(now, observer);

        // ── Phase 1: scheduler and delivery ───────────────────────────────
        let report = self.scheduler.tick(&self.oracle);
        stats.expansions = report.expansions;
        stats.active_searches = report.active;
        stats.finished_searches = report.finished.len();
        for finished in &report.finished {
            observer.on_search_finished(now, finished);
        }
        for delivery in &report.deliveries {
            let Some(controller) = self.controllers[delivery.agent.index()].as_mut() else {
                continue;
            };
            let before = controller.state();
            match controller.deliver(delivery.search, delivery.path.clone()) {
                Ok(()) => {
                    stats.deliveries += 1;
                    observer.on_path_delivered(now, delivery);
                    observer.on_state_change(now, delivery.agent, before, controller.state());
                }
                Err(e) => log::debug!("stale delivery ignored: {e}"),
            }
        }

        // ── Phase 2: proximity index ──────────────────────────────────────
        let proximity = ProximityIndex::build(&self.agents);
        let holding: Vec<bool> =
            self.controllers.iter().map(|c| c.as_ref().is_none_or(|c| !c.state().is_moving())).collect();

        // ── Phase 3: intent phase (produce) ───────────────────────────────
        //
        // Explicit field borrows so the borrow checker sees disjoint access.
        let (intents, yields) = {
            let ctx = SteerContext {
                tick:      now,
                agents:    &self.agents,
                oracle:    &self.oracle,
                proximity: &proximity,
                config:    &self.config.steering,
                completed: &self.completed,
                holding:   &holding,
            };
            let intents: Vec<SteerIntent> = self
                .controllers
                .iter_mut()
                .flatten()
                .filter(|c| c.state().is_moving())
                .map(|c| c.step(&ctx))
                .collect();
            let yields: Vec<(AgentId, WVec)> = self
                .agents
                .agent_ids()
                .filter(|&a| holding[a.index()] && self.agents.is_alive(a) && !self.agents.attacking[a.index()])
                .map(|a| (a, yield_vector(&ctx, a)))
                .filter(|(_, push)| !push.is_zero())
                .collect();
            (intents, yields)
        };
        stats.moving = intents.len();

        // ── Phase 4: apply phase (consume) ────────────────────────────────
        for intent in intents {
            self.apply_intent(now, intent, observer, &mut stats);
        }

        // ── Phase 5: held agents make room ────────────────────────────────
        for (agent, push) in yields {
            let i = agent.index();
            let (pos, moved) = commit(&self.oracle, self.agents.pos[i], self.agents.layer[i], &[push]);
            log::trace!("{agent}: yielding by {moved:?}");
            self.agents.pos[i] = pos;
        }

        let interval = self.config.snapshot_interval_ticks;
        if interval > 0 && now.0.is_multiple_of(interval) {
            observer.on_snapshot(now, &self.agents, &self.controllers);
        }
        observer.on_tick_end(&stats);
        self.clock.advance();
        stats
    }

    /// Drain the order queue.  Returns the number of orders applied.
    fn apply_orders<Obs: NavObserver>(&mut self, now: Tick, observer: &mut Obs) -> usize {
        let orders = std::mem::take(&mut self.orders);
        let count = orders.len();
        for order in orders {
            match order {
                SimOrder::Move { agents, target } => self.apply_move(now, &agents, target, observer),
                SimOrder::Cancel(agent) => {
                    self.scheduler.remove_search(agent, None);
                    self.retire(now, agent, MoveOutcome::Cancelled, observer);
                }
            }
        }
        count
    }

    fn apply_move<Obs: NavObserver>(&mut self, now: Tick, order: &[AgentId], target: MoveTarget, observer: &mut Obs) {
        let mut group: Vec<AgentId> = Vec::with_capacity(order.len());
        for &agent in order {
            if self.agents.is_alive(agent) && !group.contains(&agent) {
                group.push(agent);
            }
        }
        if group.is_empty() {
            return;
        }
        for &agent in &group {
            self.retire(now, agent, MoveOutcome::Cancelled, observer);
            self.completed[agent.index()] = None;
        }

        let Some(destination) = target.live_position(&self.agents) else {
            log::warn!("move order for {} agents: target {target:?} is not visible", group.len());
            for &agent in &group {
                self.scheduler.remove_search(agent, None);
                observer.on_activity_completed(now, agent, MoveOutcome::TargetLost);
            }
            return;
        };

        match self.scheduler.submit_move_order(&self.oracle, &self.agents, &group, destination) {
            Ok(assignments) => {
                for a in assignments {
                    let controller = SteeringController::new(
                        a.agent,
                        target,
                        Some(destination),
                        a.search,
                        &self.config.steering,
                    )
                    .with_group(group.clone());
                    self.controllers[a.agent.index()] = Some(controller);
                }
            }
            Err(e) => log::warn!("move order dropped: {e}"),
        }
    }

    /// Drop `agent`'s controller, reporting `outcome` if it was still active.
    fn retire<Obs: NavObserver>(&mut self, now: Tick, agent: AgentId, outcome: MoveOutcome, observer: &mut Obs) {
        let Some(slot) = self.controllers.get_mut(agent.index()) else {
            return;
        };
        if let Some(mut controller) = slot.take() {
            if !controller.is_completed() {
                controller.cancel();
                observer.on_activity_completed(now, agent, outcome);
            }
        }
    }

    fn apply_intent<Obs: NavObserver>(
        &mut self,
        now: Tick,
        intent: SteerIntent,
        observer: &mut Obs,
        stats: &mut TickStats,
    ) {
        let agent = intent.agent;
        let i = agent.index();
        self.agents.pos[i] = intent.position;
        self.agents.facing[i] = intent.facing;
        if let Some(wp) = intent.waypoint_reached {
            self.completed[i] = Some(wp);
        }
        if intent.state_changed() {
            observer.on_state_change(now, agent, intent.previous, intent.state);
        }

        if let Some(request) = intent.repath {
            self.scheduler.remove_search(agent, None);
            let id = self.scheduler.submit_individual(&self.oracle, agent, request);
            if let Some(controller) = self.controllers[i].as_mut() {
                controller.await_search(id);
            }
        }

        if let Some(outcome) = intent.completed {
            self.controllers[i] = None;
            self.scheduler.remove_search(agent, None);
            stats.completed += 1;
            observer.on_activity_completed(now, agent, outcome);
        }
    }

    // ── Validation helpers ────────────────────────────────────────────────

    fn check_known(&self, agent: AgentId) -> SimResult<()> {
        if self.agents.contains(agent) { Ok(()) } else { Err(SimError::UnknownAgent(agent)) }
    }

    fn check_alive(&self, agent: AgentId) -> SimResult<()> {
        self.check_known(agent)?;
        if self.agents.alive[agent.index()] { Ok(()) } else { Err(SimError::DeadAgent(agent)) }
    }
}
