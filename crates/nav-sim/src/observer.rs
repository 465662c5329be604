//! Simulation observer trait for progress reporting and data collection.

use nav_agent::AgentStore;
use nav_core::{AgentId, Tick};
use nav_sched::{FinishedSearch, PathDelivery};
use nav_steer::{MoveOutcome, SteeringController, SteeringState};

/// Per-tick counters handed to [`NavObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub tick: Tick,
    /// Orders applied at the start of the tick.
    pub orders:     usize,
    /// Expansions spent by the scheduler.
    pub expansions: u32,
    /// Searches in the active list after the command flush.
    pub active_searches:   usize,
    pub finished_searches: usize,
    pub deliveries:        usize,
    /// Controllers that stepped this tick.
    pub moving:            usize,
    pub completed:         usize,
}

/// Callbacks invoked by [`NavSim`][crate::NavSim] at key points in the tick
/// loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Observers never feed back into the
/// simulation.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl NavObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, stats: &TickStats) {
///         if stats.tick.0 % self.interval == 0 {
///             println!("tick {}: {} moving", stats.tick, stats.moving);
///         }
///     }
/// }
/// ```
pub trait NavObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// A search left the scheduler, successful or not.
    fn on_search_finished(&mut self, _tick: Tick, _search: &FinishedSearch) {}

    /// A path was handed to the controller that was waiting for it.
    fn on_path_delivered(&mut self, _tick: Tick, _delivery: &PathDelivery) {}

    /// A controller moved to a different kind of state.
    fn on_state_change(&mut self, _tick: Tick, _agent: AgentId, _from: SteeringState, _to: SteeringState) {}

    /// A move activity ended; its controller is retired.
    fn on_activity_completed(&mut self, _tick: Tick, _agent: AgentId, _outcome: MoveOutcome) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _stats: &TickStats) {}

    /// Called every `config.snapshot_interval_ticks` ticks with read-only
    /// access to agent state and the live controllers (indexed by `AgentId`).
    fn on_snapshot(&mut self, _tick: Tick, _agents: &AgentStore, _controllers: &[Option<SteeringController>]) {}

    /// Called once when a `run_*` call returns.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`NavObserver`] that does nothing.
pub struct NoopObserver;

impl NavObserver for NoopObserver {}
