//! `NavOutputObserver<W>` — bridges `NavObserver` to an `OutputWriter`.

use nav_agent::AgentStore;
use nav_core::Tick;
use nav_sched::PathDelivery;
use nav_sim::{NavObserver, TickStats};
use nav_steer::SteeringController;

use crate::row::{AgentSnapshotRow, PathWaypointRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`NavObserver`] that writes agent snapshots, tick summaries and
/// delivered paths to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `NavObserver` methods
/// have no return value.  After the run returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct NavOutputObserver<W: OutputWriter> {
    writer:      W,
    tick_ms:     u32,
    write_paths: bool,
    rows:        u64,
    last_error:  Option<OutputError>,
}

impl<W: OutputWriter> NavOutputObserver<W> {
    /// Create an observer backed by `writer`; `tick_ms` converts ticks to
    /// elapsed game time.
    pub fn new(writer: W, tick_ms: u32) -> Self {
        Self { writer, tick_ms, write_paths: true, rows: 0, last_error: None }
    }

    /// Skip the per-waypoint rows of delivered paths.
    pub fn without_paths(mut self) -> Self {
        self.write_paths = false;
        self
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Rows handed to the writer so far, across all tables.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>, rows: usize) {
        match result {
            Ok(()) => self.rows += rows as u64,
            // Keep only the first error.
            Err(e) => {
                if self.last_error.is_none() {
                    self.last_error = Some(e);
                }
            }
        }
    }
}

impl<W: OutputWriter> NavObserver for NavOutputObserver<W> {
    fn on_path_delivered(&mut self, tick: Tick, delivery: &PathDelivery) {
        if !self.write_paths {
            return;
        }
        let rows: Vec<PathWaypointRow> = delivery
            .path
            .iter()
            .enumerate()
            .map(|(seq, wp)| PathWaypointRow {
                tick:      tick.0,
                search_id: delivery.search.0,
                agent_id:  delivery.agent.0,
                seq:       seq as u32,
                x:         wp.x,
                y:         wp.y,
            })
            .collect();
        if !rows.is_empty() {
            let result = self.writer.write_path(&rows);
            self.store_err(result, rows.len());
        }
    }

    fn on_tick_end(&mut self, stats: &TickStats) {
        let row = TickSummaryRow {
            tick:              stats.tick.0,
            elapsed_ms:        stats.tick.0 * self.tick_ms as u64,
            expansions:        stats.expansions,
            active_searches:   stats.active_searches as u32,
            finished_searches: stats.finished_searches as u32,
            deliveries:        stats.deliveries as u32,
            moving:            stats.moving as u32,
            completed:         stats.completed as u32,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result, 1);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore, controllers: &[Option<SteeringController>]) {
        let rows: Vec<AgentSnapshotRow> = (0..agents.count)
            .map(|i| {
                let controller = controllers.get(i).and_then(Option::as_ref);
                AgentSnapshotRow {
                    agent_id: i as u32,
                    tick:     tick.0,
                    x:        agents.pos[i].x,
                    y:        agents.pos[i].y,
                    layer:    agents.layer[i].0,
                    facing:   agents.facing[i].units(),
                    alive:    agents.alive[i],
                    state:    controller.map_or("idle", |c| c.state().label()),
                    waypoints_left: controller.map_or(0, |c| c.path().len() as u32),
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result, rows.len());
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result, 0);
    }
}
