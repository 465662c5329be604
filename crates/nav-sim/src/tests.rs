//! Integration tests for nav-sim.

use nav_agent::{AgentSpec, AgentStore, AgentStoreBuilder};
use nav_core::{AgentId, CELL_SIZE, HALF_CELL, NavConfig, PlayerId, Tick, WorldPos};
use nav_grid::{BlockingOracle, GridMap};
use nav_sched::{FinishedSearch, PathDelivery};
use nav_steer::{MoveOutcome, MoveTarget, SteeringController, SteeringState};

use crate::{NavObserver, NavSim, NavSimBuilder, NoopObserver, SimError, TickStats};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn center(x: i32, y: i32) -> WorldPos {
    WorldPos::flat(x * CELL_SIZE + HALF_CELL, y * CELL_SIZE + HALF_CELL)
}

fn store(positions: &[WorldPos]) -> AgentStore {
    let mut b = AgentStoreBuilder::new();
    for &p in positions {
        b.add(AgentSpec::new(PlayerId(0), p));
    }
    b.build().unwrap()
}

fn open_sim(size: i32, positions: &[WorldPos]) -> NavSim<GridMap> {
    NavSimBuilder::new(store(positions), GridMap::new(size, size, 1).unwrap()).build().unwrap()
}

/// Ten agents in a loose 4×3 block around cell (5, 5).
fn squad_positions() -> Vec<WorldPos> {
    (0..10).map(|k| WorldPos::flat(4_000 + (k % 4) * 800, 4_000 + (k / 4) * 800)).collect()
}

#[derive(Default)]
struct Recorder {
    outcomes:  Vec<(AgentId, MoveOutcome)>,
    finished:  Vec<FinishedSearch>,
    delivered: Vec<AgentId>,
    changes:   Vec<(AgentId, SteeringState, SteeringState)>,
    stats:     Vec<TickStats>,
    snapshots: usize,
    ended:     Option<Tick>,
}

impl Recorder {
    fn outcome(&self, agent: AgentId) -> Option<MoveOutcome> {
        self.outcomes.iter().rev().find(|(a, _)| *a == agent).map(|&(_, o)| o)
    }
}

impl NavObserver for Recorder {
    fn on_search_finished(&mut self, _tick: Tick, search: &FinishedSearch) {
        self.finished.push(search.clone());
    }

    fn on_path_delivered(&mut self, _tick: Tick, delivery: &PathDelivery) {
        self.delivered.push(delivery.agent);
    }

    fn on_state_change(&mut self, _tick: Tick, agent: AgentId, from: SteeringState, to: SteeringState) {
        self.changes.push((agent, from, to));
    }

    fn on_activity_completed(&mut self, _tick: Tick, agent: AgentId, outcome: MoveOutcome) {
        self.outcomes.push((agent, outcome));
    }

    fn on_tick_end(&mut self, stats: &TickStats) {
        self.stats.push(*stats);
    }

    fn on_snapshot(&mut self, _tick: Tick, _agents: &AgentStore, _controllers: &[Option<SteeringController>]) {
        self.snapshots += 1;
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.ended = Some(final_tick);
    }
}

// ── NavSimBuilder validation ──────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_successfully_with_defaults() {
        let sim = open_sim(10, &[center(1, 1), center(2, 2)]);
        assert_eq!(sim.agents.count, 2);
        assert_eq!(sim.controllers().len(), 2);
        assert_eq!(sim.now(), Tick(0));
        assert!(sim.is_idle());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = NavConfig::default();
        config.scheduler.expansion_budget = 0;
        let result = NavSimBuilder::new(store(&[center(1, 1)]), GridMap::new(10, 10, 1).unwrap())
            .config(config)
            .build();
        assert!(matches!(result, Err(SimError::Nav(_))));
    }

    #[test]
    fn agent_off_the_map_is_rejected() {
        let result =
            NavSimBuilder::new(store(&[center(1, 1), center(12, 1)]), GridMap::new(10, 10, 1).unwrap()).build();
        assert!(matches!(result, Err(SimError::OutsideMap { agent: AgentId(1), .. })));
    }
}

// ── Inbound API ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod orders {
    use super::*;

    #[test]
    fn bad_orders_are_refused() {
        let mut sim = open_sim(10, &[center(1, 1), center(2, 2)]);
        let goal = MoveTarget::Position(center(8, 8));
        assert!(matches!(sim.submit_move_order(&[], goal), Err(SimError::EmptyOrder)));
        assert!(matches!(sim.submit_move_order(&[AgentId(5)], goal), Err(SimError::UnknownAgent(AgentId(5)))));
        assert!(matches!(
            sim.submit_move_order(&[AgentId(0)], MoveTarget::Agent(AgentId(9))),
            Err(SimError::UnknownAgent(AgentId(9)))
        ));
        sim.kill(AgentId(1)).unwrap();
        assert!(matches!(sim.submit_move_order(&[AgentId(1)], goal), Err(SimError::DeadAgent(AgentId(1)))));
        assert!(matches!(sim.cancel(AgentId(3)), Err(SimError::UnknownAgent(AgentId(3)))));
    }

    #[test]
    fn orders_wait_for_the_tick_boundary() {
        let mut sim = open_sim(10, &[center(1, 1)]);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(center(8, 8))).unwrap();
        assert_eq!(sim.pending_orders().len(), 1);
        assert!(sim.controller(AgentId(0)).is_none());
        assert!(!sim.is_idle());

        let stats = sim.step(&mut NoopObserver);
        assert_eq!(stats.orders, 1);
        assert!(sim.pending_orders().is_empty());
        assert!(sim.controller(AgentId(0)).is_some());
    }

    #[test]
    fn single_agent_arrives() {
        let mut sim = open_sim(20, &[center(2, 2)]);
        let goal = center(16, 12);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(goal)).unwrap();

        let mut rec = Recorder::default();
        let ran = sim.run_until_idle(1_000, &mut rec);
        assert!(ran < 1_000);
        assert_eq!(rec.outcome(AgentId(0)), Some(MoveOutcome::Arrived));
        assert!(sim.agents.pos[0].distance_2d(goal) <= 256);
        assert!(sim.is_idle());
        assert_eq!(rec.ended, Some(sim.now()));
        assert_eq!(rec.snapshots, ran as usize);
    }

    #[test]
    fn delivery_starts_following() {
        let mut sim = open_sim(20, &[center(2, 2)]);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(center(16, 2))).unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(3, &mut rec);
        assert_eq!(rec.delivered, vec![AgentId(0)]);
        assert!(rec.changes.iter().any(|&(a, from, to)| {
            a == AgentId(0) && matches!(from, SteeringState::AwaitingPath { .. }) && to == SteeringState::Following
        }));
    }

    #[test]
    fn cancel_stops_the_agent() {
        let mut sim = open_sim(20, &[center(2, 2)]);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(center(17, 17))).unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(5, &mut rec);
        sim.cancel(AgentId(0)).unwrap();
        sim.step(&mut rec);

        assert_eq!(rec.outcome(AgentId(0)), Some(MoveOutcome::Cancelled));
        assert!(sim.controller(AgentId(0)).is_none());
        let stopped = sim.agents.pos[0];
        sim.run_ticks(5, &mut rec);
        assert_eq!(sim.agents.pos[0], stopped);
        assert!(sim.is_idle());
    }

    #[test]
    fn killed_agent_is_cancelled() {
        let mut sim = open_sim(20, &[center(2, 2)]);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(center(17, 17))).unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(3, &mut rec);
        sim.kill(AgentId(0)).unwrap();
        sim.step(&mut rec);
        assert!(!sim.agents.alive[0]);
        assert_eq!(rec.outcome(AgentId(0)), Some(MoveOutcome::Cancelled));
        assert!(sim.is_idle());
    }

    #[test]
    fn new_order_replaces_the_old_one() {
        let mut sim = open_sim(20, &[center(5, 5)]);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(center(17, 5))).unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(4, &mut rec);

        let second = center(5, 16);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(second)).unwrap();
        sim.run_until_idle(1_000, &mut rec);

        let outcomes: Vec<MoveOutcome> = rec.outcomes.iter().map(|&(_, o)| o).collect();
        assert_eq!(outcomes, vec![MoveOutcome::Cancelled, MoveOutcome::Arrived]);
        assert!(sim.agents.pos[0].distance_2d(second) <= 256);
    }

    #[test]
    fn following_an_agent_ends_in_contact() {
        let mut sim = open_sim(20, &[center(2, 3), center(15, 3)]);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Agent(AgentId(1))).unwrap();
        let mut rec = Recorder::default();
        sim.run_until_idle(1_000, &mut rec);
        assert_eq!(rec.outcome(AgentId(0)), Some(MoveOutcome::Arrived));
        assert!(sim.agents.pos[0].distance_2d(sim.agents.pos[1]) <= 512);
    }

    #[test]
    fn invisible_target_is_lost() {
        let mut sim = open_sim(20, &[center(2, 3), center(15, 3)]);
        sim.set_visible(AgentId(1), false).unwrap();
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Agent(AgentId(1))).unwrap();
        let mut rec = Recorder::default();
        sim.step(&mut rec);
        assert_eq!(rec.outcome(AgentId(0)), Some(MoveOutcome::TargetLost));
        assert!(sim.controller(AgentId(0)).is_none());
        assert_eq!(sim.agents.pos[0], center(2, 3));
    }
}

// ── Whole-loop scenarios ──────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use nav_core::{CellPos, Layer};
    use nav_grid::GridMapBuilder;

    use super::*;

    #[test]
    fn squad_shares_searches_and_arrives() {
        let mut sim = open_sim(40, &squad_positions());
        let squad: Vec<AgentId> = sim.agents.agent_ids().collect();
        sim.submit_move_order(&squad, MoveTarget::Position(center(34, 34))).unwrap();

        let mut rec = Recorder::default();
        sim.run_until_idle(2_000, &mut rec);

        assert!(rec.finished.len() < squad.len());
        for &a in &squad {
            assert!(rec.delivered.contains(&a), "{a} never got a path");
            assert_eq!(rec.outcome(a), Some(MoveOutcome::Arrived), "{a}");
        }
        let budget = sim.config.scheduler.expansion_budget;
        assert!(rec.stats.iter().all(|s| s.expansions <= budget));
    }

    #[test]
    fn squad_runs_are_deterministic() {
        let run = || {
            let mut sim = open_sim(40, &squad_positions());
            let squad: Vec<AgentId> = sim.agents.agent_ids().collect();
            sim.submit_move_order(&squad, MoveTarget::Position(center(30, 12))).unwrap();
            sim.run_ticks(150, &mut NoopObserver);
            (sim.agents.pos.clone(), sim.agents.facing.clone())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn agent_crosses_a_wall_gap_without_entering_blocked_cells() {
        let map = GridMapBuilder::new(20, 20)
            .wall_x(10, 0, 19, Layer::GROUND)
            .open(CellPos::ground(10, 9))
            .open(CellPos::ground(10, 10))
            .build()
            .unwrap();
        let mut sim = NavSimBuilder::new(store(&[center(3, 3)]), map).build().unwrap();
        let goal = center(16, 3);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(goal)).unwrap();

        let mut rec = Recorder::default();
        for _ in 0..1_500 {
            sim.step(&mut rec);
            assert!(!sim.oracle.is_blocked(sim.agents.cell(AgentId(0))));
            if sim.is_idle() {
                break;
            }
        }
        assert_eq!(rec.outcome(AgentId(0)), Some(MoveOutcome::Arrived));
        assert!(sim.agents.pos[0].distance_2d(goal) <= 256);
    }

    #[test]
    fn enclosed_destination_ends_outside_the_enclosure() {
        let map = GridMapBuilder::new(20, 20)
            .block_rect(9, 9, 11, 11, Layer::GROUND)
            .open(CellPos::ground(10, 10))
            .build()
            .unwrap();
        let mut sim = NavSimBuilder::new(store(&[center(2, 2)]), map).build().unwrap();
        let goal = center(10, 10);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(goal)).unwrap();

        let mut rec = Recorder::default();
        for _ in 0..1_500 {
            sim.step(&mut rec);
            assert!(!sim.oracle.is_blocked(sim.agents.cell(AgentId(0))));
            if sim.is_idle() {
                break;
            }
        }
        let search = &rec.finished[0];
        assert_ne!(search.path.last(), Some(goal));
        assert!(!search.path.is_empty());
        assert_ne!(sim.agents.cell(AgentId(0)), CellPos::ground(10, 10));
    }

    #[test]
    fn stats_track_searches_and_movement() {
        let mut sim = open_sim(20, &[center(2, 2), center(2, 5)]);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(center(15, 2))).unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(10, &mut rec);

        assert_eq!(rec.stats.len(), 10);
        assert_eq!(rec.stats[0].orders, 1);
        assert_eq!(rec.stats.iter().map(|s| s.finished_searches).sum::<usize>(), 1);
        assert_eq!(rec.stats.iter().map(|s| s.deliveries).sum::<usize>(), 1);
        assert_eq!(rec.stats[5].moving, 1);
        assert_eq!(rec.stats.iter().map(|s| s.tick).collect::<Vec<_>>(), (0..10).map(Tick).collect::<Vec<_>>());
    }
}

// ── Crowding and stalls ───────────────────────────────────────────────────────

#[cfg(test)]
mod crowding {
    use nav_core::Layer;
    use nav_grid::GridMapBuilder;

    use super::*;

    fn corridor() -> GridMap {
        GridMapBuilder::new(30, 5)
            .wall_y(0, 0, 29, Layer::GROUND)
            .wall_y(4, 0, 29, Layer::GROUND)
            .build()
            .unwrap()
    }

    #[test]
    fn idle_agent_in_a_corridor_is_passed() {
        let mut sim = NavSimBuilder::new(store(&[center(3, 2), center(8, 2)]), corridor()).build().unwrap();
        let goal = center(25, 2);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(goal)).unwrap();

        let mut rec = Recorder::default();
        for t in 0..600 {
            sim.step(&mut rec);
            let gap = sim.agents.pos[0].distance_2d(sim.agents.pos[1]);
            assert!(gap >= 256, "tick {t}: agents stacked {gap} apart");
            if sim.is_idle() {
                break;
            }
        }
        assert_eq!(rec.outcome(AgentId(0)), Some(MoveOutcome::Arrived));
        assert!(sim.agents.pos[0].distance_2d(goal) <= 256);
        assert_eq!(rec.finished.len(), 1, "no re-path was needed");
        assert!(sim.agents.cell(AgentId(1)).x < 10);
    }

    #[test]
    fn overlapping_idle_agents_spread_out() {
        let a = center(5, 5);
        let b = WorldPos::flat(a.x + 100, a.y);
        let mut sim = open_sim(10, &[a, b]);
        sim.run_ticks(20, &mut NoopObserver);
        let gap = sim.agents.pos[0].distance_2d(sim.agents.pos[1]);
        assert!((480..=512).contains(&gap), "{gap}");
        assert!(sim.agents.pos[0].x < a.x);
        assert!(sim.agents.pos[1].x > b.x);
    }

    #[test]
    fn attacking_agent_is_not_pushed() {
        let a = center(5, 5);
        let b = WorldPos::flat(a.x + 100, a.y);
        let mut sim = open_sim(10, &[a, b]);
        sim.set_attacking(AgentId(1), true).unwrap();
        sim.run_ticks(20, &mut NoopObserver);
        assert_eq!(sim.agents.pos[1], b);
        assert!(sim.agents.pos[0].distance_2d(b) >= 480);
    }

    #[test]
    fn unreachable_destination_ends_stuck() {
        let map = GridMapBuilder::new(20, 20).wall_x(10, 0, 19, Layer::GROUND).build().unwrap();
        let mut sim = NavSimBuilder::new(store(&[center(8, 5)]), map).build().unwrap();
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(center(15, 5))).unwrap();

        let mut rec = Recorder::default();
        let ran = sim.run_until_idle(400, &mut rec);
        assert!(ran < 400, "still moving after {ran} ticks");
        assert_eq!(rec.outcome(AgentId(0)), Some(MoveOutcome::Stuck));
        // The order's search and one per re-path, none of which found a way.
        assert_eq!(rec.finished.len(), 1 + sim.config.steering.max_repath_retries as usize);
        assert!(rec.finished.iter().all(|s| s.path.is_empty()));
        assert!(sim.agents.cell(AgentId(0)).x < 10);
        assert!(!sim.oracle.is_blocked(sim.agents.cell(AgentId(0))));
    }
}
