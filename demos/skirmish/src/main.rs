//! skirmish — two squads cross a walled field through narrow gaps.
//!
//! Player 0 starts in the west and is ordered to the north-east corner.
//! Player 1 starts in the east and is ordered to the south-west corner.
//! A player 1 sentry holds the northern gap in attack stance and a player 0
//! scout follows the first enemy trooper.  Snapshots, tick summaries and
//! delivered paths are written to `output/skirmish/`.
//!
//! Squad members start at a seeded random point inside their assigned cell,
//! so the same seed always replays the same skirmish.
//!
//! Run with:
//!   cargo run -p skirmish --release [-- path/to/config.json [seed]]

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use nav_agent::{AgentSpec, AgentStore, AgentStoreBuilder};
use nav_core::{AgentId, CellPos, NavConfig, PlayerId, SimRng, Tick, WorldPos};
use nav_grid::GridMap;
use nav_output::{CsvWriter, NavOutputObserver, OutputWriter};
use nav_sched::{FinishedSearch, PathDelivery};
use nav_search::SearchStatus;
use nav_sim::{NavObserver, NavSimBuilder, TickStats};
use nav_steer::{MoveOutcome, MoveTarget, SteeringController, SteeringState};

// ── Constants ─────────────────────────────────────────────────────────────────

const SQUAD_SIZE:      usize = 8;
const MAX_TICKS:       u64   = 3_000;
const SNAPSHOT_EVERY:  u64   = 5;
const OUTPUT_DIR:      &str  = "output/skirmish";
const DEFAULT_SEED:    u64   = 0x5eed_2024;
/// Minimum distance from a start point to its cell's edges.
const START_MARGIN:    i32   = 320;

// 40×20 cells, first line is y = 0.  The wall at x = 20 has gaps at
// y = 4..=5 and y = 14..=15.
const MAP: &str = "\
....................#...................
....................#...................
....................#........####.......
....................#........####.......
........................................
........................................
....................#...................
....................#...................
........###.........#...................
........###.........#...................
........###.........#...................
........###.........#...................
....................#...................
....................#...................
........................................
........................................
....................#......#######......
....................#...................
....................#...................
....................#...................
";

fn cell(x: i32, y: i32) -> WorldPos {
    CellPos::ground(x, y).center()
}

// ── Outcome-tracking observer ─────────────────────────────────────────────────

/// Forwards everything to the output observer and keeps the final outcome
/// of every agent's move for the summary table.
struct SkirmishObserver<W: OutputWriter> {
    inner:       NavOutputObserver<W>,
    outcomes:    Vec<Option<MoveOutcome>>,
    searches:    usize,
    failed:      usize,
    expansions:  u64,
    peak_active: usize,
}

impl<W: OutputWriter> SkirmishObserver<W> {
    fn new(inner: NavOutputObserver<W>, agents: usize) -> Self {
        Self { inner, outcomes: vec![None; agents], searches: 0, failed: 0, expansions: 0, peak_active: 0 }
    }
}

impl<W: OutputWriter> NavObserver for SkirmishObserver<W> {
    fn on_search_finished(&mut self, tick: Tick, search: &FinishedSearch) {
        self.searches += 1;
        if search.status == SearchStatus::Failed {
            self.failed += 1;
        }
        self.inner.on_search_finished(tick, search);
    }

    fn on_path_delivered(&mut self, tick: Tick, delivery: &PathDelivery) {
        self.inner.on_path_delivered(tick, delivery);
    }

    fn on_state_change(&mut self, tick: Tick, agent: AgentId, from: SteeringState, to: SteeringState) {
        log::debug!("{tick}: {agent} {} -> {}", from.label(), to.label());
    }

    fn on_activity_completed(&mut self, tick: Tick, agent: AgentId, outcome: MoveOutcome) {
        log::info!("{tick}: {agent} finished with {outcome:?}");
        self.outcomes[agent.index()] = Some(outcome);
    }

    fn on_tick_end(&mut self, stats: &TickStats) {
        self.expansions += stats.expansions as u64;
        self.peak_active = self.peak_active.max(stats.active_searches);
        self.inner.on_tick_end(stats);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore, controllers: &[Option<SteeringController>]) {
        self.inner.on_snapshot(tick, agents, controllers);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── Setup helpers ─────────────────────────────────────────────────────────────

fn load_config(path: Option<String>) -> Result<NavConfig> {
    let Some(path) = path else {
        return Ok(NavConfig { snapshot_interval_ticks: SNAPSHOT_EVERY, ..NavConfig::default() });
    };
    let text = std::fs::read_to_string(&path)?;
    let config: NavConfig = serde_json::from_str(&text)?;
    println!("Loaded config from {path}");
    Ok(config)
}

fn parse_seed(arg: Option<String>) -> Result<u64> {
    match arg {
        Some(text) => Ok(text.parse()?),
        None => Ok(DEFAULT_SEED),
    }
}

/// Two squads of `SQUAD_SIZE` in a 2-wide block of cells, then the sentry
/// and scout.  Each squad draws its start points from its own child stream.
fn build_agents(rng: &mut SimRng) -> Result<(AgentStore, Vec<AgentId>, Vec<AgentId>, AgentId, AgentId)> {
    let mut builder = AgentStoreBuilder::new();

    let mut west_rng = rng.child(0);
    let west: Vec<AgentId> = (0..SQUAD_SIZE as i32)
        .map(|k| {
            let start = west_rng.point_in_cell(CellPos::ground(3 + k % 2 * 2, 2 + k / 2 * 2), START_MARGIN);
            builder.add(AgentSpec::new(PlayerId(0), start).speed(112))
        })
        .collect();
    let mut east_rng = rng.child(1);
    let east: Vec<AgentId> = (0..SQUAD_SIZE as i32)
        .map(|k| {
            let start = east_rng.point_in_cell(CellPos::ground(35 + k % 2 * 2, 10 + k / 2 * 2), START_MARGIN);
            builder.add(AgentSpec::new(PlayerId(1), start).speed(96))
        })
        .collect();
    let sentry = builder.add(AgentSpec::new(PlayerId(1), cell(21, 5)).radius(320));
    let scout = builder.add(AgentSpec::new(PlayerId(0), cell(2, 18)).speed(160).radius(192));

    Ok((builder.build()?, west, east, sentry, scout))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("=== skirmish — grid pathfinding & steering ===");

    let config = load_config(std::env::args().nth(1))?;
    let seed = parse_seed(std::env::args().nth(2))?;
    let map = GridMap::from_ascii(MAP)?;
    let mut rng = SimRng::new(seed);
    let (agents, west, east, sentry, scout) = build_agents(&mut rng)?;
    let agent_count = agents.count;
    println!(
        "Map: {}x{} cells  |  Agents: {agent_count}  |  Budget: {} expansions/tick  |  Seed: {seed:#x}",
        map.width(),
        map.height(),
        config.scheduler.expansion_budget
    );
    println!();

    let mut sim = NavSimBuilder::new(agents, map).config(config).build()?;

    // Orders are queued and applied at the first tick boundary.
    sim.set_attacking(sentry, true)?;
    sim.submit_move_order(&west, MoveTarget::Position(cell(35, 4)))?;
    sim.submit_move_order(&east, MoveTarget::Position(cell(4, 15)))?;
    sim.submit_move_order(&[scout], MoveTarget::Agent(east[0]))?;

    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = SkirmishObserver::new(NavOutputObserver::new(writer, sim.config.tick_ms), agent_count);

    let t0 = Instant::now();
    let ran = sim.run_until_idle(MAX_TICKS, &mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    println!(
        "Ran {ran} ticks ({} ms game time) in {:.3} s{}",
        sim.clock.elapsed_ms(),
        elapsed.as_secs_f64(),
        if sim.is_idle() { "" } else { "  (tick limit hit)" }
    );
    println!(
        "  searches: {} finished, {} failed  |  expansions: {}  |  peak active: {}",
        obs.searches, obs.failed, obs.expansions, obs.peak_active
    );
    println!("  rows written: {}", obs.inner.rows());
    println!();

    println!("{:<8} {:<7} {:<10} {:<18} {:<12}", "Agent", "Owner", "Role", "Cell", "Outcome");
    println!("{}", "-".repeat(58));
    for id in sim.agents.agent_ids() {
        let role = if id == sentry {
            "sentry"
        } else if id == scout {
            "scout"
        } else if west.contains(&id) {
            "west"
        } else {
            "east"
        };
        let outcome = match obs.outcomes[id.index()] {
            Some(o) => format!("{o:?}"),
            None => "-".to_owned(),
        };
        println!(
            "{:<8} {:<7} {:<10} {:<18} {:<12}",
            id.0,
            sim.agents.owner[id.index()].0,
            role,
            sim.agents.cell(id).to_string(),
            outcome
        );
    }

    Ok(())
}
