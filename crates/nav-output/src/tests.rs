//! Integration tests for nav-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, PATH_HEADER, SNAPSHOT_HEADER, SUMMARY_HEADER};
    use crate::row::{AgentSnapshotRow, PathWaypointRow, TickSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn snap_row(agent_id: u32, tick: u64) -> AgentSnapshotRow {
        AgentSnapshotRow {
            agent_id,
            tick,
            x: 1_536 + agent_id as i32 * 1_024,
            y: 2_560,
            layer: 0,
            facing: 256,
            alive: true,
            state: "following",
            waypoints_left: 2,
        }
    }

    fn summary_row(tick: u64) -> TickSummaryRow {
        TickSummaryRow {
            tick,
            elapsed_ms: tick * 40,
            expansions: 120,
            active_searches: 2,
            finished_searches: 1,
            deliveries: 3,
            moving: 4,
            completed: 0,
        }
    }

    fn headers(path: &std::path::Path) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
        assert!(dir.path().join("path_waypoints.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(&dir.path().join("agent_snapshots.csv")), SNAPSHOT_HEADER);
        assert_eq!(headers(&dir.path().join("tick_summaries.csv")), SUMMARY_HEADER);
        assert_eq!(headers(&dir.path().join("path_waypoints.csv")), PATH_HEADER);
    }

    #[test]
    fn csv_snapshot_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 5), snap_row(1, 5), snap_row(2, 5)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "0"); // agent_id
        assert_eq!(&rows[0][1], "5"); // tick
        assert_eq!(&rows[1][2], "2560"); // x
        assert_eq!(&rows[2][6], "1"); // alive
        assert_eq!(&rows[2][7], "following");
    }

    #[test]
    fn csv_tick_summary_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(3)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "120"); // 3 * 40 ms
        assert_eq!(&rows[0][2], "120"); // expansions
    }

    #[test]
    fn csv_path_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows: Vec<PathWaypointRow> = (0..3)
            .map(|seq| PathWaypointRow { tick: 1, search_id: 7, agent_id: 2, seq, x: seq as i32 * 1_024, y: 0 })
            .collect();
        w.write_path(&rows).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("path_waypoints.csv")).unwrap();
        let read: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read.len(), 3);
        assert_eq!(&read[2][3], "2");
        assert_eq!(&read[2][4], "2048");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batches_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[]).unwrap();
        w.write_path(&[]).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("nope")).is_err());
    }
}

// ── Observer driven by a simulation ───────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use nav_agent::{AgentSpec, AgentStoreBuilder};
    use nav_core::{AgentId, NavConfig, PlayerId, WorldPos};
    use nav_grid::GridMap;
    use nav_sim::NavSimBuilder;
    use nav_steer::MoveTarget;

    use crate::csv::CsvWriter;
    use crate::observer::NavOutputObserver;

    fn sim(snapshot_interval_ticks: u64) -> nav_sim::NavSim<GridMap> {
        let agents = AgentStoreBuilder::new()
            .agent(AgentSpec::new(PlayerId(0), WorldPos::flat(1_536, 1_536)))
            .agent(AgentSpec::new(PlayerId(0), WorldPos::flat(1_536, 4_608)))
            .agent(AgentSpec::new(PlayerId(1), WorldPos::flat(9_728, 9_728)))
            .build()
            .unwrap();
        let config = NavConfig { snapshot_interval_ticks, ..NavConfig::default() };
        NavSimBuilder::new(agents, GridMap::new(12, 12, 1).unwrap()).config(config).build().unwrap()
    }

    #[test]
    fn integration_csv() {
        let mut sim = sim(2);
        sim.submit_move_order(&[AgentId(0)], MoveTarget::Position(WorldPos::flat(10_752, 1_536)))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut obs = NavOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), sim.config.tick_ms);
        sim.run_ticks(6, &mut obs);
        assert!(obs.take_error().is_none(), "no write errors expected");

        // Snapshots at ticks 0, 2, 4: 3 ticks × 3 agents.
        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let snaps: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(snaps.len(), 9);
        assert!(snaps.iter().any(|r| &r[0] == "0" && &r[7] != "idle"));
        assert!(snaps.iter().filter(|r| &r[0] == "2").all(|r| &r[7] == "idle"));

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(rdr.records().count(), 6);

        let mut rdr = csv::Reader::from_path(dir.path().join("path_waypoints.csv")).unwrap();
        let waypoints: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert!(!waypoints.is_empty());
        assert!(waypoints.iter().all(|r| &r[2] == "0"));
        assert_eq!(obs.rows(), 9 + 6 + waypoints.len() as u64);
    }

    #[test]
    fn paths_can_be_skipped() {
        let mut sim = sim(0);
        sim.submit_move_order(&[AgentId(0), AgentId(1)], MoveTarget::Position(WorldPos::flat(10_752, 1_536)))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut obs = NavOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), 40).without_paths();
        sim.run_ticks(3, &mut obs);
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("path_waypoints.csv")).unwrap();
        assert_eq!(rdr.records().count(), 0);
        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        assert_eq!(rdr.records().count(), 0);
        assert_eq!(obs.rows(), 3);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use crate::row::{AgentSnapshotRow, PathWaypointRow, TickSummaryRow};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn snap(agent_id: u32, alive: bool) -> AgentSnapshotRow {
        AgentSnapshotRow {
            agent_id,
            tick: 1,
            x: 100,
            y: 200,
            layer: 0,
            facing: 0,
            alive,
            state: "blocked",
            waypoints_left: 1,
        }
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_snapshot_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap(0, true), snap(1, true), snap(2, false)]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM agent_snapshots", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 3);
        let (alive, state): (i64, String) = conn
            .query_row("SELECT alive, state FROM agent_snapshots WHERE agent_id = 2", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(alive, 0);
        assert_eq!(state, "blocked");
    }

    #[test]
    fn sqlite_tick_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick: 7,
            elapsed_ms: 280,
            expansions: 2_000,
            active_searches: 3,
            finished_searches: 1,
            deliveries: 4,
            moving: 9,
            completed: 2,
        })
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (elapsed, expansions, moving): (i64, i64, i64) = conn
            .query_row("SELECT elapsed_ms, expansions, moving FROM tick_summaries WHERE tick = 7", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!((elapsed, expansions, moving), (280, 2_000, 9));
    }

    #[test]
    fn sqlite_path_waypoints() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        let rows: Vec<PathWaypointRow> = (0..4)
            .map(|seq| PathWaypointRow { tick: 0, search_id: 1, agent_id: 5, seq, x: 0, y: seq as i32 })
            .collect();
        w.write_path(&rows).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let max_seq: i64 =
            conn.query_row("SELECT MAX(seq) FROM path_waypoints WHERE agent_id = 5", [], |r| r.get(0)).unwrap();
        assert_eq!(max_seq, 3);
    }
}
