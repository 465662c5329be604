//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `agent_snapshots`, `tick_summaries` and `path_waypoints`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, PathWaypointRow, TickSummaryRow};

/// Writes navigation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 agent_id       INTEGER NOT NULL,
                 tick           INTEGER NOT NULL,
                 x              INTEGER NOT NULL,
                 y              INTEGER NOT NULL,
                 layer          INTEGER NOT NULL,
                 facing         INTEGER NOT NULL,
                 alive          INTEGER NOT NULL,
                 state          TEXT    NOT NULL,
                 waypoints_left INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick              INTEGER PRIMARY KEY,
                 elapsed_ms        INTEGER NOT NULL,
                 expansions        INTEGER NOT NULL,
                 active_searches   INTEGER NOT NULL,
                 finished_searches INTEGER NOT NULL,
                 deliveries        INTEGER NOT NULL,
                 moving            INTEGER NOT NULL,
                 completed         INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS path_waypoints (
                 tick      INTEGER NOT NULL,
                 search_id INTEGER NOT NULL,
                 agent_id  INTEGER NOT NULL,
                 seq       INTEGER NOT NULL,
                 x         INTEGER NOT NULL,
                 y         INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (agent_id, tick, x, y, layer, facing, alive, state, waypoints_left) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id,
                    row.tick,
                    row.x,
                    row.y,
                    row.layer,
                    row.facing,
                    row.alive as i64,
                    row.state,
                    row.waypoints_left,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, elapsed_ms, expansions, active_searches, finished_searches, deliveries, moving, completed) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.tick,
                row.elapsed_ms,
                row.expansions,
                row.active_searches,
                row.finished_searches,
                row.deliveries,
                row.moving,
                row.completed,
            ],
        )?;
        Ok(())
    }

    fn write_path(&mut self, rows: &[PathWaypointRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO path_waypoints (tick, search_id, agent_id, seq, x, y) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.tick, row.search_id, row.agent_id, row.seq, row.x, row.y])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
