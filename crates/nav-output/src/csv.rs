//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`
//! - `path_waypoints.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, PathWaypointRow, TickSummaryRow};

pub const SNAPSHOT_HEADER: [&str; 9] =
    ["agent_id", "tick", "x", "y", "layer", "facing", "alive", "state", "waypoints_left"];

pub const SUMMARY_HEADER: [&str; 8] = [
    "tick",
    "elapsed_ms",
    "expansions",
    "active_searches",
    "finished_searches",
    "deliveries",
    "moving",
    "completed",
];

pub const PATH_HEADER: [&str; 6] = ["tick", "search_id", "agent_id", "seq", "x", "y"];

/// Writes navigation output to three CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    paths:     Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        let mut paths = Writer::from_path(dir.join("path_waypoints.csv"))?;
        paths.write_record(PATH_HEADER)?;

        Ok(Self { snapshots, summaries, paths, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.layer.to_string(),
                row.facing.to_string(),
                (row.alive as u8).to_string(),
                row.state.to_string(),
                row.waypoints_left.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_ms.to_string(),
            row.expansions.to_string(),
            row.active_searches.to_string(),
            row.finished_searches.to_string(),
            row.deliveries.to_string(),
            row.moving.to_string(),
            row.completed.to_string(),
        ])?;
        Ok(())
    }

    fn write_path(&mut self, rows: &[PathWaypointRow]) -> OutputResult<()> {
        for row in rows {
            self.paths.write_record(&[
                row.tick.to_string(),
                row.search_id.to_string(),
                row.agent_id.to_string(),
                row.seq.to_string(),
                row.x.to_string(),
                row.y.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        self.paths.flush()?;
        Ok(())
    }
}
