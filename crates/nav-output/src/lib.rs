//! `nav-output` — navigation output writers for the `rts_nav` core.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                   |
//! |-----------|---------|-----------------------------------------------------------------|
//! | *(none)*  | CSV     | `agent_snapshots.csv`, `tick_summaries.csv`, `path_waypoints.csv` |
//! | `sqlite`  | SQLite  | `output.db`                                                     |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`NavOutputObserver`], which implements `nav_sim::NavObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use nav_output::{CsvWriter, NavOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = NavOutputObserver::new(writer, sim.config.tick_ms);
//! sim.run_until_idle(5_000, &mut obs);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::NavOutputObserver;
pub use row::{AgentSnapshotRow, PathWaypointRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
