//! CSV obstacle loader.
//!
//! # CSV format
//!
//! One row per blocked cell.  `layer` is optional and defaults to ground.
//!
//! ```csv
//! x,y,layer
//! 4,0,0
//! 4,1,0
//! 9,3,1
//! ```
//!
//! Rows outside the declared map size are rejected rather than silently
//! dropped; an obstacle file that does not fit its map is a content error.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use nav_core::{CellPos, Layer};

use crate::grid::GridMap;
use crate::{GridError, GridResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct BlockedRecord {
    x:     i32,
    y:     i32,
    #[serde(default)]
    layer: u8,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a `width × height` map with `layers` layers, blocking every cell
/// listed in the CSV file at `path`.
pub fn load_blocked_csv(path: &Path, width: i32, height: i32, layers: u8) -> GridResult<GridMap> {
    let file = std::fs::File::open(path).map_err(GridError::Io)?;
    load_blocked_reader(file, width, height, layers)
}

/// Like [`load_blocked_csv`] but accepts any `Read` source.
pub fn load_blocked_reader<R: Read>(reader: R, width: i32, height: i32, layers: u8) -> GridResult<GridMap> {
    let mut map = GridMap::new(width, height, layers)?;
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = 0usize;

    for result in csv_reader.deserialize::<BlockedRecord>() {
        let row = result.map_err(|e| GridError::Parse(e.to_string()))?;
        map.set_blocked(CellPos::new(row.x, row.y, Layer(row.layer)), true)?;
        rows += 1;
    }

    log::debug!("loaded {rows} blocked cells into {width}×{height}×{layers} map");
    Ok(map)
}
