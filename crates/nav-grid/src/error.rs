//! Grid-subsystem error type.

use thiserror::Error;

use nav_core::{CellPos, NavError};

/// Errors produced by `nav-grid`.  Only map construction and loading can fail;
/// queries against a built map never do.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid map dimensions {width}×{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("{0} lies outside the map")]
    OutOfBounds(CellPos),

    #[error("map parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] NavError),
}

pub type GridResult<T> = Result<T, GridError>;
