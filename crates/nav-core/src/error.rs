//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `NavError` as one variant
//! via `#[from]`.  Nothing on the per-tick path returns these; they surface
//! from configuration loading and builder validation.

use thiserror::Error;

use crate::AgentId;

/// The base error type shared by every `nav-*` crate.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `nav-*` crates.
pub type NavResult<T> = Result<T, NavError>;
