//! Top-level error taxonomy and process exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by world generation and export.
#[derive(Error, Debug)]
pub enum WorldGenError {
    /// Invalid parameter values. Reported before any simulation runs.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// File create/write failure for an output artifact.
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A post-stage check failed; indicates a bug, not bad input.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// The abort flag was observed.
    #[error("generation cancelled")]
    Cancelled,

    /// Allocation for a dense field failed.
    #[error("allocation failed for field '{0}'")]
    FieldAllocation(&'static str),
}

impl WorldGenError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorldGenError::Config(_) => 2,
            WorldGenError::Io { .. } => 3,
            WorldGenError::Cancelled => 4,
            WorldGenError::Invariant(_) | WorldGenError::FieldAllocation(_) => 5,
        }
    }
}

/// Allocates a dense per-cell field, surfacing exhaustion as an error
/// instead of aborting.
pub fn alloc_field<T: Clone>(
    len: usize,
    fill: T,
    name: &'static str,
) -> Result<Vec<T>, WorldGenError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| WorldGenError::FieldAllocation(name))?;
    v.resize(len, fill);
    Ok(v)
}
