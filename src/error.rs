//! Error types for fontlint
//!
//! All errors use the `thiserror` crate for minimal boilerplate and
//! proper error trait implementations. Snapshot precondition failures
//! are fatal for an analysis run; per-node fetch failures are handled
//! locally by the analyzer and never surface here.

use thiserror::Error;

/// Result type alias for fontlint operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for fontlint
#[derive(Error, Debug)]
pub enum Error {
    /// Snapshot precondition violation (malformed parallel arrays, no
    /// document matching the audited URL)
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Unexpected response from the DevTools transport
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Errors raised while joining the flattened snapshot arrays
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    /// No captured document matches the audited URL
    #[error("no document in snapshot matches '{url}'")]
    DocumentNotFound { url: String },

    /// A required parallel array disagrees with its siblings' length
    #[error("snapshot array '{field}' has {actual} entries, expected {expected}")]
    ParallelArrayMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A layout row points at a node index outside the node arrays
    #[error("layout row {row} references node index {node_index}, out of range")]
    LayoutIndexOutOfRange { row: usize, node_index: usize },
}
