//! Error types for loading grids and driving the viewer session.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between a path on disk and a [`Mesh`](crate::data_structures::mesh::Mesh).
///
/// Callers treat this as a single failure kind: the file could not be turned
/// into a mesh and nothing will be shown. The variants only exist to keep the
/// message readable.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed grid file: {0}")]
    Parse(String),

    #[error("unsupported dataset: {0}")]
    Unsupported(String),

    #[error("{} contains no points", .0.display())]
    Empty(PathBuf),

    #[error("invalid cell {cell}: {reason}")]
    InvalidCell { cell: usize, reason: String },
}

/// Raised when the viewer is asked to move between two states that are not
/// connected, e.g. rendering after a failed load.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("cannot go from {from:?} via {via:?}")]
pub struct StateError {
    pub from: crate::session::ViewerState,
    pub via: crate::session::Transition,
}
