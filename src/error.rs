//! Error types for the indexing engine.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while indexing a subtree or querying the node store.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("malformed digest {0:?}: expected 40 hex characters")]
    MalformedDigest(String),

    #[error("tree structure violated: {0}")]
    Structure(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IndexError {
    /// I/O error tagged with the path it occurred on.
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        IndexError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
