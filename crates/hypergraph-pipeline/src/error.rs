use std::path::PathBuf;

use hypergraph_core::StorageError;
use thiserror::Error;

/// Ingestion failures
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid graph schema {path}: {message}")]
    Schema { path: PathBuf, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
