//! On-disk datasets: the growable sample array and its manifest.

pub mod manifest;
pub mod npy;

use thiserror::Error;

pub use manifest::DatasetManifest;
pub use npy::{DatasetReader, DatasetWriter};

/// Errors from dataset files.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset rows must have at least one column")]
    InvalidWidth,

    #[error("Row has {got} values, dataset width is {expected}")]
    WidthMismatch { expected: usize, got: usize },

    #[error("Malformed dataset header in {path}: {message}")]
    Header { path: String, message: String },

    #[error("Shape ({rows}, {width}) does not fit the reserved header")]
    HeaderOverflow { rows: u64, width: usize },

    #[error("Row {index} out of range for {rows} rows")]
    RowOutOfRange { index: u64, rows: u64 },

    #[error("Dataset writer already closed")]
    Closed,

    #[error("Failed to serialise manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
