//! Error taxonomy for the export pipeline.
//!
//! Every stage fails fast with a typed error; nothing downstream sees
//! best-effort corrupt output.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// The request was malformed before any work started (missing or
    /// conflicting input fields, bad configuration values).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Downloading the input from a URL failed.
    #[error("failed to fetch input: {0}")]
    Fetch(String),

    /// The GLB container was malformed or contained no usable geometry.
    #[error("malformed scene: {0}")]
    Parse(String),

    /// Geometry processing produced nothing usable (degenerate bounds,
    /// empty mesh after skipping bad primitives).
    #[error("geometry processing failed: {0}")]
    Processing(String),

    /// The final buffer could not be written as a valid file
    /// (non-finite coordinates, count overflow).
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
