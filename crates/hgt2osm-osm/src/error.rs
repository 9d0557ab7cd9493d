//! Error types for feature output.

use thiserror::Error;

/// Errors that can occur when writing assembled features.
#[derive(Debug, Error)]
pub enum OsmError {
    /// I/O error writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
