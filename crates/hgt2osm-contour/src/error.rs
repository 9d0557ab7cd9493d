//! Error types for the contour crate.

use thiserror::Error;

/// Errors that can occur during contour level selection.
#[derive(Debug, Error)]
pub enum ContourError {
    /// Level configuration rejected before any processing starts.
    #[error("invalid level configuration: {0}")]
    InvalidLevelConfig(String),
}
