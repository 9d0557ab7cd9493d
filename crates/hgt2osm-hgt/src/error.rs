//! Error types for the hgt crate.

use thiserror::Error;

/// Errors that can occur when loading height-grid tiles.
#[derive(Debug, Error)]
pub enum HgtError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source data does not form a valid grid.
    #[error("malformed grid {tile}: {reason}")]
    MalformedGrid {
        /// Tile the data was read for.
        tile: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Tile filename does not encode a southwest corner.
    #[error("invalid tile filename: {0}")]
    InvalidFilename(String),
}

impl HgtError {
    /// Shorthand for a [`HgtError::MalformedGrid`] with a formatted reason.
    pub(crate) fn malformed(tile: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        HgtError::MalformedGrid {
            tile: tile.to_string(),
            reason: reason.into(),
        }
    }
}
