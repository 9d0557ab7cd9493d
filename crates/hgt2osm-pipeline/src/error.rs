//! Error types for pipeline orchestration.

use thiserror::Error;

/// Errors that abort a whole run.
///
/// Per-tile and per-level failures are not represented here: malformed
/// tiles are skipped with a warning and inconsistent levels fall back to
/// unstitched fragments, both isolated from sibling tiles and levels.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad level configuration, surfaced before any processing starts.
    #[error(transparent)]
    LevelConfig(#[from] hgt2osm_contour::ContourError),

    /// Output serialization failed; no partial output is committed.
    #[error(transparent)]
    Write(#[from] hgt2osm_osm::OsmError),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}
