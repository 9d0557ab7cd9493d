//! # hgt2osm-stitch
//!
//! Cross-tile seam reconciliation: merges contour fragments whose endpoints
//! meet across shared tile edges into single continuous features, and
//! decides the final closed-ring versus open-line classification.
//!
//! Stitching runs per elevation level; fragments from different levels never
//! interact. Within a level it is exhaustive, deterministic and idempotent.

mod error;
mod reconcile;

pub use error::StitchError;
pub use reconcile::{stitch_level, StitchedFeature};

/// Result type for stitch operations.
pub type Result<T> = std::result::Result<T, StitchError>;
