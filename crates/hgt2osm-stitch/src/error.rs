//! Error types for seam reconciliation.

use thiserror::Error;

/// Errors that can occur while stitching fragments across tile seams.
#[derive(Debug, Error)]
pub enum StitchError {
    /// More than two fragment endpoints coincide at one point, so no
    /// two-way merge is well defined. Indicates corrupt or self-overlapping
    /// input; the level can still be emitted unstitched.
    #[error(
        "stitch inconsistency at elevation {elevation}: {count} fragment endpoints \
         coincide near ({lon:.7}, {lat:.7})"
    )]
    Inconsistency {
        /// Elevation of the affected level, in meters.
        elevation: i32,
        /// Longitude of the coincidence point.
        lon: f64,
        /// Latitude of the coincidence point.
        lat: f64,
        /// Number of endpoints at the point.
        count: usize,
    },
}
