//! # hgt2osm-contour
//!
//! Contour level selection, raw contour extraction and line simplification
//! for elevation grids.
//!
//! Extraction sits behind the [`ContourExtractor`] trait so the numeric
//! tracing algorithm is replaceable; [`MarchingSquares`] is the built-in
//! implementation. Level selection and the simplification policy (endpoint
//! stability, closedness preservation, degenerate drops) are owned here.

mod error;
mod extract;
mod levels;
mod simplify;
mod types;

pub use error::ContourError;
pub use extract::{ContourExtractor, MarchingSquares};
pub use levels::{LevelConfig, LevelMode};
pub use simplify::simplify;
pub use types::{Coord, ElevationLevel, RawContour, SimplifiedContour};

/// Result type for contour operations.
pub type Result<T> = std::result::Result<T, ContourError>;
