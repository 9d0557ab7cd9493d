//! # hgt2osm-hgt
//!
//! SRTM height-grid tile reader and tile adjacency model.
//!
//! SRTM `.hgt` tiles are square arrays of big-endian signed 16-bit elevation
//! samples covering one degree of latitude and longitude, named after their
//! southwest corner (`N43E006.hgt`). Missing samples carry the `-0x8000`
//! nodata sentinel and are excluded from elevation statistics and contouring.
//!
//! ```no_run
//! use hgt2osm_hgt::load_hgt;
//!
//! let grid = load_hgt("dem_data/N43E006.hgt")?;
//! let (min, max) = grid.elevation_range();
//! println!("{}: {min}..{max} m", grid.key());
//! # Ok::<(), hgt2osm_hgt::HgtError>(())
//! ```

mod error;
mod grid;
mod key;
mod loader;

pub use error::HgtError;
pub use grid::{Grid, TileBounds, NODATA};
pub use key::{TileEdge, TileKey};
pub use loader::load_hgt;

/// Result type for hgt operations.
pub type Result<T> = std::result::Result<T, HgtError>;
