//! In-memory elevation grid for a single tile.

use crate::{HgtError, Result, TileKey};

/// Sentinel marking missing elevation samples in SRTM data.
pub const NODATA: i16 = -0x8000;

/// Geographic bounds of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    /// Minimum latitude (south edge).
    pub min_lat: f64,
    /// Maximum latitude (north edge).
    pub max_lat: f64,
    /// Minimum longitude (west edge).
    pub min_lon: f64,
    /// Maximum longitude (east edge).
    pub max_lon: f64,
}

impl TileBounds {
    /// Bounds of the 1x1 degree cell identified by `key`.
    pub fn from_key(key: TileKey) -> Self {
        TileBounds {
            min_lat: key.lat as f64,
            max_lat: key.lat as f64 + 1.0,
            min_lon: key.lon as f64,
            max_lon: key.lon as f64 + 1.0,
        }
    }

    /// Check if a coordinate is within the bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// A single tile's elevation samples with geographic georeferencing.
///
/// Samples are stored in row-major order, row 0 at the north edge, matching
/// the SRTM file layout. A grid is immutable once constructed; the loading
/// stage owns it and releases it after all contour levels for the tile have
/// been extracted.
#[derive(Debug)]
pub struct Grid {
    /// Elevation samples in meters, north to south, west to east.
    samples: Vec<i16>,
    /// Samples per row and per column (SRTM tiles are square).
    dim: usize,
    /// Geographic bounds.
    bounds: TileBounds,
    /// Origin tile.
    key: TileKey,
}

impl Grid {
    /// Build a grid from raw samples.
    ///
    /// Fails with [`HgtError::MalformedGrid`] if the sample count is not
    /// `dim * dim`, if the grid is too small to contour, or if every sample
    /// is the nodata sentinel.
    pub fn from_samples(key: TileKey, samples: Vec<i16>, dim: usize) -> Result<Self> {
        if dim < 2 {
            return Err(HgtError::malformed(key, format!("dimension {dim} too small")));
        }
        if samples.len() != dim * dim {
            return Err(HgtError::malformed(
                key,
                format!("expected {} samples for dimension {dim}, got {}", dim * dim, samples.len()),
            ));
        }
        if samples.iter().all(|&s| s == NODATA) {
            return Err(HgtError::malformed(key, "tile contains no valid samples"));
        }
        Ok(Grid {
            samples,
            dim,
            bounds: TileBounds::from_key(key),
            key,
        })
    }

    /// Origin tile of this grid.
    pub fn key(&self) -> TileKey {
        self.key
    }

    /// Geographic bounds of this grid.
    pub fn bounds(&self) -> TileBounds {
        self.bounds
    }

    /// Samples per row (equals samples per column).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Sample resolution in arc-seconds: 3600 over the per-degree sample
    /// interval count (1201 samples -> 3 arc-seconds, 3601 -> 1).
    pub fn resolution_arcsec(&self) -> f64 {
        3600.0 * self.resolution_deg()
    }

    /// Sample spacing in degrees.
    pub fn resolution_deg(&self) -> f64 {
        (self.bounds.max_lat - self.bounds.min_lat) / (self.dim - 1) as f64
    }

    /// Raw sample at `(row, col)`; row 0 is the north edge.
    pub fn sample(&self, row: usize, col: usize) -> i16 {
        self.samples[row * self.dim + col]
    }

    /// Sample as `f64`, with nodata mapped to NaN for the contour tracer.
    pub fn sample_f64(&self, row: usize, col: usize) -> f64 {
        let v = self.sample(row, col);
        if v == NODATA {
            f64::NAN
        } else {
            v as f64
        }
    }

    /// Longitude of column `col`.
    pub fn lon_at(&self, col: f64) -> f64 {
        self.bounds.min_lon + col * self.resolution_deg()
    }

    /// Latitude of row `row`; row 0 is at the maximum latitude.
    pub fn lat_at(&self, row: f64) -> f64 {
        self.bounds.max_lat - row * self.resolution_deg()
    }

    /// Minimum and maximum elevation over the tile, ignoring nodata samples.
    ///
    /// Never `None` for a constructed grid, since construction rejects
    /// all-nodata tiles.
    pub fn elevation_range(&self) -> (i16, i16) {
        let mut min = i16::MAX;
        let mut max = i16::MIN;
        for &s in &self.samples {
            if s == NODATA {
                continue;
            }
            min = min.min(s);
            max = max.max(s);
        }
        (min, max)
    }

    /// Fraction of samples that carry the nodata sentinel.
    pub fn nodata_fraction(&self) -> f64 {
        let nodata = self.samples.iter().filter(|&&s| s == NODATA).count();
        nodata as f64 / self.samples.len() as f64
    }
}
