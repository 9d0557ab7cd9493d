//! Geometry types shared by the contour pipeline stages.

use hgt2osm_hgt::{TileEdge, TileKey};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
}

impl Coord {
    /// Create a coordinate.
    pub fn new(lon: f64, lat: f64) -> Self {
        Coord { lon, lat }
    }

    /// Euclidean distance to another coordinate, in degrees.
    ///
    /// Seam matching and simplification both operate in grid-local degree
    /// space, where rasterization noise lives; this is not a geodesic
    /// distance and is never used as one.
    pub fn distance(&self, other: &Coord) -> f64 {
        let dx = self.lon - other.lon;
        let dy = self.lat - other.lat;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A single contour level to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevationLevel {
    /// Elevation in meters.
    pub elevation: i32,
    /// Whether this is an emphasized ("major") level.
    pub major: bool,
}

/// An unsimplified contour fragment local to one tile.
///
/// Closed rings do not repeat their first coordinate; `closed` implies the
/// segment from the last coordinate back to the first.
#[derive(Debug, Clone)]
pub struct RawContour {
    /// Tile the fragment was extracted from.
    pub tile: TileKey,
    /// Elevation of the level it was extracted at, in meters.
    pub elevation: i32,
    /// Ordered coordinates.
    pub coords: Vec<Coord>,
    /// Whether the fragment forms a closed ring.
    pub closed: bool,
}

/// A contour fragment after vertex reduction, ready for stitching.
#[derive(Debug, Clone)]
pub struct SimplifiedContour {
    /// Tile the fragment was extracted from.
    pub tile: TileKey,
    /// Elevation in meters.
    pub elevation: i32,
    /// Ordered coordinates; first/last match the raw fragment exactly for
    /// open lines.
    pub coords: Vec<Coord>,
    /// Whether the fragment forms a closed ring.
    pub closed: bool,
    /// Tile edges the first coordinate lies on (empty for closed rings).
    pub start_edges: Vec<TileEdge>,
    /// Tile edges the last coordinate lies on (empty for closed rings).
    pub end_edges: Vec<TileEdge>,
}

impl SimplifiedContour {
    /// First coordinate.
    pub fn start(&self) -> Coord {
        self.coords[0]
    }

    /// Last coordinate.
    pub fn end(&self) -> Coord {
        *self.coords.last().expect("contour has at least two points")
    }
}
