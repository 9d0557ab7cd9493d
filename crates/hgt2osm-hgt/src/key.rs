//! Tile keys, edges and the adjacency relation between 1x1 degree cells.

use std::fmt;

/// Identifies a 1x1 degree tile by the integer coordinates of its
/// southwest corner, SRTM-style: `N43E006` is `TileKey { lat: 43, lon: 6 }`.
///
/// Keys order in raster scan order (south to north, then west to east),
/// which is the processing order used everywhere a deterministic tile
/// sequence is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Latitude of the southwest corner in whole degrees.
    pub lat: i16,
    /// Longitude of the southwest corner in whole degrees.
    pub lon: i16,
}

impl TileKey {
    /// Create a key from southwest corner coordinates.
    pub fn new(lat: i16, lon: i16) -> Self {
        TileKey { lat, lon }
    }

    /// Parse a key from an SRTM-style filename like `N43E006.hgt` or
    /// `s09w140.hgt`. The name encodes the southwest corner of the tile.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let mut chars = filename.chars().peekable();
        while let Some(c) = chars.next() {
            let is_north = match c.to_ascii_lowercase() {
                'n' => true,
                's' => false,
                _ => continue,
            };
            let mut lat_str = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() {
                    lat_str.push(chars.next().unwrap());
                } else {
                    break;
                }
            }
            let is_east = match chars.next().map(|d| d.to_ascii_lowercase()) {
                Some('e') => true,
                Some('w') => false,
                _ => continue,
            };
            let mut lon_str = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() {
                    lon_str.push(chars.next().unwrap());
                } else {
                    break;
                }
            }
            if lat_str.is_empty() || lon_str.is_empty() {
                continue;
            }
            let lat: i16 = lat_str.parse().ok()?;
            let lon: i16 = lon_str.parse().ok()?;
            return Some(TileKey {
                lat: if is_north { lat } else { -lat },
                lon: if is_east { lon } else { -lon },
            });
        }
        None
    }

    /// Key of the neighboring tile across the given edge.
    pub fn neighbor(&self, edge: TileEdge) -> TileKey {
        match edge {
            TileEdge::North => TileKey::new(self.lat + 1, self.lon),
            TileEdge::South => TileKey::new(self.lat - 1, self.lon),
            TileEdge::East => TileKey::new(self.lat, self.lon + 1),
            TileEdge::West => TileKey::new(self.lat, self.lon - 1),
        }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ns, lat) = if self.lat >= 0 { ('N', self.lat) } else { ('S', -self.lat) };
        let (ew, lon) = if self.lon >= 0 { ('E', self.lon) } else { ('W', -self.lon) };
        write!(f, "{}{:02}{}{:03}", ns, lat, ew, lon)
    }
}

/// One edge of a tile's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileEdge {
    /// The north edge (maximum latitude).
    North,
    /// The south edge (minimum latitude).
    South,
    /// The east edge (maximum longitude).
    East,
    /// The west edge (minimum longitude).
    West,
}

impl TileEdge {
    /// All four edges.
    pub const ALL: [TileEdge; 4] = [
        TileEdge::North,
        TileEdge::South,
        TileEdge::East,
        TileEdge::West,
    ];

    /// The geometrically matching edge of the neighbor across this edge:
    /// a point on a tile's east edge lies on its east neighbor's west edge.
    pub fn opposite(&self) -> TileEdge {
        match self {
            TileEdge::North => TileEdge::South,
            TileEdge::South => TileEdge::North,
            TileEdge::East => TileEdge::West,
            TileEdge::West => TileEdge::East,
        }
    }
}
