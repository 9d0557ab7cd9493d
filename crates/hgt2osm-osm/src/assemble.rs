//! Feature assembly: identifiers, tags and area/line classification.

use serde::Deserialize;

use hgt2osm_contour::Coord;
use hgt2osm_stitch::StitchedFeature;

/// Meters to feet, applied once at assembly when the output unit is feet.
const METERS_TO_FEET: f64 = 1.0 / 0.3048;

/// Unit system for the elevation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationUnit {
    /// Meters (SRTM native).
    #[default]
    Meter,
    /// International feet.
    Foot,
}

/// Classification of an assembled feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// An open contour line, or a ring kept as a line.
    Line,
    /// A closed ring whose enclosed area meets the configured minimum.
    Area,
}

/// A finished feature ready for the writer. Immutable once created.
#[derive(Debug, Clone)]
pub struct OutputFeature {
    /// Run-scoped identifier, unique even across dropped features.
    pub id: u64,
    /// Ordered coordinates; closed rings do not repeat the first point.
    pub coords: Vec<Coord>,
    /// Whether the geometry closes back on itself.
    pub closed: bool,
    /// Area/line classification.
    pub kind: FeatureKind,
    /// Tags to write, in output order.
    pub tags: Vec<(String, String)>,
}

/// Assembly configuration.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Unit for the `ele` tag.
    pub unit: ElevationUnit,
    /// Minimum enclosed area for a closed ring, in square degrees. Rings
    /// below this are dropped entirely.
    pub min_area: f64,
    /// Maximum node count per written way; longer geometries are split
    /// into consecutive ways sharing a node at each cut. `0` disables
    /// splitting (values below 2 cannot split and behave the same).
    pub max_nodes_per_way: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            unit: ElevationUnit::Meter,
            min_area: 0.0,
            max_nodes_per_way: 0,
        }
    }
}

/// Assigns identifiers and tags to stitched features.
///
/// Identifier allocation is a single monotone sequence per run; it is the
/// one globally serialized resource in the pipeline, so assembly runs
/// single-threaded after all levels are stitched. Identifiers are consumed
/// even by features that are subsequently dropped as degenerate.
#[derive(Debug)]
pub struct FeatureAssembler {
    config: AssemblerConfig,
    next_id: u64,
    dropped: u64,
}

impl FeatureAssembler {
    /// Create an assembler for one output run. The identifier counter
    /// starts at 1.
    pub fn new(config: AssemblerConfig) -> Self {
        FeatureAssembler {
            config,
            next_id: 1,
            dropped: 0,
        }
    }

    /// Assemble one stitched feature into zero or more output ways.
    ///
    /// Returns nothing for degenerate geometry: fewer than 2 points, or a
    /// closed ring whose enclosed area is below the configured minimum.
    /// Dropping is silent filtering, not an error; the count is observable
    /// via [`FeatureAssembler::dropped`].
    ///
    /// A geometry exceeding the configured node limit is split into
    /// consecutive ways that share a node at each cut, each with its own
    /// identifier and the same tags. A split ring becomes open segments
    /// whose last one returns to the ring's first coordinate.
    pub fn assemble(&mut self, feature: &StitchedFeature, major: bool) -> Vec<OutputFeature> {
        let id = self.next_id;
        self.next_id += 1;

        if feature.coords.len() < 2 {
            self.dropped += 1;
            return Vec::new();
        }
        let kind = if feature.closed {
            if enclosed_area(&feature.coords) < self.config.min_area {
                self.dropped += 1;
                return Vec::new();
            }
            FeatureKind::Area
        } else {
            FeatureKind::Line
        };
        let tags = elevation_tags(feature.elevation, self.config.unit, major);

        // A closed way repeats its first node ref, so it writes one more
        // node than it stores.
        let node_count = feature.coords.len() + usize::from(feature.closed);
        let max = self.config.max_nodes_per_way;
        if max < 2 || node_count <= max {
            return vec![OutputFeature {
                id,
                coords: feature.coords.clone(),
                closed: feature.closed,
                kind,
                tags,
            }];
        }

        let mut path = feature.coords.clone();
        if feature.closed {
            path.push(feature.coords[0]);
        }
        let mut out = Vec::new();
        let mut id = id;
        let mut start = 0;
        while start + 1 < path.len() {
            let end = (start + max).min(path.len());
            out.push(OutputFeature {
                id,
                coords: path[start..end].to_vec(),
                closed: false,
                kind: FeatureKind::Line,
                tags: tags.clone(),
            });
            if end == path.len() {
                break;
            }
            start = end - 1;
            id = self.next_id;
            self.next_id += 1;
        }
        out
    }

    /// Number of features dropped as degenerate so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Tags for one contour feature: the elevation value in the configured
/// unit plus the contour styling tags.
fn elevation_tags(elevation_m: i32, unit: ElevationUnit, major: bool) -> Vec<(String, String)> {
    let value = match unit {
        ElevationUnit::Meter => elevation_m as f64,
        ElevationUnit::Foot => elevation_m as f64 * METERS_TO_FEET,
    };
    vec![
        ("ele".to_string(), format_elevation(value)),
        ("contour".to_string(), "elevation".to_string()),
        (
            "contour_ext".to_string(),
            if major {
                "elevation_major".to_string()
            } else {
                "elevation_minor".to_string()
            },
        ),
    ]
}

/// Format an elevation value without trailing noise: whole numbers print
/// without a decimal point, converted values keep two decimals.
fn format_elevation(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// Planar enclosed area of a ring by the shoelace formula, in square
/// degrees. The magnitude is used for classification; the sign (winding)
/// is the extractor's convention and irrelevant here.
pub fn enclosed_area(coords: &[Coord]) -> f64 {
    if coords.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..coords.len() {
        let a = coords[i];
        let b = coords[(i + 1) % coords.len()];
        sum += a.lon * b.lat - b.lon * a.lat;
    }
    (sum / 2.0).abs()
}
