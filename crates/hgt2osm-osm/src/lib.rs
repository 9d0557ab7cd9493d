//! # hgt2osm-osm
//!
//! Final assembly of stitched contours into uniquely identified, tagged
//! output features, and their serialization to the OSM XML wire format.
//!
//! Assembly is the only serialized stage of the pipeline: the identifier
//! counter is a single monotone sequence per run, never reset mid-run and
//! never reused, even for features that end up dropped as degenerate.

mod assemble;
mod error;
mod writer;

pub use assemble::{
    enclosed_area, AssemblerConfig, ElevationUnit, FeatureAssembler, FeatureKind, OutputFeature,
};
pub use error::OsmError;
pub use writer::{FeatureWriter, OsmXmlWriter};

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OsmError>;
