//! Serialization of assembled features to the OSM XML wire format.

use std::io::Write;

use crate::{OutputFeature, Result};

/// Consumer of the final feature stream.
///
/// The contract is append-only and single-pass: the pipeline hands over the
/// complete stream exactly once, or not at all if the run failed earlier.
pub trait FeatureWriter {
    /// Write all features of a run.
    fn write_all(&mut self, features: &[OutputFeature]) -> Result<()>;
}

/// Writes features as an OSM XML change-style document.
///
/// Feature identifiers become way ids. Node ids are writer-internal,
/// allocated above the highest way id so the two sequences cannot collide.
/// A closed way repeats its first node reference last, the OSM convention
/// for rings.
#[derive(Debug)]
pub struct OsmXmlWriter<W: Write> {
    out: W,
    generator: String,
}

impl<W: Write> OsmXmlWriter<W> {
    /// Create a writer emitting to `out`.
    pub fn new(out: W) -> Self {
        OsmXmlWriter {
            out,
            generator: format!("hgt2osm {}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FeatureWriter for OsmXmlWriter<W> {
    fn write_all(&mut self, features: &[OutputFeature]) -> Result<()> {
        writeln!(self.out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            self.out,
            r#"<osm version="0.6" generator="{}">"#,
            self.generator
        )?;

        let mut next_node_id = features.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let mut node_refs: Vec<Vec<u64>> = Vec::with_capacity(features.len());

        for feature in features {
            let mut refs = Vec::with_capacity(feature.coords.len());
            for coord in &feature.coords {
                let id = next_node_id;
                next_node_id += 1;
                writeln!(
                    self.out,
                    r#"  <node id="{id}" lat="{:.7}" lon="{:.7}" version="1"/>"#,
                    coord.lat, coord.lon
                )?;
                refs.push(id);
            }
            node_refs.push(refs);
        }

        for (feature, refs) in features.iter().zip(&node_refs) {
            writeln!(self.out, r#"  <way id="{}" version="1">"#, feature.id)?;
            for r in refs {
                writeln!(self.out, r#"    <nd ref="{r}"/>"#)?;
            }
            if feature.closed {
                writeln!(self.out, r#"    <nd ref="{}"/>"#, refs[0])?;
            }
            for (k, v) in &feature.tags {
                writeln!(self.out, r#"    <tag k="{k}" v="{v}"/>"#)?;
            }
            writeln!(self.out, "  </way>")?;
        }

        writeln!(self.out, "</osm>")?;
        self.out.flush()?;
        Ok(())
    }
}
