//! End-to-end tests for the contour pipeline.
//!
//! These build small synthetic grids and run the full chain: level
//! selection, extraction, simplification, stitching, assembly and output.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use hgt2osm_contour::{ContourExtractor, Coord, ElevationLevel, RawContour};
use hgt2osm_hgt::{Grid, TileKey};
use hgt2osm_osm::{FeatureKind, FeatureWriter, OsmXmlWriter, OutputFeature};
use hgt2osm_pipeline::{run_files, run_grids, run_grids_with, PipelineConfig, PipelineError};

/// Writer that keeps the feature stream for inspection.
#[derive(Debug, Default)]
struct CollectingWriter {
    features: Vec<OutputFeature>,
    calls: usize,
}

impl FeatureWriter for CollectingWriter {
    fn write_all(&mut self, features: &[OutputFeature]) -> hgt2osm_osm::Result<()> {
        self.calls += 1;
        self.features.extend_from_slice(features);
        Ok(())
    }
}

fn tag<'a>(feature: &'a OutputFeature, key: &str) -> Option<&'a str> {
    feature
        .tags
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// 3x3 grid with a single peak: center 100, edges 0.
fn peak_grid() -> Grid {
    let samples = vec![0, 0, 0, 0, 100, 0, 0, 0, 0];
    Grid::from_samples(TileKey::new(0, 0), samples, 3).unwrap()
}

/// Two adjacent tiles, each carrying half of a straight contour line at
/// elevation 200 that crosses their shared longitude boundary.
fn seam_grids() -> Vec<Grid> {
    let samples = vec![400, 400, 400, 0, 0, 0, 0, 0, 0];
    vec![
        Grid::from_samples(TileKey::new(0, 0), samples.clone(), 3).unwrap(),
        Grid::from_samples(TileKey::new(0, 1), samples, 3).unwrap(),
    ]
}

#[test]
fn peak_yields_a_ring_tagged_with_its_level() {
    let config = PipelineConfig {
        step: 50,
        ..PipelineConfig::default()
    };
    let mut writer = CollectingWriter::default();
    let stats = run_grids(vec![peak_grid()], &config, &mut writer).unwrap();

    // Levels 0, 50 and 100 are in range. Level 0 produces nothing on a
    // grid with no negative samples, and at level 100 the contour
    // degenerates onto the single peak sample, so only the level-50 ring
    // comes out.
    assert_eq!(stats.tiles_processed, 1);
    assert_eq!(writer.features.len(), 1);

    let at_50: Vec<&OutputFeature> = writer
        .features
        .iter()
        .filter(|f| tag(f, "ele") == Some("50"))
        .collect();
    assert_eq!(at_50.len(), 1);
    let ring = at_50[0];
    assert!(ring.closed);
    assert_eq!(ring.kind, FeatureKind::Area);
    assert_eq!(tag(ring, "contour"), Some("elevation"));
    // The ring surrounds the peak at the tile center.
    for c in &ring.coords {
        assert!((c.lon - 0.5).abs() <= 0.5 && (c.lat - 0.5).abs() <= 0.5);
    }
}

#[test]
fn adjacent_tiles_stitch_into_one_feature() {
    let config = PipelineConfig {
        levels: Some(vec![200]),
        ..PipelineConfig::default()
    };
    let mut writer = CollectingWriter::default();
    let stats = run_grids(seam_grids(), &config, &mut writer).unwrap();

    assert_eq!(stats.tiles_processed, 2);
    assert_eq!(stats.levels_stitched, 1);
    assert_eq!(writer.features.len(), 1);

    let feature = &writer.features[0];
    assert!(!feature.closed);
    assert_eq!(tag(feature, "ele"), Some("200"));
    // The straight line simplifies to its endpoints per tile; the seam
    // point appears once, so three coordinates span both tiles.
    assert_eq!(feature.coords.len(), 3);
    assert_eq!(feature.coords.first().unwrap().lon, 0.0);
    assert_eq!(feature.coords.last().unwrap().lon, 2.0);
    for c in &feature.coords {
        approx::assert_relative_eq!(c.lat, 0.75, epsilon = 1e-9);
    }
    for pair in feature.coords.windows(2) {
        assert!(pair[0].lon < pair[1].lon, "no duplicate at the seam");
    }
}

/// Extractor returning preset fragments per tile and level, for driving
/// stitch behavior the marching-squares tracer never produces on its own.
struct ScriptedExtractor;

impl ContourExtractor for ScriptedExtractor {
    fn extract(&self, grid: &Grid, level: ElevationLevel) -> Vec<RawContour> {
        let open = |coords: &[(f64, f64)]| RawContour {
            tile: grid.key(),
            elevation: level.elevation,
            coords: coords
                .iter()
                .map(|&(lon, lat)| Coord::new(lon, lat))
                .collect(),
            closed: false,
        };
        match (grid.key().lon, level.elevation) {
            // Three endpoints coincide at the seam point: unstitchable.
            (0, 100) => vec![
                open(&[(0.2, 0.3), (1.0, 0.5)]),
                open(&[(0.2, 0.7), (1.0, 0.5)]),
            ],
            (1, 100) => vec![open(&[(1.0, 0.5), (1.8, 0.5)])],
            // A clean seam one level up.
            (0, 200) => vec![open(&[(0.0, 0.4), (1.0, 0.4)])],
            (1, 200) => vec![open(&[(1.0, 0.4), (2.0, 0.4)])],
            _ => Vec::new(),
        }
    }
}

#[test]
fn inconsistent_level_is_emitted_unstitched_while_siblings_proceed() {
    let config = PipelineConfig {
        levels: Some(vec![100, 200]),
        ..PipelineConfig::default()
    };
    let mut writer = CollectingWriter::default();
    let stats = run_grids_with(seam_grids(), &ScriptedExtractor, &config, &mut writer).unwrap();

    assert_eq!(stats.levels_unstitched, 1);
    assert_eq!(stats.levels_stitched, 1);

    // The inconsistent level's fragments come through unmerged.
    let at_100: Vec<&OutputFeature> = writer
        .features
        .iter()
        .filter(|f| tag(f, "ele") == Some("100"))
        .collect();
    assert_eq!(at_100.len(), 3);
    assert!(at_100.iter().all(|f| f.coords.len() == 2 && !f.closed));

    // The clean level still stitched into one feature.
    let at_200: Vec<&OutputFeature> = writer
        .features
        .iter()
        .filter(|f| tag(f, "ele") == Some("200"))
        .collect();
    assert_eq!(at_200.len(), 1);
    assert_eq!(at_200[0].coords.len(), 3);
}

#[test]
fn long_ways_split_at_the_configured_node_limit() {
    let config = PipelineConfig {
        levels: Some(vec![200]),
        max_nodes_per_way: 2,
        ..PipelineConfig::default()
    };
    let mut writer = CollectingWriter::default();
    let stats = run_grids(seam_grids(), &config, &mut writer).unwrap();

    // The stitched three-point line splits into two two-node ways sharing
    // the cut node, each with its own id.
    assert_eq!(stats.features_written, 2);
    assert!(writer.features.iter().all(|f| f.coords.len() <= 2));
    assert_eq!(
        *writer.features[0].coords.last().unwrap(),
        writer.features[1].coords[0]
    );
    let ids: Vec<u64> = writer.features.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn identifiers_are_unique_across_tiles_and_levels() {
    let config = PipelineConfig {
        step: 20,
        ..PipelineConfig::default()
    };
    let mut grids = seam_grids();
    grids.push(peak_grid_at(TileKey::new(1, 0)));
    let mut writer = CollectingWriter::default();
    run_grids(grids, &config, &mut writer).unwrap();

    let mut ids: Vec<u64> = writer.features.iter().map(|f| f.id).collect();
    let count = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), count, "duplicate feature id");
}

fn peak_grid_at(key: TileKey) -> Grid {
    let samples = vec![0, 0, 0, 0, 100, 0, 0, 0, 0];
    Grid::from_samples(key, samples, 3).unwrap()
}

#[test]
fn small_rings_are_dropped_but_consume_ids() {
    let config = PipelineConfig {
        step: 50,
        // The level-50 ring encloses ~0.125 square degrees.
        min_area: 0.5,
        ..PipelineConfig::default()
    };
    let mut writer = CollectingWriter::default();
    let stats = run_grids(vec![peak_grid()], &config, &mut writer).unwrap();

    assert_eq!(stats.features_written, 0);
    assert_eq!(stats.features_dropped, 1);
    assert!(writer.features.is_empty());
}

#[test]
fn invalid_level_config_aborts_before_any_output() {
    let config = PipelineConfig {
        step: 0,
        ..PipelineConfig::default()
    };
    let mut writer = CollectingWriter::default();
    let err = run_grids(vec![peak_grid()], &config, &mut writer).unwrap_err();
    assert!(matches!(err, PipelineError::LevelConfig(_)));
    assert_eq!(writer.calls, 0, "writer must not see a failed run");
}

fn write_hgt(dir: &Path, name: &str, samples: &[i16]) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    for s in samples {
        file.write_all(&s.to_be_bytes()).unwrap();
    }
    path
}

#[test]
fn hgt_files_to_osm_xml_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let samples: Vec<i16> = vec![400, 400, 400, 0, 0, 0, 0, 0, 0];
    let west = write_hgt(dir.path(), "N00E000.hgt", &samples);
    let east = write_hgt(dir.path(), "N00E001.hgt", &samples);
    // Truncated tile: loaded tiles are unaffected, this one is skipped.
    let bad = write_hgt(dir.path(), "N00E005.hgt", &[1, 2, 3]);

    let config = PipelineConfig {
        levels: Some(vec![200]),
        ..PipelineConfig::default()
    };
    let mut writer = OsmXmlWriter::new(Vec::new());
    let stats = run_files(&[west, east, bad], &config, &mut writer).unwrap();

    assert_eq!(stats.tiles_processed, 2);
    assert_eq!(stats.tiles_skipped, 1);
    assert_eq!(stats.features_written, 1);

    let xml = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(xml.matches("<way").count(), 1);
    assert_eq!(xml.matches("<node").count(), 3);
    assert!(xml.contains(r#"<tag k="ele" v="200"/>"#));
    assert!(xml.trim_end().ends_with("</osm>"));
}
