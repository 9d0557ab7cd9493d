//! # hgt2osm-pipeline
//!
//! Orchestration of the contour pipeline: grid loading, per-tile contour
//! extraction and simplification, per-level seam reconciliation, feature
//! assembly and output.
//!
//! ## Scheduling
//!
//! Tile work (extraction through simplification) is independently parallel
//! across tiles; no shared state is touched. Seam reconciliation needs all
//! fragments of a level across all tiles, so levels act as barriers, but
//! distinct levels stitch in parallel with each other. Assembly runs
//! single-threaded: the identifier sequence is the one serialized resource.
//! Parallel results are collected and then processed in deterministic order
//! (tiles in scan order, levels ascending), so output is reproducible.
//!
//! ## Failure isolation
//!
//! A malformed tile is skipped with a warning; an inconsistent level is
//! emitted unstitched with a warning. Level configuration errors abort the
//! run before any work, and the writer receives either the complete feature
//! stream or nothing.

mod config;
mod error;

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use tracing::{info, warn};

use hgt2osm_contour::{
    simplify, ContourError, ContourExtractor, ElevationLevel, LevelConfig, MarchingSquares,
    SimplifiedContour,
};
use hgt2osm_hgt::{load_hgt, Grid};
use hgt2osm_osm::{AssemblerConfig, FeatureAssembler, FeatureWriter, OutputFeature};
use hgt2osm_stitch::{stitch_level, StitchedFeature};

pub use config::PipelineConfig;
pub use error::PipelineError;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Counters observable after a run. Degenerate-geometry drops are visible
/// only here; they are not errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Tiles contoured successfully.
    pub tiles_processed: u64,
    /// Tiles skipped because their source data was malformed.
    pub tiles_skipped: u64,
    /// Elevation levels stitched cleanly.
    pub levels_stitched: u64,
    /// Levels emitted unstitched after a stitch inconsistency.
    pub levels_unstitched: u64,
    /// Features handed to the writer.
    pub features_written: u64,
    /// Features dropped as degenerate during assembly.
    pub features_dropped: u64,
}

/// Run the full pipeline over `.hgt` files.
///
/// Malformed tiles are skipped with a warning; the rest of the run
/// continues. All other semantics match [`run_grids`].
pub fn run_files<P, W>(paths: &[P], config: &PipelineConfig, writer: &mut W) -> Result<RunStats>
where
    P: AsRef<Path>,
    W: FeatureWriter,
{
    let mut grids = Vec::new();
    let mut skipped = 0u64;
    for path in paths {
        match load_hgt(path) {
            Ok(grid) => grids.push(grid),
            Err(err) => {
                warn!(path = %path.as_ref().display(), %err, "skipping tile");
                skipped += 1;
            }
        }
    }
    let mut stats = run_grids(grids, config, writer)?;
    stats.tiles_skipped += skipped;
    Ok(stats)
}

/// Run the pipeline over already-loaded grids with the built-in
/// marching-squares extractor.
pub fn run_grids<W: FeatureWriter>(
    grids: Vec<Grid>,
    config: &PipelineConfig,
    writer: &mut W,
) -> Result<RunStats> {
    run_grids_with(grids, &MarchingSquares, config, writer)
}

/// Run the pipeline over already-loaded grids with a custom contour
/// extractor.
pub fn run_grids_with<E, W>(
    mut grids: Vec<Grid>,
    extractor: &E,
    config: &PipelineConfig,
    writer: &mut W,
) -> Result<RunStats>
where
    E: ContourExtractor + Sync,
    W: FeatureWriter,
{
    // Run-fatal configuration problems surface before any tile work.
    let level_config = config.level_config();
    level_config.validate()?;

    grids.sort_by_key(Grid::key);
    let finest = grids
        .iter()
        .map(Grid::resolution_deg)
        .fold(f64::INFINITY, f64::min);
    // Seam matching absorbs rasterization noise up to half a sample
    // spacing; simplification keeps deviations two orders of magnitude
    // smaller so lines stay true to the source data.
    let finest = if finest.is_finite() { finest } else { 0.0 };
    let simplify_tolerance = config.simplify_tolerance.unwrap_or(finest / 100.0);
    let merge_tolerance = config.merge_tolerance.unwrap_or(finest / 2.0);

    let mut stats = RunStats {
        tiles_processed: grids.len() as u64,
        ..RunStats::default()
    };

    // Fan-out per tile. Each task owns its grid and drops it once the
    // tile's fragments exist; rayon's collect preserves scan order.
    let per_tile: Vec<Vec<(ElevationLevel, Vec<SimplifiedContour>)>> = grids
        .into_par_iter()
        .map(|grid| contour_tile(grid, extractor, &level_config, simplify_tolerance, merge_tolerance))
        .collect::<std::result::Result<_, ContourError>>()?;

    // Fan-in: group fragments per elevation, ascending.
    let mut by_level: BTreeMap<i32, (bool, Vec<SimplifiedContour>)> = BTreeMap::new();
    for tile_levels in per_tile {
        for (level, fragments) in tile_levels {
            by_level
                .entry(level.elevation)
                .or_insert_with(|| (level.major, Vec::new()))
                .1
                .extend(fragments);
        }
    }

    // Levels stitch independently of each other; an inconsistent level
    // falls back to its unstitched fragments instead of aborting siblings.
    let levels: Vec<(i32, bool, Vec<SimplifiedContour>)> = by_level
        .into_iter()
        .map(|(elevation, (major, fragments))| (elevation, major, fragments))
        .collect();
    let stitched: Vec<(bool, bool, Vec<StitchedFeature>)> = levels
        .into_par_iter()
        .map(|(elevation, major, fragments)| match stitch_level(&fragments, merge_tolerance) {
            Ok(features) => (major, false, features),
            Err(err) => {
                warn!(elevation, %err, "emitting level unstitched");
                let features = fragments
                    .into_iter()
                    .map(|f| StitchedFeature {
                        elevation: f.elevation,
                        coords: f.coords,
                        closed: f.closed,
                    })
                    .collect();
                (major, true, features)
            }
        })
        .collect();

    // Assembly: the single serialized stage.
    let mut assembler = FeatureAssembler::new(AssemblerConfig {
        unit: config.unit,
        min_area: config.min_area,
        max_nodes_per_way: config.max_nodes_per_way,
    });
    let mut features: Vec<OutputFeature> = Vec::new();
    for (major, unstitched, level_features) in stitched {
        if unstitched {
            stats.levels_unstitched += 1;
        } else {
            stats.levels_stitched += 1;
        }
        for feature in &level_features {
            features.extend(assembler.assemble(feature, major));
        }
    }
    stats.features_dropped = assembler.dropped();
    stats.features_written = features.len() as u64;

    writer.write_all(&features)?;
    info!(
        tiles = stats.tiles_processed,
        features = stats.features_written,
        dropped = stats.features_dropped,
        "run complete"
    );
    Ok(stats)
}

/// Contour one tile at all of its levels: extraction then simplification.
/// Consumes the grid; nothing downstream needs the samples again.
fn contour_tile<E: ContourExtractor>(
    grid: Grid,
    extractor: &E,
    level_config: &LevelConfig,
    simplify_tolerance: f64,
    merge_tolerance: f64,
) -> std::result::Result<Vec<(ElevationLevel, Vec<SimplifiedContour>)>, ContourError> {
    let (min_ele, max_ele) = grid.elevation_range();
    let levels = level_config.select(min_ele as i32, max_ele as i32)?;
    let bounds = grid.bounds();
    Ok(levels
        .into_iter()
        .map(|level| {
            let fragments = extractor
                .extract(&grid, level)
                .iter()
                .filter_map(|raw| simplify(raw, simplify_tolerance, &bounds, merge_tolerance))
                .collect();
            (level, fragments)
        })
        .collect())
}
