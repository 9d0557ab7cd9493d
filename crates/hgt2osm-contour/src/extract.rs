//! Raw contour extraction from an elevation grid.
//!
//! The pipeline treats extraction as a pluggable collaborator behind the
//! [`ContourExtractor`] trait; [`MarchingSquares`] is the built-in
//! implementation.

use hgt2osm_hgt::Grid;

use crate::{Coord, ElevationLevel, RawContour};

/// Matching tolerance for chaining segment endpoints, in grid cell units.
/// Interpolated crossings on a shared cell edge are computed from the same
/// two samples, so matches are exact up to floating-point rounding.
const CHAIN_EPS: f64 = 1e-6;

/// Trait for contour extraction strategies.
///
/// Given a grid and a single level, returns zero or more raw fragments at
/// that elevation. Closed rings must wind consistently across all fragments
/// of a level so that the enclosed-area sign convention holds downstream.
pub trait ContourExtractor {
    /// Extract all fragments of `grid` at `level`.
    fn extract(&self, grid: &Grid, level: ElevationLevel) -> Vec<RawContour>;
}

/// Marching-squares contour extraction with linear edge interpolation.
///
/// Cells with a nodata corner are skipped, which opens contours at nodata
/// boundaries instead of inventing geometry there.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarchingSquares;

/// A point in grid-local coordinates: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GridPt {
    x: f64,
    y: f64,
}

type Segment = (GridPt, GridPt);

impl ContourExtractor for MarchingSquares {
    fn extract(&self, grid: &Grid, level: ElevationLevel) -> Vec<RawContour> {
        let threshold = level.elevation as f64;
        let segments = march(grid, threshold);
        chain_segments(&segments)
            .into_iter()
            .map(|(points, closed)| RawContour {
                tile: grid.key(),
                elevation: level.elevation,
                coords: points
                    .iter()
                    .map(|p| Coord::new(grid.lon_at(p.x), grid.lat_at(p.y)))
                    .collect(),
                closed,
            })
            .collect()
    }
}

/// Walk every cell and collect the crossing segments for one threshold.
fn march(grid: &Grid, level: f64) -> Vec<Segment> {
    let dim = grid.dim();
    let mut segments = Vec::new();
    for row in 0..dim - 1 {
        for col in 0..dim - 1 {
            let tl = grid.sample_f64(row, col);
            let tr = grid.sample_f64(row, col + 1);
            let bl = grid.sample_f64(row + 1, col);
            let br = grid.sample_f64(row + 1, col + 1);
            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if tl >= level {
                case |= 1;
            }
            if tr >= level {
                case |= 2;
            }
            if br >= level {
                case |= 4;
            }
            if bl >= level {
                case |= 8;
            }

            let x = col as f64;
            let y = row as f64;
            let top = crossing(x, y, x + 1.0, y, tl, tr, level);
            let right = crossing(x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
            let bottom = crossing(x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
            let left = crossing(x, y, x, y + 1.0, tl, bl, level);

            let cell: [Option<Segment>; 2] = match case {
                0 | 15 => [None, None],
                1 | 14 => [Some((left, top)), None],
                2 | 13 => [Some((top, right)), None],
                3 | 12 => [Some((left, right)), None],
                4 | 11 => [Some((right, bottom)), None],
                // Saddles: two independent crossings in one cell.
                5 => [Some((left, top)), Some((right, bottom))],
                6 | 9 => [Some((top, bottom)), None],
                7 | 8 => [Some((left, bottom)), None],
                10 => [Some((top, right)), Some((left, bottom))],
                _ => unreachable!(),
            };
            for (a, b) in cell.into_iter().flatten() {
                if !points_close(a, b) {
                    segments.push((a, b));
                }
            }
        }
    }
    segments
}

/// Interpolated crossing of the level along one cell edge.
fn crossing(x1: f64, y1: f64, x2: f64, y2: f64, v1: f64, v2: f64, level: f64) -> GridPt {
    if (v2 - v1).abs() < f64::EPSILON {
        return GridPt {
            x: (x1 + x2) / 2.0,
            y: (y1 + y2) / 2.0,
        };
    }
    let t = ((level - v1) / (v2 - v1)).clamp(0.0, 1.0);
    GridPt {
        x: x1 + t * (x2 - x1),
        y: y1 + t * (y2 - y1),
    }
}

fn points_close(a: GridPt, b: GridPt) -> bool {
    (a.x - b.x).abs() < CHAIN_EPS && (a.y - b.y).abs() < CHAIN_EPS
}

/// Chain unordered crossing segments into polylines, growing each chain at
/// both ends until nothing attaches. A chain whose ends meet becomes a
/// closed ring with the duplicate point removed.
fn chain_segments(segments: &[Segment]) -> Vec<(Vec<GridPt>, bool)> {
    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut points = vec![segments[seed].0, segments[seed].1];

        loop {
            let mut attached = false;
            let tail = *points.last().unwrap();
            for (i, seg) in segments.iter().enumerate() {
                if used[i] {
                    continue;
                }
                if points_close(seg.0, tail) {
                    points.push(seg.1);
                } else if points_close(seg.1, tail) {
                    points.push(seg.0);
                } else {
                    continue;
                }
                used[i] = true;
                attached = true;
                break;
            }
            if attached {
                continue;
            }
            let head = points[0];
            for (i, seg) in segments.iter().enumerate() {
                if used[i] {
                    continue;
                }
                if points_close(seg.0, head) {
                    points.insert(0, seg.1);
                } else if points_close(seg.1, head) {
                    points.insert(0, seg.0);
                } else {
                    continue;
                }
                used[i] = true;
                attached = true;
                break;
            }
            if !attached {
                break;
            }
        }

        let closed = points.len() > 3 && points_close(points[0], *points.last().unwrap());
        if closed {
            points.pop();
        }
        if points.len() >= 2 {
            chains.push((points, closed));
        }
    }
    chains
}
