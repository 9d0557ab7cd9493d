//! Tolerance-bounded vertex reduction for raw contours.
//!
//! Ramer-Douglas-Peucker with a policy layer on top: endpoints of open
//! lines are preserved exactly (seam reconciliation matches on them),
//! closedness is preserved, and degenerate results are dropped rather than
//! reported as errors.

use hgt2osm_hgt::{TileBounds, TileEdge};

use crate::{Coord, RawContour, SimplifiedContour};

/// Simplify one raw fragment.
///
/// `tolerance` is the maximum perpendicular deviation from the original
/// path, in degrees. `merge_tolerance` is the seam-matching tolerance used
/// to record which tile edges the open endpoints lie on.
///
/// Returns `None` when the fragment degenerates: an open line with fewer
/// than 2 distinct points, or a ring with fewer than 3.
pub fn simplify(
    raw: &RawContour,
    tolerance: f64,
    bounds: &TileBounds,
    merge_tolerance: f64,
) -> Option<SimplifiedContour> {
    let coords = if raw.closed {
        simplify_ring(&raw.coords, tolerance)
    } else {
        rdp(&raw.coords, tolerance)
    };

    if raw.closed {
        if coords.len() < 3 {
            return None;
        }
    } else if !has_two_distinct(&coords) {
        return None;
    }

    let (start_edges, end_edges) = if raw.closed {
        (Vec::new(), Vec::new())
    } else {
        (
            edges_touching(coords[0], bounds, merge_tolerance),
            edges_touching(*coords.last().unwrap(), bounds, merge_tolerance),
        )
    };

    Some(SimplifiedContour {
        tile: raw.tile,
        elevation: raw.elevation,
        coords,
        closed: raw.closed,
        start_edges,
        end_edges,
    })
}

/// Simplify a ring (first coordinate not repeated) by pinning the first
/// coordinate, running RDP over the closed path, and unpinning again.
fn simplify_ring(coords: &[Coord], tolerance: f64) -> Vec<Coord> {
    if coords.len() < 4 {
        return coords.to_vec();
    }
    let mut path = coords.to_vec();
    path.push(coords[0]);
    let mut reduced = rdp(&path, tolerance);
    reduced.pop();
    reduced
}

/// Ramer-Douglas-Peucker reduction preserving the first and last point.
fn rdp(points: &[Coord], tolerance: f64) -> Vec<Coord> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let start = points[0];
    let end = points[points.len() - 1];
    let mut max_dist = 0.0;
    let mut max_idx = 0;
    for (i, &point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(point, start, end);
        if dist > max_dist {
            max_dist = dist;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp(&points[..=max_idx], tolerance);
        let right = rdp(&points[max_idx..], tolerance);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![start, end]
    }
}

/// Distance from `point` to the segment `start`-`end`.
fn perpendicular_distance(point: Coord, start: Coord, end: Coord) -> f64 {
    let dx = end.lon - start.lon;
    let dy = end.lat - start.lat;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-24 {
        return point.distance(&start);
    }

    let t = ((point.lon - start.lon) * dx + (point.lat - start.lat) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let proj = Coord::new(start.lon + t * dx, start.lat + t * dy);
    point.distance(&proj)
}

/// Tile edges the coordinate lies on, within the seam tolerance. A corner
/// endpoint touches two edges.
fn edges_touching(c: Coord, bounds: &TileBounds, tolerance: f64) -> Vec<TileEdge> {
    let mut edges = Vec::new();
    if (c.lat - bounds.max_lat).abs() <= tolerance {
        edges.push(TileEdge::North);
    }
    if (c.lat - bounds.min_lat).abs() <= tolerance {
        edges.push(TileEdge::South);
    }
    if (c.lon - bounds.max_lon).abs() <= tolerance {
        edges.push(TileEdge::East);
    }
    if (c.lon - bounds.min_lon).abs() <= tolerance {
        edges.push(TileEdge::West);
    }
    edges
}

fn has_two_distinct(coords: &[Coord]) -> bool {
    coords
        .iter()
        .any(|c| c.lon != coords[0].lon || c.lat != coords[0].lat)
}
