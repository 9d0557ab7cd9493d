//! Merging contour fragments across tile seams.
//!
//! Fragments arriving here are already simplified and carry boundary-touch
//! records for their open endpoints. For one elevation level across all
//! tiles of a run, [`stitch_level`] joins fragments whose endpoints meet
//! across a shared tile edge into single continuous features.
//!
//! Determinism: fragments must be passed in tile scan order with extraction
//! order within a tile. Candidate endpoint pairs are merged nearest-first;
//! equal distances fall back to fragment order, so the result is reproducible
//! across runs. Candidate lookup is indexed by `(tile, edge)`, keeping the
//! work near-linear in the fragment count per level.

use std::collections::{HashMap, HashSet};

use hgt2osm_contour::{Coord, SimplifiedContour};
use hgt2osm_hgt::{TileEdge, TileKey};
use tracing::debug;

use crate::{Result, StitchError};

/// A contour assembled from one or more fragments across tile boundaries.
#[derive(Debug, Clone)]
pub struct StitchedFeature {
    /// Elevation in meters.
    pub elevation: i32,
    /// Ordered coordinates; closed rings do not repeat the first point.
    pub coords: Vec<Coord>,
    /// Final closed/open classification.
    pub closed: bool,
}

/// One end of an open fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum End {
    Start,
    End,
}

/// Endpoint handle: fragment index within the level, plus which end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Endpoint {
    frag: usize,
    end: End,
}

impl Endpoint {
    fn opposite(self) -> Endpoint {
        Endpoint {
            frag: self.frag,
            end: match self.end {
                End::Start => End::End,
                End::End => End::Start,
            },
        }
    }
}

/// Stitch all fragments of one elevation level.
///
/// Closed fragments pass through unchanged. Open fragments are merged
/// exhaustively: the output contains no two features whose endpoints should
/// have been joined, and re-stitching the output is a no-op. Fragments whose
/// boundary touches have no matching neighbor (edge of the processed region,
/// missing tile) come out as-is once their candidate merges are exhausted.
///
/// Fails with [`StitchError::Inconsistency`] when three or more endpoints
/// coincide within the merge tolerance at one point; the caller may then
/// fall back to emitting this level's fragments unstitched.
pub fn stitch_level(
    fragments: &[SimplifiedContour],
    merge_tolerance: f64,
) -> Result<Vec<StitchedFeature>> {
    debug_assert!(fragments
        .windows(2)
        .all(|w| w[0].elevation == w[1].elevation));

    let endpoints = boundary_endpoints(fragments);
    let candidates = candidate_pairs(fragments, &endpoints, merge_tolerance);
    check_coincidence(fragments, &endpoints, &candidates, merge_tolerance)?;

    let (links, closed_roots, mut dsu) = merge_candidates(fragments, candidates);

    debug!(
        fragments = fragments.len(),
        merges = links.len() / 2,
        "stitched level"
    );

    // Emit each chain once, when the scan reaches its lowest fragment.
    // This keeps output order stable: chains appear in the order of their
    // first fragment, which follows tile scan order and extraction order.
    let roots: Vec<usize> = (0..fragments.len()).map(|i| dsu.find(i)).collect();
    let mut features = Vec::new();
    let mut emitted = vec![false; fragments.len()];
    for idx in 0..fragments.len() {
        if emitted[idx] {
            continue;
        }
        let frag = &fragments[idx];
        if frag.closed {
            emitted[idx] = true;
            features.push(StitchedFeature {
                elevation: frag.elevation,
                coords: frag.coords.clone(),
                closed: true,
            });
            continue;
        }
        let root = roots[idx];
        let members: Vec<usize> = (idx..fragments.len())
            .filter(|&i| !fragments[i].closed && roots[i] == root)
            .collect();
        for &m in &members {
            emitted[m] = true;
        }
        let closed = closed_roots.contains(&root);
        features.push(rebuild_chain(
            fragments,
            &links,
            &members,
            closed,
            merge_tolerance,
        ));
    }
    Ok(features)
}

/// Endpoints of open fragments that lie on at least one tile edge.
fn boundary_endpoints(fragments: &[SimplifiedContour]) -> Vec<(Endpoint, Coord, Vec<TileEdge>)> {
    let mut out = Vec::new();
    for (idx, frag) in fragments.iter().enumerate() {
        if frag.closed {
            continue;
        }
        if !frag.start_edges.is_empty() {
            out.push((
                Endpoint {
                    frag: idx,
                    end: End::Start,
                },
                frag.start(),
                frag.start_edges.clone(),
            ));
        }
        if !frag.end_edges.is_empty() {
            out.push((
                Endpoint {
                    frag: idx,
                    end: End::End,
                },
                frag.end(),
                frag.end_edges.clone(),
            ));
        }
    }
    out
}

/// Reject levels where three or more mergeable endpoints coincide at one
/// point.
///
/// Only endpoints that participate in at least one candidate pair are
/// considered: coincident endpoints with nothing to merge (outer boundary
/// of the processed region, missing neighbor tile) are harmless and pass
/// through. Coincidence is detected at merge-tolerance resolution by
/// bucketing on a grid of that pitch; triples straddling a bucket boundary
/// can slip past, which at worst leaves one seam joined arbitrarily.
fn check_coincidence(
    fragments: &[SimplifiedContour],
    endpoints: &[(Endpoint, Coord, Vec<TileEdge>)],
    candidates: &[(f64, Endpoint, Endpoint)],
    merge_tolerance: f64,
) -> Result<()> {
    if merge_tolerance <= 0.0 || candidates.is_empty() {
        return Ok(());
    }
    let mut mergeable: HashSet<Endpoint> = HashSet::new();
    for (_, a, b) in candidates {
        mergeable.insert(*a);
        mergeable.insert(*b);
    }
    let mut buckets: HashMap<(i64, i64), Vec<Coord>> = HashMap::new();
    for (ep, coord, _) in endpoints {
        if !mergeable.contains(ep) {
            continue;
        }
        let key = (
            (coord.lon / merge_tolerance).round() as i64,
            (coord.lat / merge_tolerance).round() as i64,
        );
        buckets.entry(key).or_default().push(*coord);
    }
    for coords in buckets.values() {
        if coords.len() > 2 {
            let c = coords[0];
            return Err(StitchError::Inconsistency {
                elevation: fragments[0].elevation,
                lon: c.lon,
                lat: c.lat,
                count: coords.len(),
            });
        }
    }
    Ok(())
}

/// All endpoint pairs on geometrically matching edges of adjacent tiles,
/// within the merge tolerance.
///
/// The index is keyed by `(tile, edge)`; for each endpoint only the
/// matching edge of the relevant neighbor is probed, never the whole
/// dataset. Each pair is generated once, from its lower-keyed tile.
fn candidate_pairs(
    fragments: &[SimplifiedContour],
    endpoints: &[(Endpoint, Coord, Vec<TileEdge>)],
    merge_tolerance: f64,
) -> Vec<(f64, Endpoint, Endpoint)> {
    let mut index: HashMap<(TileKey, TileEdge), Vec<(Endpoint, Coord)>> = HashMap::new();
    for (ep, coord, edges) in endpoints {
        for &edge in edges {
            index
                .entry((fragments[ep.frag].tile, edge))
                .or_default()
                .push((*ep, *coord));
        }
    }

    let mut pairs = Vec::new();
    for (ep, coord, edges) in endpoints {
        let tile = fragments[ep.frag].tile;
        for &edge in edges {
            let neighbor = tile.neighbor(edge);
            if neighbor <= tile {
                // The neighbor generates this pair from its side.
                continue;
            }
            let Some(others) = index.get(&(neighbor, edge.opposite())) else {
                continue;
            };
            for (other, other_coord) in others {
                let dist = coord.distance(other_coord);
                if dist <= merge_tolerance {
                    pairs.push((dist, *ep, *other));
                }
            }
        }
    }
    // Nearest first; fragment order breaks exact ties deterministically.
    pairs.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });
    pairs
}

/// Greedily apply candidate merges nearest-first.
///
/// Each endpoint joins at most once. A candidate whose two endpoints are
/// already in the same chain closes that chain into a loop; the loop then
/// stops participating in further merges (its endpoints are all consumed).
fn merge_candidates(
    fragments: &[SimplifiedContour],
    candidates: Vec<(f64, Endpoint, Endpoint)>,
) -> (HashMap<Endpoint, Endpoint>, Vec<usize>, Dsu) {
    let mut dsu = Dsu::new(fragments.len());
    let mut links: HashMap<Endpoint, Endpoint> = HashMap::new();
    let mut closed_roots = Vec::new();

    for (_, a, b) in candidates {
        if links.contains_key(&a) || links.contains_key(&b) {
            continue;
        }
        if dsu.find(a.frag) == dsu.find(b.frag) {
            links.insert(a, b);
            links.insert(b, a);
            closed_roots.push(dsu.find(a.frag));
            continue;
        }
        dsu.union(a.frag, b.frag);
        links.insert(a, b);
        links.insert(b, a);
    }
    let closed_roots = closed_roots.iter().map(|&r| dsu.find(r)).collect();
    (links, closed_roots, dsu)
}

/// Reassemble one chain into an ordered coordinate sequence.
///
/// Open chains start from their free endpoint with the lowest fragment
/// order; closed chains start from their lowest fragment in its original
/// orientation. The joined endpoint of each subsequent fragment duplicates
/// the current tail within tolerance and is dropped.
fn rebuild_chain(
    fragments: &[SimplifiedContour],
    links: &HashMap<Endpoint, Endpoint>,
    members: &[usize],
    closed: bool,
    merge_tolerance: f64,
) -> StitchedFeature {
    let elevation = fragments[members[0]].elevation;

    let entry = if closed {
        Endpoint {
            frag: members[0],
            end: End::Start,
        }
    } else {
        members
            .iter()
            .flat_map(|&frag| {
                [
                    Endpoint {
                        frag,
                        end: End::Start,
                    },
                    Endpoint {
                        frag,
                        end: End::End,
                    },
                ]
            })
            .find(|ep| !links.contains_key(ep))
            .expect("open chain has a free endpoint")
    };

    let mut coords: Vec<Coord> = Vec::new();
    let mut visited = vec![false; fragments.len()];
    let mut cursor = entry;
    loop {
        let frag = &fragments[cursor.frag];
        visited[cursor.frag] = true;
        let oriented: Vec<Coord> = match cursor.end {
            End::Start => frag.coords.clone(),
            End::End => frag.coords.iter().rev().copied().collect(),
        };
        let mut iter = oriented.into_iter();
        if let Some(first) = iter.next() {
            let duplicate = coords
                .last()
                .map(|tail| tail.distance(&first) <= merge_tolerance)
                .unwrap_or(false);
            if !duplicate {
                coords.push(first);
            }
            coords.extend(iter);
        }

        let exit = cursor.opposite();
        match links.get(&exit) {
            Some(next) if !visited[next.frag] => cursor = *next,
            _ => break,
        }
    }

    if closed {
        // The closing seam duplicates the ring start.
        if coords.len() > 1
            && coords
                .last()
                .map(|c| c.distance(&coords[0]) <= merge_tolerance)
                .unwrap_or(false)
        {
            coords.pop();
        }
    }

    StitchedFeature {
        elevation,
        coords,
        closed,
    }
}

/// Minimal union-find over fragment indices.
struct Dsu {
    parent: Vec<usize>,
}

impl Dsu {
    fn new(n: usize) -> Self {
        Dsu {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower root wins, keeping representatives stable in scan order.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-4;

    fn fragment(
        tile: TileKey,
        coords: Vec<(f64, f64)>,
        start_edges: Vec<TileEdge>,
        end_edges: Vec<TileEdge>,
    ) -> SimplifiedContour {
        SimplifiedContour {
            tile,
            elevation: 200,
            coords: coords.into_iter().map(|(lon, lat)| Coord::new(lon, lat)).collect(),
            closed: false,
            start_edges,
            end_edges,
        }
    }

    fn ring(tile: TileKey, coords: Vec<(f64, f64)>) -> SimplifiedContour {
        SimplifiedContour {
            tile,
            elevation: 200,
            coords: coords.into_iter().map(|(lon, lat)| Coord::new(lon, lat)).collect(),
            closed: true,
            start_edges: Vec::new(),
            end_edges: Vec::new(),
        }
    }

    #[test]
    fn straight_line_stitches_across_the_seam() {
        let west = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.5), (1.0, 0.5)],
            vec![],
            vec![TileEdge::East],
        );
        let east = fragment(
            TileKey::new(0, 1),
            vec![(1.0, 0.5), (1.8, 0.5)],
            vec![TileEdge::West],
            vec![],
        );

        let features = stitch_level(&[west, east], TOL).unwrap();
        assert_eq!(features.len(), 1);
        let feature = &features[0];
        assert!(!feature.closed);
        assert_eq!(feature.elevation, 200);
        // No duplicate point at the seam.
        assert_eq!(feature.coords.len(), 3);
        assert_eq!(feature.coords[0], Coord::new(0.2, 0.5));
        assert_eq!(feature.coords[2], Coord::new(1.8, 0.5));
    }

    #[test]
    fn chain_closing_on_itself_becomes_a_ring() {
        // A ring straddling the seam between tiles (0,0) and (0,1).
        let west = fragment(
            TileKey::new(0, 0),
            vec![(1.0, 0.3), (0.5, 0.3), (0.5, 0.7), (1.0, 0.7)],
            vec![TileEdge::East],
            vec![TileEdge::East],
        );
        let east = fragment(
            TileKey::new(0, 1),
            vec![(1.0, 0.7), (1.5, 0.7), (1.5, 0.3), (1.0, 0.3)],
            vec![TileEdge::West],
            vec![TileEdge::West],
        );

        let features = stitch_level(&[west, east], TOL).unwrap();
        assert_eq!(features.len(), 1);
        let feature = &features[0];
        assert!(feature.closed);
        // 4 + 4 points, minus one seam duplicate and the closing duplicate.
        assert_eq!(feature.coords.len(), 6);
    }

    #[test]
    fn seam_match_within_tolerance_still_joins() {
        let west = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.5), (1.0, 0.50003)],
            vec![],
            vec![TileEdge::East],
        );
        let east = fragment(
            TileKey::new(0, 1),
            vec![(1.0, 0.5), (1.8, 0.5)],
            vec![TileEdge::West],
            vec![],
        );
        let features = stitch_level(&[west, east], TOL).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].coords.len(), 3);
    }

    #[test]
    fn unmatched_boundary_touch_passes_through() {
        // Touches the east edge but the neighbor tile is absent.
        let lone = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.5), (1.0, 0.5)],
            vec![],
            vec![TileEdge::East],
        );
        let features = stitch_level(&[lone.clone()], TOL).unwrap();
        assert_eq!(features.len(), 1);
        assert!(!features[0].closed);
        assert_eq!(features[0].coords.len(), lone.coords.len());
    }

    #[test]
    fn interior_fragments_do_not_merge() {
        let a = fragment(TileKey::new(0, 0), vec![(0.2, 0.2), (0.4, 0.4)], vec![], vec![]);
        let b = fragment(TileKey::new(0, 0), vec![(0.4, 0.4), (0.6, 0.6)], vec![], vec![]);
        // Shared interior point, but neither endpoint is on a tile edge.
        let features = stitch_level(&[a, b], TOL).unwrap();
        assert_eq!(features.len(), 2);
    }

    #[test]
    fn closed_fragments_pass_through() {
        let r = ring(
            TileKey::new(0, 0),
            vec![(0.4, 0.4), (0.6, 0.4), (0.6, 0.6), (0.4, 0.6)],
        );
        let features = stitch_level(&[r], TOL).unwrap();
        assert_eq!(features.len(), 1);
        assert!(features[0].closed);
        assert_eq!(features[0].coords.len(), 4);
    }

    #[test]
    fn nearest_candidate_merges_first() {
        // Two east-edge endpoints in the west tile; the closer one must win
        // the single west-edge endpoint of the east tile.
        let far = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.6), (1.0, 0.50008)],
            vec![],
            vec![TileEdge::East],
        );
        let near = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.4), (1.0, 0.50001)],
            vec![],
            vec![TileEdge::East],
        );
        let east = fragment(
            TileKey::new(0, 1),
            vec![(1.0, 0.5), (1.8, 0.5)],
            vec![TileEdge::West],
            vec![],
        );

        let features = stitch_level(&[far, near, east], TOL).unwrap();
        assert_eq!(features.len(), 2);
        // The merged feature starts at the near fragment's free end.
        let merged = features
            .iter()
            .find(|f| f.coords.len() == 3)
            .expect("one merged feature");
        assert!(merged.coords.iter().any(|c| *c == Coord::new(0.2, 0.4)));
        assert!(merged.coords.iter().any(|c| *c == Coord::new(1.8, 0.5)));
    }

    #[test]
    fn three_coincident_endpoints_are_an_inconsistency() {
        let a = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.5), (1.0, 0.5)],
            vec![],
            vec![TileEdge::East],
        );
        let b = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.7), (1.0, 0.5)],
            vec![],
            vec![TileEdge::East],
        );
        let c = fragment(
            TileKey::new(0, 1),
            vec![(1.0, 0.5), (1.8, 0.5)],
            vec![TileEdge::West],
            vec![],
        );
        let err = stitch_level(&[a, b, c], TOL).unwrap_err();
        assert!(matches!(
            err,
            StitchError::Inconsistency {
                elevation: 200,
                count: 3,
                ..
            }
        ));
    }

    #[test]
    fn coincident_endpoints_on_the_region_boundary_pass_through() {
        // Three endpoints meet at the east edge, but no east tile exists,
        // so nothing is mergeable and nothing is inconsistent.
        let a = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.3), (1.0, 0.5)],
            vec![],
            vec![TileEdge::East],
        );
        let b = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.5), (1.0, 0.5)],
            vec![],
            vec![TileEdge::East],
        );
        let c = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.7), (1.0, 0.5)],
            vec![],
            vec![TileEdge::East],
        );
        let features = stitch_level(&[a, b, c], TOL).unwrap();
        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| !f.closed));
    }

    #[test]
    fn stitching_is_idempotent() {
        let west = fragment(
            TileKey::new(0, 0),
            vec![(0.2, 0.5), (1.0, 0.5)],
            vec![],
            vec![TileEdge::East],
        );
        let east = fragment(
            TileKey::new(0, 1),
            vec![(1.0, 0.5), (1.8, 0.5)],
            vec![TileEdge::West],
            vec![],
        );
        let features = stitch_level(&[west, east], TOL).unwrap();

        // Feed the stitched output back as a single fragment; nothing new
        // may merge and the geometry must survive unchanged.
        let refed = fragment(
            TileKey::new(0, 0),
            features[0].coords.iter().map(|c| (c.lon, c.lat)).collect(),
            vec![],
            vec![],
        );
        let again = stitch_level(&[refed], TOL).unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].coords.len(), features[0].coords.len());
    }

    #[test]
    fn output_order_is_stable() {
        let a = fragment(TileKey::new(0, 0), vec![(0.1, 0.1), (0.2, 0.2)], vec![], vec![]);
        let b = fragment(TileKey::new(0, 1), vec![(1.1, 0.1), (1.2, 0.2)], vec![], vec![]);
        let c = fragment(TileKey::new(1, 0), vec![(0.1, 1.1), (0.2, 1.2)], vec![], vec![]);
        let features = stitch_level(&[a, b, c], TOL).unwrap();
        let starts: Vec<Coord> = features.iter().map(|f| f.coords[0]).collect();
        assert_eq!(
            starts,
            vec![
                Coord::new(0.1, 0.1),
                Coord::new(1.1, 0.1),
                Coord::new(0.1, 1.1),
            ]
        );
    }
}
