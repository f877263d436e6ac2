//! Concave outline for a set of shapes
//!
//! The shapes are connected along a minimum spanning tree of their pairwise
//! distances. Each tree edge becomes a rectangular bridge between the nearest
//! points of the two shapes, and shapes plus bridges are unioned into a single
//! polygon.

use crate::error::{GeometryError, Result};
use crate::polygon::{
    is_valid, nearest_points, polygon_from_ring, snap_to_grid, Polygon, AREA_EPSILON,
    CLIPPER_SCALE,
};
use crate::repair::{dilate, ensure_valid, repair_ring};
use geo::orient::{Direction, Orient};
use geo::{Area, Coord, EuclideanDistance, MultiPolygon};
use geo_clipper::Clipper;
use ordered_float::OrderedFloat;

/// Default bridge width in pixels
pub const DEFAULT_BRIDGE_WIDTH: f64 = 20.0;

/// Floor for MST edge weights so touching shapes still get a bridge
pub const MIN_BRIDGE_DISTANCE: f64 = 1e-5;

/// Join polygons into one concave outline.
///
/// A single input is returned unchanged. `bridge_width` controls how thick
/// the connecting bridges are (half-width is `max(bridge_width / 5, 1)`).
///
/// # Errors
///
/// - [`GeometryError::EmptyGeometry`] if `polygons` is empty
/// - [`GeometryError::UnionNotSingle`] if the union stays disconnected
/// - [`GeometryError::RepairExhausted`] if the snapped result cannot be repaired
pub fn join(polygons: &[Polygon], bridge_width: f64) -> Result<Polygon> {
    match polygons {
        [] => Err(GeometryError::EmptyGeometry("join needs at least one polygon")),
        [single] => Ok(single.clone()),
        _ => join_parts(
            polygons.iter().map(|p| p.as_geo().clone()).collect(),
            bridge_width,
        ),
    }
}

/// Join the parts of a multi-part shape into one polygon
///
/// # Errors
///
/// Same as [`join`].
pub fn join_multi(shape: &MultiPolygon<f64>, bridge_width: f64) -> Result<Polygon> {
    join_parts(shape.0.clone(), bridge_width)
}

pub(crate) fn join_parts(parts: Vec<geo::Polygon<f64>>, bridge_width: f64) -> Result<Polygon> {
    let half_width = (bridge_width / 5.0).max(1.0);
    let mut parts: Vec<geo::Polygon<f64>> = parts
        .into_iter()
        .filter_map(|p| {
            if p.unsigned_area() > AREA_EPSILON {
                Some(p.orient(Direction::Default))
            } else {
                // Zero-area shapes vanish in a union; give them body first
                dilate(&p, 1.0)
            }
        })
        .collect();

    if parts.len() < 2 {
        return parts.pop().map_or(
            Err(GeometryError::EmptyGeometry("join needs at least one polygon")),
            ensure_valid,
        );
    }

    let edges = minimum_spanning_tree(&parts);
    let bridges: Vec<geo::Polygon<f64>> = edges
        .iter()
        .map(|&(i, j)| {
            let (from, to, _) = nearest_points(&parts[i], &parts[j]);
            bridge(from, to, half_width)
        })
        .collect();
    log::debug!(
        "Joining {} shapes with {} bridges (half-width {half_width})",
        parts.len(),
        bridges.len()
    );

    let mut merged = MultiPolygon::new(vec![parts[0].clone()]);
    for piece in parts.iter().skip(1).chain(bridges.iter()) {
        merged = merged.union(piece, CLIPPER_SCALE);
    }

    let mut merged_parts: Vec<geo::Polygon<f64>> = merged
        .0
        .into_iter()
        .filter(|p| p.unsigned_area() > AREA_EPSILON)
        .collect();
    if merged_parts.len() != 1 {
        log::warn!(
            "Union of {} shapes left {} disjoint parts",
            parts.len(),
            merged_parts.len()
        );
        return Err(GeometryError::UnionNotSingle {
            parts: merged_parts.len(),
        });
    }
    let joined = merged_parts.swap_remove(0);
    snap_and_repair(&joined)
}

/// Round to the integer grid, repairing if rounding broke validity
pub(crate) fn snap_and_repair(poly: &geo::Polygon<f64>) -> Result<Polygon> {
    let snapped = snap_to_grid(poly);
    let candidate = polygon_from_ring(&snapped);
    if is_valid(&candidate) {
        Ok(Polygon::from_valid(candidate))
    } else {
        log::debug!("Snapping to grid invalidated polygon, repairing");
        repair_ring(snapped)
    }
}

/// Kruskal over all pairs, returns tree edges as index pairs
fn minimum_spanning_tree(parts: &[geo::Polygon<f64>]) -> Vec<(usize, usize)> {
    let n = parts.len();
    let mut edges: Vec<(OrderedFloat<f64>, usize, usize)> = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let distance = parts[i].euclidean_distance(&parts[j]);
            edges.push((OrderedFloat(distance.max(MIN_BRIDGE_DISTANCE)), i, j));
        }
    }
    edges.sort_unstable();

    let mut forest = UnionFind::new(n);
    let mut tree = Vec::with_capacity(n - 1);
    for (_, i, j) in edges {
        if forest.union(i, j) {
            tree.push((i, j));
            if tree.len() == n - 1 {
                break;
            }
        }
    }
    tree
}

/// Rectangle from `from` to `to`, extended by `half_width` past both ends
fn bridge(from: Coord<f64>, to: Coord<f64>, half_width: f64) -> geo::Polygon<f64> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = dx.hypot(dy);
    let (ux, uy) = if length > f64::EPSILON {
        (dx / length, dy / length)
    } else {
        (1.0, 0.0)
    };
    let (nx, ny) = (-uy * half_width, ux * half_width);
    let start = Coord {
        x: from.x - ux * half_width,
        y: from.y - uy * half_width,
    };
    let end = Coord {
        x: to.x + ux * half_width,
        y: to.y + uy * half_width,
    };
    polygon_from_ring(&[
        Coord { x: start.x + nx, y: start.y + ny },
        Coord { x: end.x + nx, y: end.y + ny },
        Coord { x: end.x - nx, y: end.y - ny },
        Coord { x: start.x - nx, y: start.y - ny },
    ])
    .orient(Direction::Default)
}

/// Disjoint-set forest with path compression and union by rank
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    /// Returns false if `x` and `y` were already connected
    fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
        true
    }
}
