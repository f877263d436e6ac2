//! Point, bounding box and validated polygon types
//!
//! [`Polygon`] can only be built by [`crate::repair`], [`crate::join`] or
//! [`crate::clip`], so every value is simple, hole-free, has positive area
//! and a counter-clockwise exterior. The ring predicates at the bottom of this
//! file are shared by those three operations.

use crate::error::Result;
use geo::orient::{Direction, Orient};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BoundingRect, Closest, ClosestPoint, Contains, Coord, Intersects, Line, LineString};
use serde::{Deserialize, Serialize};

/// Rings with an area at or below this value are degenerate
pub const AREA_EPSILON: f64 = 1e-6;

/// Scale applied to coordinates before integer clipping operations
pub(crate) const CLIPPER_SCALE: f64 = 1000.0;

/// Arc tolerance for round joins when dilating
pub(crate) const ARC_TOLERANCE: f64 = 0.25;

/// Relative tolerance for collinearity tests
const ORIENTATION_EPSILON: f64 = 1e-9;

/// A point in page pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (grows downward)
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[inline]
    #[must_use = "point is created but not used"]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are neither NaN nor infinite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Coord<f64> {
    #[inline]
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Coord<f64>> for Point {
    #[inline]
    fn from(c: Coord<f64>) -> Self {
        Self { x: c.x, y: c.y }
    }
}

/// Axis-aligned box (top-left origin) as reported by recognition engines
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left x-coordinate
    pub l: f64,
    /// Top y-coordinate
    pub t: f64,
    /// Right x-coordinate
    pub r: f64,
    /// Bottom y-coordinate
    pub b: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[inline]
    #[must_use = "bounding box is created but not used"]
    pub const fn new(l: f64, t: f64, r: f64, b: f64) -> Self {
        Self { l, t, r, b }
    }

    /// Box width (handles inverted coordinates)
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        (self.r - self.l).abs()
    }

    /// Box height (handles inverted coordinates)
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        (self.b - self.t).abs()
    }

    /// Smallest box covering both boxes
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            l: self.l.min(other.l),
            t: self.t.min(other.t),
            r: self.r.max(other.r),
            b: self.b.max(other.b),
        }
    }

    /// Corner ring starting at the top-left corner
    #[must_use]
    pub fn to_points(&self) -> Vec<Point> {
        vec![
            Point::new(self.l, self.t),
            Point::new(self.r, self.t),
            Point::new(self.r, self.b),
            Point::new(self.l, self.b),
        ]
    }

    /// Repaired polygon for this box (degenerate boxes are enlarged)
    pub fn to_polygon(&self) -> Result<Polygon> {
        crate::repair(&self.to_points())
    }
}

/// A simple polygon without holes, counter-clockwise, with positive area
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    inner: geo::Polygon<f64>,
}

impl Polygon {
    /// Wrap a polygon already checked by [`is_valid`], dropping interior rings
    /// and normalizing the winding
    pub(crate) fn from_valid(poly: geo::Polygon<f64>) -> Self {
        Self {
            inner: without_holes(poly).orient(Direction::Default),
        }
    }

    /// Vertices as an open ring (the closing vertex is not repeated)
    #[must_use]
    pub fn points(&self) -> Vec<Point> {
        open_ring(&self.inner).into_iter().map(Point::from).collect()
    }

    /// Vertices rounded to the integer pixel grid
    #[must_use]
    pub fn integer_points(&self) -> Vec<(i64, i64)> {
        open_ring(&self.inner)
            .into_iter()
            .map(|c| (c.x.round() as i64, c.y.round() as i64))
            .collect()
    }

    /// Every vertex already sits on the integer pixel grid
    #[must_use]
    pub fn is_on_integer_grid(&self) -> bool {
        self.points()
            .iter()
            .zip(self.integer_points())
            .all(|(p, (x, y))| p.x == x as f64 && p.y == y as f64)
    }

    /// Number of distinct vertices
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.inner.exterior().0.len().saturating_sub(1)
    }

    /// Enclosed area
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.inner.unsigned_area()
    }

    /// Axis-aligned envelope
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        self.inner.bounding_rect().map_or_else(BoundingBox::default, |rect| {
            BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
        })
    }

    /// `other` lies inside this polygon (boundary contact allowed)
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.inner.contains(&other.inner)
    }

    /// The two polygons share at least one point
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.inner.intersects(&other.inner)
    }

    /// Borrow the underlying `geo` polygon
    #[inline]
    #[must_use]
    pub const fn as_geo(&self) -> &geo::Polygon<f64> {
        &self.inner
    }

    /// Unwrap into the underlying `geo` polygon
    #[inline]
    #[must_use]
    pub fn into_geo(self) -> geo::Polygon<f64> {
        self.inner
    }
}

// ============================================================================
// Ring helpers
// ============================================================================

pub(crate) fn without_holes(poly: geo::Polygon<f64>) -> geo::Polygon<f64> {
    let (exterior, _) = poly.into_inner();
    geo::Polygon::new(exterior, vec![])
}

/// Exterior vertices without the closing duplicate
pub(crate) fn open_ring(poly: &geo::Polygon<f64>) -> Vec<Coord<f64>> {
    let mut coords = poly.exterior().0.clone();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}

/// Drop consecutive duplicate vertices, including a repeated closing vertex
pub(crate) fn dedupe_ring(coords: impl IntoIterator<Item = Coord<f64>>) -> Vec<Coord<f64>> {
    let mut ring: Vec<Coord<f64>> = Vec::new();
    for c in coords {
        if ring.last() != Some(&c) {
            ring.push(c);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

pub(crate) fn polygon_from_ring(ring: &[Coord<f64>]) -> geo::Polygon<f64> {
    geo::Polygon::new(LineString::from(ring.to_vec()), vec![])
}

/// Simple, hole-free, at least three vertices, area above [`AREA_EPSILON`]
pub(crate) fn is_valid(poly: &geo::Polygon<f64>) -> bool {
    if !poly.interiors().is_empty() {
        return false;
    }
    let ring = open_ring(poly);
    if ring.len() < 3 || ring.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return false;
    }
    poly.unsigned_area() > AREA_EPSILON && is_simple_ring(&ring)
}

/// No two edges cross or touch except consecutive edges at their shared vertex
pub(crate) fn is_simple_ring(ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        if a1 == a2 {
            return false;
        }
        for j in (i + 1)..n {
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            let overlaps = if j == i + 1 {
                // a2 == b1: a spike folds one edge back onto the other
                lies_on_segment(a1, a2, b2) || lies_on_segment(b1, b2, a1)
            } else if i == 0 && j == n - 1 {
                // b2 == a1
                lies_on_segment(a1, a2, b1) || lies_on_segment(b1, b2, a2)
            } else {
                segments_intersect(a1, a2, b1, b2)
            };
            if overlaps {
                return false;
            }
        }
    }
    true
}

#[inline]
fn cross(o: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - o.x).mul_add(b.y - o.y, -(a.y - o.y) * (b.x - o.x))
}

#[inline]
pub(crate) fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Turn direction of `o -> a -> b`: 1 left, -1 right, 0 collinear
fn turn(o: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> i8 {
    let value = cross(o, a, b);
    let scale = distance(o, a) * distance(o, b);
    if value.abs() <= ORIENTATION_EPSILON * scale {
        0
    } else if value > 0.0 {
        1
    } else {
        -1
    }
}

/// `p` lies within the envelope of segment `a`-`b`
fn within_envelope(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn lies_on_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    turn(a, b, p) == 0 && within_envelope(a, b, p)
}

pub(crate) fn segments_intersect(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
) -> bool {
    let d1 = turn(b1, b2, a1);
    let d2 = turn(b1, b2, a2);
    let d3 = turn(a1, a2, b1);
    let d4 = turn(a1, a2, b2);
    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }
    (d1 == 0 && within_envelope(b1, b2, a1))
        || (d2 == 0 && within_envelope(b1, b2, a2))
        || (d3 == 0 && within_envelope(a1, a2, b1))
        || (d4 == 0 && within_envelope(a1, a2, b2))
}

pub(crate) fn closest_point_on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    match Line::new(a, b).closest_point(&geo::Point::from(p)) {
        Closest::Intersection(q) | Closest::SinglePoint(q) => q.0,
        Closest::Indeterminate => a,
    }
}

/// Shared point of two intersecting segments (the start of a collinear overlap)
fn crossing_point(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
) -> Option<Coord<f64>> {
    match line_intersection(Line::new(a1, a2), Line::new(b1, b2))? {
        LineIntersection::SinglePoint { intersection, .. } => Some(intersection),
        LineIntersection::Collinear { intersection } => Some(intersection.start),
    }
}

/// Closest pair of points between two segments
fn closest_points_between_segments(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
) -> (Coord<f64>, Coord<f64>) {
    if segments_intersect(a1, a2, b1, b2) {
        if let Some(p) = crossing_point(a1, a2, b1, b2) {
            return (p, p);
        }
    }
    let candidates = [
        (a1, closest_point_on_segment(a1, b1, b2)),
        (a2, closest_point_on_segment(a2, b1, b2)),
        (closest_point_on_segment(b1, a1, a2), b1),
        (closest_point_on_segment(b2, a1, a2), b2),
    ];
    candidates
        .into_iter()
        .min_by(|x, y| distance(x.0, x.1).total_cmp(&distance(y.0, y.1)))
        .unwrap_or((a1, b1))
}

/// Nearest points between two exteriors and their distance
pub(crate) fn nearest_points(
    a: &geo::Polygon<f64>,
    b: &geo::Polygon<f64>,
) -> (Coord<f64>, Coord<f64>, f64) {
    let ring_a = open_ring(a);
    let ring_b = open_ring(b);
    let (Some(&first_a), Some(&first_b)) = (ring_a.first(), ring_b.first()) else {
        return (Coord::zero(), Coord::zero(), f64::INFINITY);
    };
    let mut best = (first_a, first_b, distance(first_a, first_b));
    for i in 0..ring_a.len() {
        let (a1, a2) = (ring_a[i], ring_a[(i + 1) % ring_a.len()]);
        for j in 0..ring_b.len() {
            let (b1, b2) = (ring_b[j], ring_b[(j + 1) % ring_b.len()]);
            let (p, q) = closest_points_between_segments(a1, a2, b1, b2);
            let d = distance(p, q);
            if d < best.2 {
                best = (p, q, d);
            }
        }
    }
    best
}

/// Smallest distance a vertex could move before the ring becomes invalid
pub(crate) fn minimum_clearance(ring: &[Coord<f64>]) -> f64 {
    let n = ring.len();
    let mut clearance = f64::INFINITY;
    for i in 0..n {
        clearance = clearance.min(distance(ring[i], ring[(i + 1) % n]));
        for j in 0..n {
            let next = (j + 1) % n;
            if j == i || next == i {
                continue;
            }
            let nearest = closest_point_on_segment(ring[i], ring[j], ring[next]);
            clearance = clearance.min(distance(ring[i], nearest));
        }
    }
    clearance
}

/// Exterior rounded to the integer grid, duplicates removed
pub(crate) fn snap_to_grid(poly: &geo::Polygon<f64>) -> Vec<Coord<f64>> {
    dedupe_ring(open_ring(poly).into_iter().map(|c| Coord {
        x: c.x.round(),
        y: c.y.round(),
    }))
}
