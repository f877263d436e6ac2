//! Polygon repair
//!
//! Recognition engines report outlines that self-intersect, fold back on
//! themselves or collapse to lines. [`repair`] tries increasingly destructive
//! strategies until one yields a valid polygon:
//!
//! 1. Rotate the start vertex (optionally simplifying each rotation)
//! 2. Simplify with growing tolerance
//! 3. Dilate with growing radius

use crate::error::{GeometryError, Result};
use crate::polygon::{
    dedupe_ring, is_valid, open_ring, polygon_from_ring, without_holes, Point, Polygon,
    ARC_TOLERANCE, AREA_EPSILON, CLIPPER_SCALE,
};
use geo::{Area, BoundingRect, Coord, Rect, Simplify};
use geo_clipper::{Clipper, EndType, JoinType};

/// Repair an arbitrary point sequence into a valid simple polygon.
///
/// Valid input is returned with its vertices unchanged (up to winding).
///
/// # Errors
///
/// - [`GeometryError::EmptyGeometry`] if `points` is empty
/// - [`GeometryError::NonFiniteCoordinate`] if any coordinate is NaN or infinite
/// - [`GeometryError::RepairExhausted`] if no strategy succeeds
pub fn repair(points: &[Point]) -> Result<Polygon> {
    if points.is_empty() {
        return Err(GeometryError::EmptyGeometry("polygon has no vertices"));
    }
    if !points.iter().all(Point::is_finite) {
        return Err(GeometryError::NonFiniteCoordinate {
            vertices: points.len(),
        });
    }
    repair_ring(dedupe_ring(points.iter().map(|&p| Coord::from(p))))
}

/// Repair a deduplicated ring of finite coordinates
pub(crate) fn repair_ring(ring: Vec<Coord<f64>>) -> Result<Polygon> {
    let original = polygon_from_ring(&ring);
    if is_valid(&original) {
        return Ok(Polygon::from_valid(original));
    }

    let area = original.unsigned_area();
    if ring.len() >= 3 && area > AREA_EPSILON {
        if let Some(rotated) = try_rotations(&ring, area) {
            log::debug!("Repaired polygon with {} vertices by rotation", ring.len());
            return Ok(Polygon::from_valid(rotated));
        }
        if let Some(simplified) = try_simplification(&original, area) {
            log::debug!(
                "Repaired polygon with {} vertices by simplification",
                ring.len()
            );
            return Ok(Polygon::from_valid(simplified));
        }
    }

    if let Some(dilated) = try_dilation(&original, area) {
        log::debug!("Repaired polygon with {} vertices by dilation", ring.len());
        return Ok(Polygon::from_valid(dilated));
    }

    if let Some(rect) = original.bounding_rect() {
        log::warn!(
            "Dilation failed for polygon with {} vertices (area {area:.3}), using its envelope",
            ring.len()
        );
        return Ok(Polygon::from_valid(grown_envelope(&rect, 1.0)));
    }
    Err(GeometryError::RepairExhausted {
        vertices: ring.len(),
        area,
    })
}

/// Make a clipper result valid without altering it when it already is
pub(crate) fn ensure_valid(poly: geo::Polygon<f64>) -> Result<Polygon> {
    let poly = without_holes(poly);
    if is_valid(&poly) {
        Ok(Polygon::from_valid(poly))
    } else {
        repair_ring(dedupe_ring(open_ring(&poly)))
    }
}

fn try_rotations(ring: &[Coord<f64>], area: f64) -> Option<geo::Polygon<f64>> {
    (0..ring.len()).find_map(|split| {
        let mut rotated = ring.to_vec();
        rotated.rotate_left(split);
        let candidate = polygon_from_ring(&rotated);
        if split > 0 && is_valid(&candidate) {
            return Some(candidate);
        }
        let simplified = Simplify::simplify(&candidate, &area);
        is_valid(&simplified).then_some(simplified)
    })
}

fn try_simplification(original: &geo::Polygon<f64>, area: f64) -> Option<geo::Polygon<f64>> {
    let diagonal = original
        .bounding_rect()
        .map_or(0.0, |rect| rect.width().hypot(rect.height()));
    let max_tolerance = area.ceil().min(diagonal.ceil()).max(1.0) as usize;

    let mut candidate = original.clone();
    for tolerance in 1..=max_tolerance {
        candidate = Simplify::simplify(&candidate, &(tolerance as f64));
        if is_valid(&candidate) {
            return Some(candidate);
        }
        if open_ring(&candidate).len() < 3 {
            break;
        }
    }
    None
}

/// Radii run up to the larger of area and envelope diagonal, so lobes of a
/// self-overlapping ring grow into each other
fn try_dilation(original: &geo::Polygon<f64>, area: f64) -> Option<geo::Polygon<f64>> {
    let diagonal = original
        .bounding_rect()
        .map_or(0.0, |rect| rect.width().hypot(rect.height()));
    let max_radius = area.max(diagonal).ceil() as usize + 1;
    (1..=max_radius).find_map(|radius| dilate(original, radius as f64))
}

/// Grow a polygon outward by `radius`; degenerate input grows its envelope
pub(crate) fn dilate(poly: &geo::Polygon<f64>, radius: f64) -> Option<geo::Polygon<f64>> {
    if poly.unsigned_area() <= AREA_EPSILON || open_ring(poly).len() < 3 {
        return poly
            .bounding_rect()
            .map(|rect| grown_envelope(&rect, radius));
    }
    let grown = poly.offset(
        radius,
        JoinType::Round(ARC_TOLERANCE),
        EndType::ClosedPolygon,
        CLIPPER_SCALE,
    );
    let mut parts = grown.0;
    if parts.len() != 1 {
        return None;
    }
    let candidate = without_holes(parts.pop()?);
    is_valid(&candidate).then_some(candidate)
}

fn grown_envelope(rect: &Rect<f64>, radius: f64) -> geo::Polygon<f64> {
    let (min, max) = (rect.min(), rect.max());
    polygon_from_ring(&[
        Coord { x: min.x - radius, y: min.y - radius },
        Coord { x: max.x + radius, y: min.y - radius },
        Coord { x: max.x + radius, y: max.y + radius },
        Coord { x: min.x - radius, y: max.y + radius },
    ])
}
