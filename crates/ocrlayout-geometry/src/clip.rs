//! Clip a child polygon to its parent
//!
//! Both inputs are repaired first. A child already inside its parent, up to
//! the overhang a previous clip can leave behind, is returned untouched, so
//! clipping a clipped polygon again is a no-op. An intersection that splits
//! into several parts is re-joined with [`crate::join`]'s bridging.

use crate::error::Result;
use crate::join::{join_parts, DEFAULT_BRIDGE_WIDTH};
use crate::polygon::{
    is_valid, minimum_clearance, open_ring, polygon_from_ring, snap_to_grid, Point, Polygon,
    AREA_EPSILON, CLIPPER_SCALE,
};
use crate::repair::{ensure_valid, repair, repair_ring};
use geo::{Area, EuclideanDistance};
use geo_clipper::Clipper;

/// Vertices closer than this trigger a snap to the integer grid
const MIN_CLEARANCE: f64 = 1.0;

/// Overhang allowed for a child on the integer grid (half a pixel diagonal)
const GRID_OVERHANG: f64 = 0.75;

/// Overhang allowed for other children, covering clipper quantization
const QUANTIZED_OVERHANG: f64 = 0.01;

/// Clip `child` to `parent` using [`DEFAULT_BRIDGE_WIDTH`].
///
/// Returns `Ok(None)` when the two do not overlap with positive area.
///
/// # Errors
///
/// Propagates repair failures of either input.
pub fn clip(child: &[Point], parent: &[Point]) -> Result<Option<Polygon>> {
    clip_with_bridge(child, parent, DEFAULT_BRIDGE_WIDTH)
}

/// Clip `child` to `parent`, re-joining split parts with `bridge_width`
///
/// # Errors
///
/// Propagates repair failures of either input and join failures.
pub fn clip_with_bridge(
    child: &[Point],
    parent: &[Point],
    bridge_width: f64,
) -> Result<Option<Polygon>> {
    let child = repair(child)?;
    let parent = repair(parent)?;
    clip_polygon(&child, &parent, bridge_width)
}

/// Clip an already valid polygon to another
///
/// # Errors
///
/// Propagates join and re-repair failures.
pub fn clip_polygon(child: &Polygon, parent: &Polygon, bridge_width: f64) -> Result<Option<Polygon>> {
    if parent.contains(child) || overhangs_slightly(child, parent) {
        return Ok(Some(child.clone()));
    }

    let overlap = child.as_geo().intersection(parent.as_geo(), CLIPPER_SCALE);
    let mut parts: Vec<geo::Polygon<f64>> = overlap
        .0
        .into_iter()
        .filter(|p| p.unsigned_area() > AREA_EPSILON)
        .collect();

    let clipped = match parts.len() {
        0 => {
            log::debug!("Child polygon does not overlap its parent");
            return Ok(None);
        }
        1 => ensure_valid(parts.swap_remove(0))?,
        n => {
            log::debug!("Clipping split child into {n} parts, re-joining");
            join_parts(parts, bridge_width)?
        }
    };

    if minimum_clearance(&open_ring(clipped.as_geo())) < MIN_CLEARANCE {
        return Ok(Some(snap_within(clipped, parent)));
    }
    Ok(Some(clipped))
}

/// `child` overlaps `parent` and every part of it outside `parent` stays
/// within the allowed overhang of the parent outline
fn overhangs_slightly(child: &Polygon, parent: &Polygon) -> bool {
    let allowed = if child.is_on_integer_grid() {
        GRID_OVERHANG
    } else {
        QUANTIZED_OVERHANG
    };
    let outside = child.as_geo().difference(parent.as_geo(), CLIPPER_SCALE);
    if child.area() - outside.unsigned_area() <= AREA_EPSILON {
        return false;
    }
    outside
        .0
        .iter()
        .flat_map(|part| part.exterior().points())
        .all(|vertex| vertex.euclidean_distance(parent.as_geo()) <= allowed)
}

/// Snap a crowded clip result to the integer grid, re-repairing if needed.
///
/// The snapped outline is only used if it still fits its parent; otherwise
/// the unsnapped result is kept.
fn snap_within(clipped: Polygon, parent: &Polygon) -> Polygon {
    let snapped = snap_to_grid(clipped.as_geo());
    let candidate = polygon_from_ring(&snapped);
    let snapped = if is_valid(&candidate) {
        Ok(Polygon::from_valid(candidate))
    } else {
        repair_ring(snapped)
    };
    match snapped {
        Ok(snapped) if parent.contains(&snapped) || overhangs_slightly(&snapped, parent) => snapped,
        _ => {
            log::debug!("Snapped clip result no longer fits its parent, keeping it unsnapped");
            clipped
        }
    }
}
