//! Geometry integration tests
//!
//! Table-driven cases for repair, join and clip, plus property tests for the
//! invariants every returned polygon must satisfy:
//! - positive area and at least three vertices
//! - clipping is idempotent
//! - clipped output stays within the parent
//! - a joined outline covers at least the union of its inputs

use ocrlayout_geometry::{
    clip, clip_polygon, join, repair, BoundingBox, GeometryError, Point, Polygon,
    DEFAULT_BRIDGE_WIDTH,
};
use geo::Area;
use geo_clipper::Clipper;
use proptest::prelude::*;
use rstest::rstest;
use std::f64::consts::TAU;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn points(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().copied().map(Point::from).collect()
}

fn rect(l: f64, t: f64, r: f64, b: f64) -> Vec<Point> {
    BoundingBox::new(l, t, r, b).to_points()
}

// ============================================================================
// Repair
// ============================================================================

#[rstest]
#[case::rectangle(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])]
#[case::bowtie(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)])]
#[case::spike(&[(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (20.0, 5.0), (10.0, 5.0), (10.0, 10.0), (0.0, 10.0)])]
#[case::single_point(&[(3.0, 4.0)])]
#[case::two_points(&[(0.0, 0.0), (8.0, 3.0)])]
#[case::collinear(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)])]
#[case::repeated(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)])]
fn test_repair_yields_valid_polygon(#[case] coords: &[(f64, f64)]) {
    init_logging();
    let repaired = repair(&points(coords)).unwrap();
    assert!(repaired.area() > 0.0);
    assert!(repaired.vertex_count() >= 3);
    assert!(repaired.points().iter().all(Point::is_finite));
}

#[rstest]
#[case::empty(&[], "Empty geometry")]
#[case::infinite(&[(0.0, 0.0), (f64::INFINITY, 0.0), (1.0, 1.0)], "Non-finite")]
fn test_repair_rejects_unusable_input(#[case] coords: &[(f64, f64)], #[case] message: &str) {
    let err = repair(&points(coords)).unwrap_err();
    assert!(err.to_string().starts_with(message), "got: {err}");
    assert!(!err.is_invariant_violation());
}

#[test]
fn test_repaired_bowtie_covers_a_lobe() {
    let repaired = repair(&points(&[
        (0.0, 0.0),
        (10.0, 10.0),
        (10.0, 0.0),
        (0.0, 10.0),
    ]))
    .unwrap();
    let bbox = repaired.bounding_box();
    assert!(bbox.width() > 0.0 && bbox.height() > 0.0);
    assert!(bbox.l >= -12.0 && bbox.r <= 22.0);
}

// ============================================================================
// Join
// ============================================================================

#[rstest]
#[case::row(3, 25.0, 0.0)]
#[case::column(4, 0.0, 18.0)]
#[case::diagonal(3, 22.0, 22.0)]
fn test_join_connects_all_shapes(#[case] count: usize, #[case] dx: f64, #[case] dy: f64) {
    init_logging();
    let shapes: Vec<Polygon> = (0..count)
        .map(|i| {
            let offset = i as f64;
            BoundingBox::new(offset * dx, offset * dy, offset * dx + 10.0, offset * dy + 10.0)
                .to_polygon()
                .unwrap()
        })
        .collect();
    let joined = join(&shapes, DEFAULT_BRIDGE_WIDTH).unwrap();
    for shape in &shapes {
        assert!(joined.contains(shape));
    }
    let total: f64 = shapes.iter().map(Polygon::area).sum();
    assert!(joined.area() > total);
}

#[test]
fn test_join_overlapping_shapes() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0).to_polygon().unwrap();
    let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0).to_polygon().unwrap();
    let joined = join(&[a, b], DEFAULT_BRIDGE_WIDTH).unwrap();
    let bbox = joined.bounding_box();
    assert!(bbox.l <= 0.0 && bbox.t <= 0.0 && bbox.r >= 15.0 && bbox.b >= 15.0);
}

#[test]
fn test_join_result_on_integer_grid() {
    let a = BoundingBox::new(0.3, 0.2, 10.6, 10.1).to_polygon().unwrap();
    let b = BoundingBox::new(30.2, 0.4, 40.7, 9.8).to_polygon().unwrap();
    let joined = join(&[a, b], DEFAULT_BRIDGE_WIDTH).unwrap();
    for p in joined.points() {
        assert!((p.x - p.x.round()).abs() < 1e-9);
        assert!((p.y - p.y.round()).abs() < 1e-9);
    }
}

#[test]
fn test_join_empty_is_error() {
    assert_eq!(
        join(&[], DEFAULT_BRIDGE_WIDTH),
        Err(GeometryError::EmptyGeometry("join needs at least one polygon"))
    );
}

// ============================================================================
// Clip
// ============================================================================

#[test]
fn test_clip_is_idempotent() {
    let parent = rect(5.0, 0.0, 30.0, 30.0);
    let once = clip(&rect(0.0, 0.0, 20.0, 10.0), &parent).unwrap().unwrap();
    let twice = clip(&once.points(), &parent).unwrap().unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_clip_split_child_is_rejoined() {
    // U-shaped parent cuts the child bar into two pieces
    let parent = points(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 20.0),
        (20.0, 20.0),
        (20.0, 0.0),
        (30.0, 0.0),
        (30.0, 30.0),
        (0.0, 30.0),
    ]);
    let child = rect(2.0, 5.0, 28.0, 10.0);
    let clipped = clip(&child, &parent).unwrap().unwrap();
    let bbox = clipped.bounding_box();
    assert!(bbox.l <= 2.0 && bbox.r >= 28.0);
}

#[test]
fn test_clip_polygon_keeps_contained_child() {
    let parent = BoundingBox::new(0.0, 0.0, 100.0, 100.0).to_polygon().unwrap();
    let child = BoundingBox::new(10.5, 10.5, 20.25, 20.75).to_polygon().unwrap();
    let clipped = clip_polygon(&child, &parent, DEFAULT_BRIDGE_WIDTH).unwrap();
    assert_eq!(clipped, Some(child));
}

// ============================================================================
// Properties
// ============================================================================

fn arb_rect() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (0i32..60, 0i32..60, 1i32..40, 1i32..40).prop_map(|(l, t, w, h)| {
        let (l, t) = (f64::from(l), f64::from(t));
        (l, t, l + f64::from(w), t + f64::from(h))
    })
}

/// Convex ring with fractional coordinates, vertices on a circle
fn arb_convex_ring() -> impl Strategy<Value = Vec<(f64, f64)>> {
    (
        10.0f64..40.0,
        10.0f64..40.0,
        3.0f64..25.0,
        prop::collection::vec(0.0f64..1.0, 3..7),
    )
        .prop_map(|(cx, cy, radius, mut turns)| {
            turns.sort_by(f64::total_cmp);
            turns
                .into_iter()
                .map(|turn| {
                    let angle = turn * TAU;
                    (radius.mul_add(angle.cos(), cx), radius.mul_add(angle.sin(), cy))
                })
                .collect()
        })
}

/// Rectangles on the integer grid that all contain (20.5, 20.5)
fn arb_overlapping_rects() -> impl Strategy<Value = Vec<(f64, f64, f64, f64)>> {
    prop::collection::vec((0i32..=20, 0i32..=20, 21i32..60, 21i32..60), 2..5).prop_map(|rects| {
        rects
            .into_iter()
            .map(|(l, t, r, b)| (f64::from(l), f64::from(t), f64::from(r), f64::from(b)))
            .collect()
    })
}

/// Property: repair succeeds with a valid polygon for any finite input
#[test]
fn proptest_repair_result_is_valid() {
    proptest!(|(coords in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 1..10))| {
        let poly = repair(&points(&coords));
        prop_assert!(poly.is_ok(), "repair failed: {:?}", poly);
        let poly = poly.unwrap();
        prop_assert!(poly.area() > 0.0);
        prop_assert!(poly.vertex_count() >= 3);
    });
}

/// Property: clipping a clipped rectangle again changes nothing
#[test]
fn proptest_clip_idempotent() {
    proptest!(|(child in arb_rect(), parent in arb_rect())| {
        let parent = rect(parent.0, parent.1, parent.2, parent.3);
        let once = clip(&rect(child.0, child.1, child.2, child.3), &parent).unwrap();
        if let Some(once) = once {
            let twice = clip(&once.points(), &parent).unwrap();
            prop_assert_eq!(Some(once), twice);
        }
    });
}

/// Property: idempotence holds for fractional, non-rectangular shapes
#[test]
fn proptest_clip_idempotent_fractional() {
    init_logging();
    proptest!(|(child in arb_convex_ring(), parent in arb_convex_ring())| {
        let parent = points(&parent);
        let once = clip(&points(&child), &parent).unwrap();
        if let Some(once) = once {
            let twice = clip(&once.points(), &parent).unwrap();
            prop_assert_eq!(Some(once), twice);
        }
    });
}

/// Property: clipped rectangles stay within the parent rectangle
#[test]
fn proptest_clip_within_parent() {
    proptest!(|(child in arb_rect(), parent in arb_rect())| {
        let clipped = clip(
            &rect(child.0, child.1, child.2, child.3),
            &rect(parent.0, parent.1, parent.2, parent.3),
        )
        .unwrap();
        if let Some(clipped) = clipped {
            let bbox = clipped.bounding_box();
            prop_assert!(bbox.l >= parent.0 - 1e-9 && bbox.r <= parent.2 + 1e-9);
            prop_assert!(bbox.t >= parent.1 - 1e-9 && bbox.b <= parent.3 + 1e-9);
        }
    });
}

/// Property: fractional clips leave the parent's envelope by at most the
/// grid snap
#[test]
fn proptest_clip_within_parent_fractional() {
    proptest!(|(child in arb_convex_ring(), parent in arb_convex_ring())| {
        let parent = repair(&points(&parent)).unwrap();
        let clipped = clip(&points(&child), &parent.points()).unwrap();
        if let Some(clipped) = clipped {
            let (inner, outer) = (clipped.bounding_box(), parent.bounding_box());
            prop_assert!(inner.l >= outer.l - 0.75 && inner.r <= outer.r + 0.75);
            prop_assert!(inner.t >= outer.t - 0.75 && inner.b <= outer.b + 0.75);
        }
    });
}

/// Property: joining overlapping shapes never loses area of their union
#[test]
fn proptest_join_covers_union() {
    proptest!(|(rects in arb_overlapping_rects())| {
        let shapes: Vec<Polygon> = rects
            .iter()
            .map(|&(l, t, r, b)| BoundingBox::new(l, t, r, b).to_polygon().unwrap())
            .collect();
        let union = shapes[1..].iter().fold(
            geo::MultiPolygon::new(vec![shapes[0].as_geo().clone()]),
            |acc, shape| acc.union(shape.as_geo(), 1000.0),
        );
        let joined = join(&shapes, DEFAULT_BRIDGE_WIDTH).unwrap();
        prop_assert!(joined.area() >= union.unsigned_area() - 1e-6);
        for shape in &shapes {
            prop_assert!(joined.contains(shape));
        }
    });
}
