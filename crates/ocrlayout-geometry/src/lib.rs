//! # ocrlayout-geometry
//!
//! Polygon operations for OCR page layouts.
//!
//! - [`repair`]: turn any point sequence into a valid simple polygon
//! - [`join`]: merge several shapes into one concave outline via bridges
//!   along their minimum spanning tree
//! - [`clip`]: cut a child polygon to its parent, re-joining split parts
//!
//! Coordinates are page pixels with the origin at the top-left corner.
//!
//! ## Example
//!
//! ```
//! use ocrlayout_geometry::{clip, BoundingBox};
//!
//! let word = BoundingBox::new(0.0, 0.0, 20.0, 10.0).to_points();
//! let line = BoundingBox::new(5.0, 0.0, 30.0, 30.0).to_points();
//! let clipped = clip(&word, &line).unwrap().unwrap();
//! assert_eq!(clipped.bounding_box(), BoundingBox::new(5.0, 0.0, 20.0, 10.0));
//! ```

pub mod clip;
pub mod error;
pub mod join;
pub mod polygon;
pub mod repair;

pub use clip::{clip, clip_polygon, clip_with_bridge};
pub use error::{GeometryError, Result};
pub use join::{join, join_multi, DEFAULT_BRIDGE_WIDTH, MIN_BRIDGE_DISTANCE};
pub use polygon::{BoundingBox, Point, Polygon, AREA_EPSILON};
pub use repair::repair;
