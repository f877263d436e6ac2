//! # ocrlayout-core
//!
//! Page layout tree for OCR engine output.
//!
//! - [`PageSegmenter`]: walks an engine [`ResultCursor`] and inserts regions,
//!   lines, words and glyphs, each clipped to its parent
//! - [`aggregate`]: recomputes text and confidence bottom-up, honoring reading
//!   direction, line order, join relations and the reading order
//! - [`iterate_level`]: sibling iteration over an engine cursor
//! - [`index_reading_order`]: id lookup into a reading-order tree
//! - [`shrink_to_children`]: tighten outlines to their children
//! - [`SettingsStack`]: push/pop engine configuration snapshots
//!
//! Polygon handling lives in [`ocrlayout_geometry`], re-exported as
//! [`geometry`].
//!
//! ## Example
//!
//! ```
//! use ocrlayout_core::{aggregate, BoundingBox, ElementKind, LayoutElement, Page, RegionKind, TextLevel};
//!
//! # fn main() -> ocrlayout_core::Result<()> {
//! let outline = |l, r| BoundingBox::new(l, 0.0, r, 20.0).to_polygon();
//! let line = LayoutElement::new("l1", ElementKind::Line, outline(0.0, 100.0)?)
//!     .with_child(LayoutElement::new("w1", ElementKind::Word, outline(0.0, 40.0)?).with_text("Hello", 0.9))?
//!     .with_child(LayoutElement::new("w2", ElementKind::Word, outline(50.0, 100.0)?).with_text("world", 0.7))?;
//! let region = LayoutElement::new("r1", ElementKind::Region(RegionKind::Text), outline(0.0, 100.0)?)
//!     .with_child(line)?;
//!
//! let mut page = Page::new("p1", 200.0, 100.0)?;
//! page.push_region(region)?;
//! aggregate(&mut page, TextLevel::Word, true);
//! assert_eq!(page.regions()[0].text(), Some("Hello world"));
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod level_iter;
pub mod model;
pub mod reading_order;
pub mod segmenter;
pub mod settings;
pub mod shrink;

pub use ocrlayout_geometry as geometry;
pub use ocrlayout_geometry::{BoundingBox, Point, Polygon};

pub use aggregate::aggregate;
pub use config::{LayoutConfig, LayoutConfigBuilder};
pub use engine::{BlockKind, BlockOrientation, Level, ResultCursor, WordDirection};
pub use error::{LayoutError, Result};
pub use level_iter::{iterate_level, LevelIter};
pub use model::{
    ElementKind, JoinRelation, LayoutElement, Page, ReadingDirection, RegionKind, TextLevel,
    TextLineOrder, TextResult,
};
pub use reading_order::{
    append_region_ref, index_reading_order, ordered_children, region_refs_in_order,
    remove_region_refs, ReadingOrderNode, RoGroup,
};
pub use segmenter::{PageSegmenter, SegmentationStats};
pub use settings::{ConfigurableEngine, EngineSettings, SettingsStack};
pub use shrink::shrink_to_children;
