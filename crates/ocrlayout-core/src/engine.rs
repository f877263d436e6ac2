//! Recognition engine boundary
//!
//! The engine is consumed through [`ResultCursor`], a cursor over its result
//! hierarchy. Cloning a cursor takes a snapshot that can be iterated
//! independently of the original.

use crate::model::{ElementKind, ReadingDirection, RegionKind, TextLineOrder};
use ocrlayout_geometry::{BoundingBox, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine iteration granularity, coarsest first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Level {
    Block,
    Paragraph,
    TextLine,
    Word,
    Symbol,
}

impl Level {
    /// Next coarser level, `None` for [`Level::Block`]
    #[inline]
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Block => None,
            Self::Paragraph => Some(Self::Block),
            Self::TextLine => Some(Self::Paragraph),
            Self::Word => Some(Self::TextLine),
            Self::Symbol => Some(Self::Word),
        }
    }

    /// Next finer level, `None` for [`Level::Symbol`]
    #[inline]
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Block => Some(Self::Paragraph),
            Self::Paragraph => Some(Self::TextLine),
            Self::TextLine => Some(Self::Word),
            Self::Word => Some(Self::Symbol),
            Self::Symbol => None,
        }
    }
}

impl fmt::Display for Level {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => write!(f, "block"),
            Self::Paragraph => write!(f, "paragraph"),
            Self::TextLine => write!(f, "textline"),
            Self::Word => write!(f, "word"),
            Self::Symbol => write!(f, "symbol"),
        }
    }
}

/// Block classification reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Unknown,
    FlowingText,
    HeadingText,
    PulloutText,
    CaptionText,
    VerticalText,
    Equation,
    InlineEquation,
    Table,
    FlowingImage,
    HeadingImage,
    PulloutImage,
    HorizontalLine,
    VerticalLine,
    Noise,
}

impl BlockKind {
    /// Page element kind for blocks of this type
    #[must_use]
    pub const fn element_kind(self) -> ElementKind {
        match self {
            Self::FlowingText
            | Self::HeadingText
            | Self::PulloutText
            | Self::CaptionText
            | Self::VerticalText => ElementKind::Region(RegionKind::Text),
            Self::Equation | Self::InlineEquation => ElementKind::Region(RegionKind::Math),
            Self::Table => ElementKind::Table,
            Self::FlowingImage | Self::HeadingImage | Self::PulloutImage => {
                ElementKind::Region(RegionKind::Image)
            }
            Self::HorizontalLine | Self::VerticalLine => ElementKind::Region(RegionKind::Separator),
            Self::Noise => ElementKind::Region(RegionKind::Noise),
            Self::Unknown => ElementKind::Region(RegionKind::Unknown),
        }
    }
}

/// Writing direction of a single word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WordDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    /// Digits, punctuation and other direction-less text
    Neutral,
}

/// Layout orientation of the current block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockOrientation {
    /// Clockwise rotation in degrees
    pub angle: f64,
    pub reading_direction: ReadingDirection,
    pub line_order: TextLineOrder,
}

/// Cursor over an engine's result hierarchy.
///
/// A cursor always points at one symbol-level position; the element at a
/// coarser level is the one containing that position.
pub trait ResultCursor: Clone {
    /// No element exists at `level` for the current position
    fn is_empty(&self, level: Level) -> bool;

    /// The current `element`-level item is the last one inside its
    /// `enclosing`-level ancestor.
    ///
    /// An element is always final within itself, so implementations must
    /// return true when `enclosing == element`.
    fn is_at_final_element(&self, enclosing: Level, element: Level) -> bool;

    /// Move to the first position of the next element at `level`.
    ///
    /// Returns false when there is none.
    fn advance(&mut self, level: Level) -> bool;

    /// Axis-aligned box of the element at `level`
    fn bounding_box(&self, level: Level) -> Option<BoundingBox>;

    /// Outline of the current block, if the engine tracks one
    fn block_polygon(&self) -> Option<Vec<Point>> {
        None
    }

    /// Recognized text of the element at `level`
    fn text(&self, level: Level) -> Option<String>;

    /// Recognition confidence in `[0, 1]`
    fn confidence(&self, level: Level) -> f64;

    fn block_kind(&self) -> BlockKind;

    fn orientation(&self) -> Option<BlockOrientation> {
        None
    }

    fn word_direction(&self) -> WordDirection {
        WordDirection::LeftToRight
    }

    /// Alternative readings for the current symbol with their confidences
    fn symbol_choices(&self) -> Vec<(String, f64)> {
        Vec::new()
    }
}
