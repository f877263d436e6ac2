//! Page layout tree
//!
//! A [`Page`] owns its top-level regions; every [`LayoutElement`] owns its
//! children. Nesting follows [`ElementKind::can_contain`] and is checked on
//! insertion.

use crate::error::{LayoutError, Result};
use crate::reading_order::{remove_region_refs, ReadingOrderNode};
use ocrlayout_geometry::{BoundingBox, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Region subtypes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    /// Running text
    #[default]
    Text,
    /// Photo or picture
    Image,
    /// Line art, logos, decorations
    Graphic,
    /// Rule separating columns or sections
    Separator,
    /// Formula
    Math,
    /// Speckle, bleed-through and other non-content marks
    Noise,
    /// Engine could not classify the block
    Unknown,
}

impl fmt::Display for RegionKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Graphic => "graphic",
            Self::Separator => "separator",
            Self::Math => "math",
            Self::Noise => "noise",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for RegionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "paragraph" => Ok(Self::Text),
            "image" | "picture" => Ok(Self::Image),
            "graphic" => Ok(Self::Graphic),
            "separator" => Ok(Self::Separator),
            "math" | "formula" => Ok(Self::Math),
            "noise" => Ok(Self::Noise),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown region kind: '{s}'")),
        }
    }
}

/// Kind of a [`LayoutElement`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Block-level region
    Region(RegionKind),
    /// Table block
    Table,
    /// Table cell
    Cell,
    /// Text line
    Line,
    /// Word
    Word,
    /// Single character
    Glyph,
}

impl ElementKind {
    /// Whether an element of this kind may own a child of kind `child`
    #[must_use]
    pub const fn can_contain(self, child: Self) -> bool {
        match (self, child) {
            (Self::Region(_), Self::Region(_) | Self::Table) => true,
            (Self::Region(RegionKind::Text) | Self::Cell, Self::Line) => true,
            (Self::Table, Self::Cell) => true,
            (Self::Line, Self::Word) => true,
            (Self::Word, Self::Glyph) => true,
            _ => false,
        }
    }

    /// Whether elements of this kind carry text results
    #[inline]
    #[must_use]
    pub const fn is_text_bearing(self) -> bool {
        match self {
            Self::Region(kind) => matches!(kind, RegionKind::Text),
            _ => true,
        }
    }

    /// Whether this kind may sit directly on the page
    #[inline]
    #[must_use]
    pub const fn is_top_level(self) -> bool {
        matches!(self, Self::Region(_) | Self::Table)
    }

    /// Hierarchy level this kind aggregates at
    #[inline]
    #[must_use]
    pub const fn text_level(self) -> TextLevel {
        match self {
            Self::Region(_) | Self::Table | Self::Cell => TextLevel::Region,
            Self::Line => TextLevel::Line,
            Self::Word => TextLevel::Word,
            Self::Glyph => TextLevel::Glyph,
        }
    }
}

impl fmt::Display for ElementKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region(kind) => write!(f, "{kind} region"),
            Self::Table => write!(f, "table"),
            Self::Cell => write!(f, "cell"),
            Self::Line => write!(f, "line"),
            Self::Word => write!(f, "word"),
            Self::Glyph => write!(f, "glyph"),
        }
    }
}

/// Hierarchy levels, coarsest first
///
/// Ordering follows depth: `Region < Line < Word < Glyph`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TextLevel {
    /// Regions, tables and cells
    Region,
    /// Text lines
    Line,
    /// Words
    #[default]
    Word,
    /// Glyphs
    Glyph,
}

impl fmt::Display for TextLevel {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region => write!(f, "region"),
            Self::Line => write!(f, "line"),
            Self::Word => write!(f, "word"),
            Self::Glyph => write!(f, "glyph"),
        }
    }
}

impl std::str::FromStr for TextLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "region" | "block" => Ok(Self::Region),
            "line" | "textline" => Ok(Self::Line),
            "word" => Ok(Self::Word),
            "glyph" | "symbol" => Ok(Self::Glyph),
            _ => Err(format!(
                "Unknown text level: '{s}'. Expected one of: region, line, word, glyph"
            )),
        }
    }
}

/// Direction in which the characters of a line are read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl ReadingDirection {
    /// Children are read in reverse storage order
    #[inline]
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::RightToLeft)
    }
}

/// Order in which the lines of a region follow each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextLineOrder {
    #[default]
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl TextLineOrder {
    /// Lines are read in reverse storage order
    #[inline]
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::BottomToTop)
    }
}

/// One recognition hypothesis for an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResult {
    /// Rank, 0 is the best hypothesis
    pub index: u32,
    /// Recognized text
    pub text: String,
    /// Confidence in `[0.0, 1.0]`
    pub confidence: f64,
}

impl TextResult {
    /// Best (rank 0) result; confidence is clamped into `[0, 1]`
    #[must_use = "text result is created but not used"]
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            index: 0,
            text: text.into(),
            confidence: clamp_confidence(confidence),
        }
    }

    /// Rank engine alternatives by confidence, highest first.
    ///
    /// Ties keep detection order.
    ///
    /// ```
    /// use ocrlayout_core::TextResult;
    ///
    /// let ranked = TextResult::ranked(vec![
    ///     ("c".to_string(), 0.4),
    ///     ("e".to_string(), 0.9),
    ///     ("o".to_string(), 0.4),
    /// ]);
    /// let texts: Vec<_> = ranked.iter().map(|r| r.text.as_str()).collect();
    /// assert_eq!(texts, ["e", "c", "o"]);
    /// assert_eq!(ranked[0].index, 0);
    /// ```
    #[must_use]
    pub fn ranked(alternatives: Vec<(String, f64)>) -> Vec<Self> {
        let mut alternatives: Vec<(String, f64)> = alternatives
            .into_iter()
            .map(|(text, confidence)| (text, clamp_confidence(confidence)))
            .collect();
        alternatives.sort_by(|a, b| b.1.total_cmp(&a.1));
        alternatives
            .into_iter()
            .enumerate()
            .map(|(rank, (text, confidence))| Self {
                index: u32::try_from(rank).unwrap_or(u32::MAX),
                text,
                confidence,
            })
            .collect()
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Node of the page tree
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub(crate) id: String,
    pub(crate) kind: ElementKind,
    pub(crate) polygon: Polygon,
    pub(crate) children: Vec<LayoutElement>,
    /// Recognition hypotheses, best first
    pub text_results: Vec<TextResult>,
    /// Clockwise rotation in degrees
    pub orientation: Option<f64>,
    pub reading_direction: Option<ReadingDirection>,
    pub line_order: Option<TextLineOrder>,
}

impl LayoutElement {
    #[must_use = "element is created but not used"]
    pub fn new(id: impl Into<String>, kind: ElementKind, polygon: Polygon) -> Self {
        Self {
            id: id.into(),
            kind,
            polygon,
            children: Vec::new(),
            text_results: Vec::new(),
            orientation: None,
            reading_direction: None,
            line_order: None,
        }
    }

    /// Attach a rank-0 text result
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>, confidence: f64) -> Self {
        self.text_results = vec![TextResult::new(text, confidence)];
        self
    }

    #[must_use]
    pub const fn with_reading_direction(mut self, direction: ReadingDirection) -> Self {
        self.reading_direction = Some(direction);
        self
    }

    #[must_use]
    pub const fn with_line_order(mut self, order: TextLineOrder) -> Self {
        self.line_order = Some(order);
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub(crate) fn set_polygon(&mut self, polygon: Polygon) {
        self.polygon = polygon;
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Append a child, checking the nesting rules
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidChild`] if this kind cannot contain the child's kind.
    pub fn push_child(&mut self, child: Self) -> Result<()> {
        if !self.kind.can_contain(child.kind) {
            return Err(LayoutError::InvalidChild {
                parent: self.id.clone(),
                child: child.id,
            });
        }
        self.children.push(child);
        Ok(())
    }

    /// Builder-style [`Self::push_child`]
    ///
    /// # Errors
    ///
    /// See [`Self::push_child`].
    pub fn with_child(mut self, child: Self) -> Result<Self> {
        self.push_child(child)?;
        Ok(self)
    }

    /// Text of the best result
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text_results.first().map(|r| r.text.as_str())
    }

    /// Confidence of the best result
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        self.text_results.first().map(|r| r.confidence)
    }

    /// Depth-first search for a descendant (or self) by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Pair of sibling ids whose texts are fused without separator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinRelation {
    pub source: String,
    pub target: String,
}

impl JoinRelation {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// The relation links `a` and `b`, in either direction
    #[inline]
    #[must_use]
    pub fn links(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Root of the page tree
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub(crate) id: String,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) border: Polygon,
    pub(crate) regions: Vec<LayoutElement>,
    /// Explicit reading order, if the document has one
    pub reading_order: Option<ReadingOrderNode>,
    /// Join relations between sibling elements
    pub relations: Vec<JoinRelation>,
    pub reading_direction: Option<ReadingDirection>,
    pub line_order: Option<TextLineOrder>,
    /// Clockwise rotation of the page image in degrees
    pub orientation: Option<f64>,
}

impl Page {
    /// Page whose border is the full image rectangle
    ///
    /// # Errors
    ///
    /// Propagates repair failure for non-finite dimensions.
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Result<Self> {
        let border = BoundingBox::new(0.0, 0.0, width, height).to_polygon()?;
        Ok(Self::with_border(id, width, height, border))
    }

    /// Page with an explicit border (e.g. after cropping)
    #[must_use]
    pub fn with_border(id: impl Into<String>, width: f64, height: f64, border: Polygon) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            border,
            regions: Vec::new(),
            reading_order: None,
            relations: Vec::new(),
            reading_direction: None,
            line_order: None,
            orientation: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn border(&self) -> &Polygon {
        &self.border
    }

    #[inline]
    #[must_use]
    pub fn regions(&self) -> &[LayoutElement] {
        &self.regions
    }

    /// Append a top-level region
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidChild`] for kinds that cannot sit on the page.
    pub fn push_region(&mut self, region: LayoutElement) -> Result<()> {
        if !region.kind.is_top_level() {
            return Err(LayoutError::InvalidChild {
                parent: self.id.clone(),
                child: region.id,
            });
        }
        self.regions.push(region);
        Ok(())
    }

    /// Remove all regions and their reading-order references
    pub fn clear_regions(&mut self) {
        let removed: Vec<String> = self.regions.drain(..).map(|r| r.id).collect();
        if !removed.is_empty() {
            log::debug!("Removing {} existing regions from {}", removed.len(), self.id);
        }
        remove_region_refs(&mut self.reading_order, &removed);
    }

    /// Mark two sibling elements as fused
    pub fn add_join(&mut self, a: impl Into<String>, b: impl Into<String>) {
        self.relations.push(JoinRelation::new(a, b));
    }

    /// Whether `a` and `b` appear together in a join relation
    #[must_use]
    pub fn is_joined(&self, a: &str, b: &str) -> bool {
        is_joined(&self.relations, a, b)
    }

    /// Find an element anywhere in the page by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&LayoutElement> {
        self.regions.iter().find_map(|region| region.find(id))
    }
}

pub(crate) fn is_joined(relations: &[JoinRelation], a: &str, b: &str) -> bool {
    relations.iter().any(|r| r.links(a, b))
}
