//! Insert engine detections into a page
//!
//! Walks the engine hierarchy block by block and builds the page tree:
//!
//! 1. Each detection's outline is repaired and clipped to its parent's
//!    outline (the page border for blocks); detections outside their parent
//!    are discarded
//! 2. Text is attached at the configured text level
//! 3. New regions are appended to the page's reading order
//! 4. Text is aggregated upward, and outlines optionally shrunk to their
//!    children

use crate::aggregate::aggregate;
use crate::config::LayoutConfig;
use crate::engine::{Level, ResultCursor, WordDirection};
use crate::error::Result;
use crate::level_iter::iterate_level;
use crate::model::{
    ElementKind, LayoutElement, Page, ReadingDirection, RegionKind, TextLevel, TextResult,
};
use crate::reading_order::append_region_ref;
use crate::shrink::shrink_to_children;
use ocrlayout_geometry::{clip_polygon, repair, Point, Polygon};

/// Counts of inserted and discarded elements for one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentationStats {
    pub regions: usize,
    pub lines: usize,
    pub words: usize,
    pub glyphs: usize,
    /// Detections without outline or outside their parent
    pub discarded: usize,
}

/// Builds page trees from an engine cursor
///
/// # Examples
///
/// ```no_run
/// use ocrlayout_core::{LayoutConfigBuilder, Page, PageSegmenter, ResultCursor};
///
/// fn run<C: ResultCursor>(cursor: C) -> ocrlayout_core::Result<Page> {
///     let config = LayoutConfigBuilder::glyphs().shrink_polygons(true).build()?;
///     let mut page = Page::new("page0001", 2480.0, 3508.0)?;
///     let stats = PageSegmenter::new(&config).segment(&mut page, cursor)?;
///     log::info!("{} regions, {} discarded", stats.regions, stats.discarded);
///     Ok(page)
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PageSegmenter {
    config: LayoutConfig,
}

impl PageSegmenter {
    #[must_use]
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Insert every block the cursor yields into `page`.
    ///
    /// # Errors
    ///
    /// [`crate::LayoutError::Geometry`] when an outline cannot be repaired or
    /// joined; the page should be considered failed.
    pub fn segment<C: ResultCursor>(
        &self,
        page: &mut Page,
        cursor: C,
    ) -> Result<SegmentationStats> {
        let mut stats = SegmentationStats::default();
        if self.config.overwrite_segments {
            page.clear_regions();
        }

        let mut next_region = page.regions().len();
        for block in iterate_level(cursor, Level::Block, None) {
            let kind = block.block_kind().element_kind();
            if kind == ElementKind::Region(RegionKind::Noise) && !self.config.keep_noise {
                log::debug!("Skipping noise block");
                continue;
            }

            let id = loop {
                let candidate = format!("{}region{next_region:04}", self.config.id_prefix);
                if page.find(&candidate).is_none() {
                    break candidate;
                }
                next_region += 1;
            };
            let outline = block
                .block_polygon()
                .filter(|points| !points.is_empty())
                .or_else(|| block.bounding_box(Level::Block).map(|bbox| bbox.to_points()));
            let Some(polygon) = self.place(outline, page.border(), &id, &mut stats)? else {
                continue;
            };
            next_region += 1;

            let mut region = LayoutElement::new(id.clone(), kind, polygon);
            if let Some(orientation) = block.orientation() {
                region.orientation = Some(orientation.angle);
                region.reading_direction = Some(orientation.reading_direction);
                region.line_order = Some(orientation.line_order);
            }
            if self.config.text_level == TextLevel::Region && kind.is_text_bearing() {
                attach_text(&block, Level::Block, &mut region);
            }
            match kind {
                ElementKind::Table => self.fill_table(&block, &mut region, &mut stats)?,
                ElementKind::Region(RegionKind::Text) => {
                    self.fill_text_region(&block, &mut region, &mut stats)?;
                }
                _ => {}
            }

            page.push_region(region)?;
            append_region_ref(&mut page.reading_order, &id);
            stats.regions += 1;
        }

        aggregate(page, self.config.text_level, self.config.overwrite_text);
        if self.config.shrink_polygons {
            shrink_to_children(page, self.config.bridge_width)?;
        }
        log::info!(
            "Segmented {}: {} regions, {} lines, {} words, {} glyphs ({} discarded)",
            page.id(),
            stats.regions,
            stats.lines,
            stats.words,
            stats.glyphs,
            stats.discarded
        );
        Ok(stats)
    }

    /// Repair `outline` and clip it to `parent`; `None` if it must be discarded
    fn place(
        &self,
        outline: Option<Vec<Point>>,
        parent: &Polygon,
        id: &str,
        stats: &mut SegmentationStats,
    ) -> Result<Option<Polygon>> {
        let Some(points) = outline.filter(|points| !points.is_empty()) else {
            log::info!("Engine reported no outline for {id}, discarding");
            stats.discarded += 1;
            return Ok(None);
        };
        let candidate = repair(&points)?;
        let placed = clip_polygon(&candidate, parent, self.config.bridge_width)?;
        if placed.is_none() {
            log::info!("{id} lies outside its parent, discarding");
            stats.discarded += 1;
        }
        Ok(placed)
    }

    fn fill_text_region<C: ResultCursor>(
        &self,
        block: &C,
        region: &mut LayoutElement,
        stats: &mut SegmentationStats,
    ) -> Result<()> {
        if !self.config.paragraph_regions && self.config.segmentation_level < TextLevel::Line {
            return Ok(());
        }
        for paragraph in iterate_level(block.clone(), Level::Paragraph, Some(Level::Block)) {
            if !self.config.paragraph_regions {
                self.fill_lines(&paragraph, region, stats)?;
                continue;
            }
            let id = format!("{}_para{:04}", region.id(), region.children().len());
            let outline = paragraph
                .bounding_box(Level::Paragraph)
                .map(|bbox| bbox.to_points());
            let Some(polygon) = self.place(outline, region.polygon(), &id, stats)? else {
                continue;
            };
            let mut sub_region =
                LayoutElement::new(id, ElementKind::Region(RegionKind::Text), polygon);
            if self.config.text_level == TextLevel::Region {
                attach_text(&paragraph, Level::Paragraph, &mut sub_region);
            }
            self.fill_lines(&paragraph, &mut sub_region, stats)?;
            region.push_child(sub_region)?;
        }
        Ok(())
    }

    /// One cell per engine paragraph
    fn fill_table<C: ResultCursor>(
        &self,
        block: &C,
        table: &mut LayoutElement,
        stats: &mut SegmentationStats,
    ) -> Result<()> {
        for paragraph in iterate_level(block.clone(), Level::Paragraph, Some(Level::Block)) {
            let id = format!("{}_cell{:04}", table.id(), table.children().len());
            let outline = paragraph
                .bounding_box(Level::Paragraph)
                .map(|bbox| bbox.to_points());
            let Some(polygon) = self.place(outline, table.polygon(), &id, stats)? else {
                continue;
            };
            let mut cell = LayoutElement::new(id, ElementKind::Cell, polygon);
            if self.config.text_level == TextLevel::Region {
                attach_text(&paragraph, Level::Paragraph, &mut cell);
            }
            self.fill_lines(&paragraph, &mut cell, stats)?;
            table.push_child(cell)?;
        }
        Ok(())
    }

    fn fill_lines<C: ResultCursor>(
        &self,
        paragraph: &C,
        parent: &mut LayoutElement,
        stats: &mut SegmentationStats,
    ) -> Result<()> {
        if self.config.segmentation_level < TextLevel::Line {
            return Ok(());
        }
        for line in iterate_level(paragraph.clone(), Level::TextLine, Some(Level::Paragraph)) {
            let id = format!("{}_line{:04}", parent.id(), parent.children().len());
            let outline = line.bounding_box(Level::TextLine).map(|bbox| bbox.to_points());
            let Some(polygon) = self.place(outline, parent.polygon(), &id, stats)? else {
                continue;
            };
            let mut element = LayoutElement::new(id, ElementKind::Line, polygon);
            if self.config.text_level == TextLevel::Line {
                attach_text(&line, Level::TextLine, &mut element);
            }
            self.fill_words(&line, &mut element, stats)?;
            parent.push_child(element)?;
            stats.lines += 1;
        }
        Ok(())
    }

    fn fill_words<C: ResultCursor>(
        &self,
        line: &C,
        parent: &mut LayoutElement,
        stats: &mut SegmentationStats,
    ) -> Result<()> {
        if self.config.segmentation_level < TextLevel::Word {
            return Ok(());
        }
        for word in iterate_level(line.clone(), Level::Word, Some(Level::TextLine)) {
            let id = format!("{}_word{:04}", parent.id(), parent.children().len());
            let outline = word.bounding_box(Level::Word).map(|bbox| bbox.to_points());
            let Some(polygon) = self.place(outline, parent.polygon(), &id, stats)? else {
                continue;
            };
            let mut element = LayoutElement::new(id, ElementKind::Word, polygon);
            if word.word_direction() == WordDirection::RightToLeft {
                element.reading_direction = Some(ReadingDirection::RightToLeft);
            }
            if self.config.text_level == TextLevel::Word {
                attach_text(&word, Level::Word, &mut element);
            }
            self.fill_glyphs(&word, &mut element, stats)?;
            parent.push_child(element)?;
            stats.words += 1;
        }
        Ok(())
    }

    fn fill_glyphs<C: ResultCursor>(
        &self,
        word: &C,
        parent: &mut LayoutElement,
        stats: &mut SegmentationStats,
    ) -> Result<()> {
        if self.config.segmentation_level < TextLevel::Glyph {
            return Ok(());
        }
        for symbol in iterate_level(word.clone(), Level::Symbol, Some(Level::Word)) {
            let id = format!("{}_glyph{:04}", parent.id(), parent.children().len());
            let outline = symbol.bounding_box(Level::Symbol).map(|bbox| bbox.to_points());
            let Some(polygon) = self.place(outline, parent.polygon(), &id, stats)? else {
                continue;
            };
            let mut element = LayoutElement::new(id, ElementKind::Glyph, polygon);
            if self.config.text_level == TextLevel::Glyph {
                let choices = symbol.symbol_choices();
                if choices.is_empty() {
                    attach_text(&symbol, Level::Symbol, &mut element);
                } else {
                    let mut ranked = TextResult::ranked(choices);
                    ranked.truncate(self.config.max_alternatives);
                    element.text_results = ranked;
                }
            }
            parent.push_child(element)?;
            stats.glyphs += 1;
        }
        Ok(())
    }
}

/// Set the engine's text at `level` as the element's only result
fn attach_text<C: ResultCursor>(cursor: &C, level: Level, element: &mut LayoutElement) {
    match cursor.text(level) {
        Some(text) => {
            let text = text.trim_end_matches('\n');
            element.text_results = vec![TextResult::new(text, cursor.confidence(level))];
        }
        None => log::debug!("No {level} text for {}", element.id()),
    }
}
