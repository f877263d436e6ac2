//! Scripted recognition engine for integration tests
//!
//! A document is a tree of blocks/paragraphs/lines/words/symbols. The cursor
//! walks a flattened list of positions, one per symbol; elements without
//! children get a single position whose finer levels are absent, which is how
//! the real engine exposes non-text blocks and words without symbols.

#![allow(dead_code)]

use ocrlayout_core::settings::{ConfigurableEngine, EngineSettings};
use ocrlayout_core::{BlockKind, BlockOrientation, BoundingBox, Level, ResultCursor, WordDirection};
use std::rc::Rc;

pub const GLYPH_WIDTH: f64 = 10.0;
pub const GLYPH_HEIGHT: f64 = 20.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
pub struct MockSymbol {
    pub bbox: BoundingBox,
    pub text: Option<String>,
    pub confidence: f64,
    pub choices: Vec<(String, f64)>,
}

#[derive(Debug, Clone)]
pub struct MockWord {
    pub bbox: BoundingBox,
    pub symbols: Vec<MockSymbol>,
    pub rtl: bool,
}

#[derive(Debug, Clone)]
pub struct MockLine {
    pub bbox: BoundingBox,
    pub words: Vec<MockWord>,
}

#[derive(Debug, Clone)]
pub struct MockParagraph {
    pub bbox: BoundingBox,
    pub lines: Vec<MockLine>,
}

#[derive(Debug, Clone)]
pub struct MockBlock {
    pub kind: BlockKind,
    pub bbox: BoundingBox,
    pub paragraphs: Vec<MockParagraph>,
    pub orientation: Option<BlockOrientation>,
}

/// Word at `(left, top)` with one fixed-size symbol per character
pub fn word(text: &str, left: f64, top: f64, confidence: f64) -> MockWord {
    let symbols: Vec<MockSymbol> = text
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let l = left + GLYPH_WIDTH * i as f64;
            MockSymbol {
                bbox: BoundingBox::new(l, top, l + GLYPH_WIDTH, top + GLYPH_HEIGHT),
                text: Some(c.to_string()),
                confidence,
                choices: Vec::new(),
            }
        })
        .collect();
    let width = GLYPH_WIDTH * symbols.len().max(1) as f64;
    MockWord {
        bbox: BoundingBox::new(left, top, left + width, top + GLYPH_HEIGHT),
        symbols,
        rtl: false,
    }
}

/// Word whose symbols carry individual confidences
pub fn word_with_confidences(text: &str, left: f64, top: f64, confidences: &[f64]) -> MockWord {
    let mut w = word(text, left, top, 1.0);
    for (symbol, &confidence) in w.symbols.iter_mut().zip(confidences) {
        symbol.confidence = confidence;
    }
    w
}

fn envelope(boxes: impl IntoIterator<Item = BoundingBox>) -> BoundingBox {
    boxes
        .into_iter()
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default()
}

pub fn line(words: Vec<MockWord>) -> MockLine {
    MockLine {
        bbox: envelope(words.iter().map(|w| w.bbox)),
        words,
    }
}

pub fn paragraph(lines: Vec<MockLine>) -> MockParagraph {
    MockParagraph {
        bbox: envelope(lines.iter().map(|l| l.bbox)),
        lines,
    }
}

pub fn block(kind: BlockKind, paragraphs: Vec<MockParagraph>) -> MockBlock {
    MockBlock {
        kind,
        bbox: envelope(paragraphs.iter().map(|p| p.bbox)),
        paragraphs,
        orientation: None,
    }
}

pub fn text_block(paragraphs: Vec<MockParagraph>) -> MockBlock {
    block(BlockKind::FlowingText, paragraphs)
}

pub fn image_block(bbox: BoundingBox) -> MockBlock {
    MockBlock {
        kind: BlockKind::FlowingImage,
        bbox,
        paragraphs: Vec::new(),
        orientation: None,
    }
}

type Path = [Option<usize>; 5];

#[derive(Debug)]
struct MockDoc {
    blocks: Vec<MockBlock>,
    positions: Vec<Path>,
}

/// Cursor over a scripted document; clones share the document
#[derive(Debug, Clone)]
pub struct MockCursor {
    doc: Rc<MockDoc>,
    pos: usize,
}

impl MockCursor {
    pub fn new(blocks: Vec<MockBlock>) -> Self {
        let mut positions = Vec::new();
        for (b, block) in blocks.iter().enumerate() {
            if block.paragraphs.is_empty() {
                positions.push([Some(b), None, None, None, None]);
            }
            for (p, para) in block.paragraphs.iter().enumerate() {
                if para.lines.is_empty() {
                    positions.push([Some(b), Some(p), None, None, None]);
                }
                for (l, line) in para.lines.iter().enumerate() {
                    if line.words.is_empty() {
                        positions.push([Some(b), Some(p), Some(l), None, None]);
                    }
                    for (w, word) in line.words.iter().enumerate() {
                        if word.symbols.is_empty() {
                            positions.push([Some(b), Some(p), Some(l), Some(w), None]);
                        }
                        for s in 0..word.symbols.len() {
                            positions.push([Some(b), Some(p), Some(l), Some(w), Some(s)]);
                        }
                    }
                }
            }
        }
        Self {
            doc: Rc::new(MockDoc { blocks, positions }),
            pos: 0,
        }
    }

    fn path(&self) -> Option<&Path> {
        self.doc.positions.get(self.pos)
    }

    /// Index of the next position belonging to a different `level` element
    fn next_at(&self, level: Level) -> Option<usize> {
        let depth = level as usize;
        let current = self.path()?;
        (self.pos + 1..self.doc.positions.len())
            .find(|&i| self.doc.positions[i][..=depth] != current[..=depth])
    }

    fn block(&self) -> Option<&MockBlock> {
        self.doc.blocks.get(self.path()?[0]?)
    }

    fn paragraph(&self) -> Option<&MockParagraph> {
        self.block()?.paragraphs.get(self.path()?[1]?)
    }

    fn line(&self) -> Option<&MockLine> {
        self.paragraph()?.lines.get(self.path()?[2]?)
    }

    fn word(&self) -> Option<&MockWord> {
        self.line()?.words.get(self.path()?[3]?)
    }

    fn symbol(&self) -> Option<&MockSymbol> {
        self.word()?.symbols.get(self.path()?[4]?)
    }

    fn symbols(&self, level: Level) -> Vec<&MockSymbol> {
        let words: Vec<&MockWord> = match level {
            Level::Symbol => return self.symbol().into_iter().collect(),
            Level::Word => self.word().into_iter().collect(),
            Level::TextLine => self.line().map(|l| l.words.iter().collect()).unwrap_or_default(),
            Level::Paragraph => self
                .paragraph()
                .map(|p| p.lines.iter().flat_map(|l| &l.words).collect())
                .unwrap_or_default(),
            Level::Block => self
                .block()
                .map(|b| {
                    b.paragraphs
                        .iter()
                        .flat_map(|p| &p.lines)
                        .flat_map(|l| &l.words)
                        .collect()
                })
                .unwrap_or_default(),
        };
        words.into_iter().flat_map(|w| &w.symbols).collect()
    }
}

fn word_text(word: &MockWord) -> String {
    word.symbols.iter().filter_map(|s| s.text.as_deref()).collect()
}

fn line_text(line: &MockLine) -> String {
    let words: Vec<String> = line.words.iter().map(word_text).collect();
    format!("{}\n", words.join(" "))
}

fn paragraph_text(para: &MockParagraph) -> String {
    para.lines.iter().map(line_text).collect()
}

impl ResultCursor for MockCursor {
    fn is_empty(&self, level: Level) -> bool {
        let Some(path) = self.path() else {
            return true;
        };
        if path[level as usize].is_none() {
            return true;
        }
        level == Level::Symbol && self.symbol().is_some_and(|s| s.text.is_none())
    }

    fn is_at_final_element(&self, enclosing: Level, element: Level) -> bool {
        let Some(current) = self.path() else {
            return true;
        };
        let depth = enclosing as usize;
        self.next_at(element)
            .map_or(true, |next| self.doc.positions[next][..=depth] != current[..=depth])
    }

    fn advance(&mut self, level: Level) -> bool {
        match self.next_at(level) {
            Some(next) => {
                self.pos = next;
                true
            }
            None => {
                self.pos = self.doc.positions.len();
                false
            }
        }
    }

    fn bounding_box(&self, level: Level) -> Option<BoundingBox> {
        match level {
            Level::Block => self.block().map(|b| b.bbox),
            Level::Paragraph => self.paragraph().map(|p| p.bbox),
            Level::TextLine => self.line().map(|l| l.bbox),
            Level::Word => self.word().map(|w| w.bbox),
            Level::Symbol => self.symbol().map(|s| s.bbox),
        }
    }

    fn text(&self, level: Level) -> Option<String> {
        match level {
            Level::Symbol => self.symbol()?.text.clone(),
            Level::Word => Some(word_text(self.word()?)),
            Level::TextLine => Some(line_text(self.line()?)),
            Level::Paragraph => Some(paragraph_text(self.paragraph()?)),
            Level::Block => {
                let paragraphs: Vec<String> =
                    self.block()?.paragraphs.iter().map(paragraph_text).collect();
                Some(paragraphs.join("\n"))
            }
        }
    }

    fn confidence(&self, level: Level) -> f64 {
        let symbols = self.symbols(level);
        if symbols.is_empty() {
            return 0.0;
        }
        symbols.iter().map(|s| s.confidence).sum::<f64>() / symbols.len() as f64
    }

    fn block_kind(&self) -> BlockKind {
        self.block().map_or(BlockKind::Unknown, |b| b.kind)
    }

    fn orientation(&self) -> Option<BlockOrientation> {
        self.block()?.orientation
    }

    fn word_direction(&self) -> WordDirection {
        match self.word() {
            Some(w) if w.rtl => WordDirection::RightToLeft,
            _ => WordDirection::LeftToRight,
        }
    }

    fn symbol_choices(&self) -> Vec<(String, f64)> {
        self.symbol().map(|s| s.choices.clone()).unwrap_or_default()
    }
}

/// Engine that records every settings snapshot it is given
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub applied: Vec<EngineSettings>,
    /// Language the engine refuses to load
    pub reject_language: Option<String>,
}

impl ConfigurableEngine for RecordingEngine {
    fn apply_settings(&mut self, settings: &EngineSettings) -> anyhow::Result<()> {
        if settings.language.is_some() && settings.language == self.reject_language {
            anyhow::bail!("language '{}' is not installed", settings.language.as_deref().unwrap_or_default());
        }
        self.applied.push(settings.clone());
        Ok(())
    }
}
