//! Bottom-up text aggregation
//!
//! Recomputes the best text result of every text-bearing element above the
//! recognition level from its children:
//!
//! | element | from | separator |
//! |---|---|---|
//! | word | glyphs (only when recognizing glyphs) | none |
//! | line | words (when recognizing words or glyphs) | space |
//! | region, cell | lines (below region level) | newline, or none for joined words |
//! | region, table, cell | sub-regions / cells (always) | newline, or none for joined regions |
//!
//! Confidence is the mean of the children's confidences.

use crate::model::{
    is_joined, ElementKind, JoinRelation, LayoutElement, Page, ReadingDirection, RegionKind,
    TextLevel, TextLineOrder, TextResult,
};
use crate::reading_order::{index_reading_order, ordered_children, ReadingOrderNode};
use rustc_hash::FxHashMap;

/// Aggregate text from `target` level upward through the whole page.
///
/// With `overwrite` unset, elements that already carry text keep it (and
/// still feed their existing text into their parent).
pub fn aggregate(page: &mut Page, target: TextLevel, overwrite: bool) {
    let Page {
        regions,
        reading_order,
        relations,
        reading_direction,
        line_order,
        ..
    } = page;

    let index = reading_order
        .as_ref()
        .map(index_reading_order)
        .unwrap_or_default();
    let aggregator = Aggregator {
        target,
        overwrite,
        relations: relations.as_slice(),
        reading_order: &index,
    };
    let inherited = Flow {
        direction: *reading_direction,
        line_order: *line_order,
    };
    for region in regions.iter_mut() {
        aggregator.visit(region, inherited);
    }
}

/// Reading direction and line order in effect for an element
#[derive(Debug, Clone, Copy)]
struct Flow {
    direction: Option<ReadingDirection>,
    line_order: Option<TextLineOrder>,
}

impl Flow {
    /// Explicit settings on `element` override inherited ones
    fn refine(self, element: &LayoutElement) -> Self {
        Self {
            direction: element.reading_direction.or(self.direction),
            line_order: element.line_order.or(self.line_order),
        }
    }

    fn reverses_children(self) -> bool {
        self.direction.is_some_and(ReadingDirection::is_reversed)
    }

    fn reverses_lines(self) -> bool {
        self.line_order.is_some_and(TextLineOrder::is_reversed)
    }
}

/// One child's contribution, followed by the separator to the next one
struct Piece {
    text: String,
    confidence: f64,
    separator: &'static str,
}

struct Aggregator<'a> {
    target: TextLevel,
    overwrite: bool,
    relations: &'a [JoinRelation],
    reading_order: &'a FxHashMap<&'a str, &'a ReadingOrderNode>,
}

impl Aggregator<'_> {
    fn visit(&self, element: &mut LayoutElement, inherited: Flow) {
        let flow = inherited.refine(element);
        for child in &mut element.children {
            self.visit(child, flow);
        }
        if !element.kind.is_text_bearing() {
            return;
        }

        let aggregated = match element.kind {
            ElementKind::Word if self.target >= TextLevel::Glyph => {
                Some(self.concatenate(element, flow, ""))
            }
            ElementKind::Line if self.target >= TextLevel::Word => {
                Some(self.concatenate(element, flow, " "))
            }
            ElementKind::Region(_) | ElementKind::Table | ElementKind::Cell => {
                if element.children.iter().any(is_sub_region) {
                    Some(self.from_sub_regions(element))
                } else if self.target >= TextLevel::Line {
                    Some(self.from_lines(element, flow))
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some((text, confidence)) = aggregated {
            if self.overwrite || element.text_results.is_empty() {
                element.text_results = vec![TextResult::new(text, confidence)];
            }
        }
    }

    /// Words from glyphs, lines from words
    fn concatenate(
        &self,
        element: &LayoutElement,
        flow: Flow,
        separator: &'static str,
    ) -> (String, f64) {
        let mut pieces: Vec<Piece> = element
            .children
            .iter()
            .map(|child| contribution(child, separator))
            .collect();
        if flow.reverses_children() {
            pieces.reverse();
        }
        combine(&element.id, &pieces)
    }

    fn from_lines(&self, element: &LayoutElement, flow: Flow) -> (String, f64) {
        let mut lines: Vec<&LayoutElement> = element
            .children
            .iter()
            .filter(|child| child.kind == ElementKind::Line)
            .collect();
        if flow.reverses_lines() {
            lines.reverse();
        }

        let pieces: Vec<Piece> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let fused = lines.get(i + 1).is_some_and(|next| {
                    match (line.children.last(), next.children.first()) {
                        (Some(last), Some(first)) => {
                            is_joined(self.relations, &last.id, &first.id)
                        }
                        _ => false,
                    }
                });
                contribution(line, if fused { "" } else { "\n" })
            })
            .collect();
        combine(&element.id, &pieces)
    }

    fn from_sub_regions(&self, element: &LayoutElement) -> (String, f64) {
        let mut members: Vec<&LayoutElement> = element
            .children
            .iter()
            .filter(|child| is_sub_region(child))
            .collect();
        if let Some(order) = self.explicit_order(&element.id, &members) {
            members.sort_by_key(|member| {
                order
                    .get(member.id.as_str())
                    .copied()
                    .unwrap_or(usize::MAX)
            });
        }

        let pieces: Vec<Piece> = members
            .iter()
            .enumerate()
            .map(|(i, member)| {
                let fused = members
                    .get(i + 1)
                    .is_some_and(|next| is_joined(self.relations, &member.id, &next.id));
                contribution(member, if fused { "" } else { "\n" })
            })
            .collect();
        combine(&element.id, &pieces)
    }

    /// Position of each member in the container's ordered reading-order group,
    /// if that group covers every member
    fn explicit_order(
        &self,
        container: &str,
        members: &[&LayoutElement],
    ) -> Option<FxHashMap<&str, usize>> {
        let node = self.reading_order.get(container)?;
        if !node.is_ordered() {
            return None;
        }
        let order: FxHashMap<&str, usize> = ordered_children(node)
            .into_iter()
            .filter_map(ReadingOrderNode::region_ref)
            .enumerate()
            .map(|(position, region_ref)| (region_ref, position))
            .collect();
        members
            .iter()
            .all(|member| order.contains_key(member.id.as_str()))
            .then_some(order)
    }
}

fn is_sub_region(element: &LayoutElement) -> bool {
    matches!(
        element.kind,
        ElementKind::Region(RegionKind::Text) | ElementKind::Table | ElementKind::Cell
    )
}

/// Existing best result, or empty text with full confidence
fn contribution(element: &LayoutElement, separator: &'static str) -> Piece {
    element.text_results.first().map_or(
        Piece {
            text: String::new(),
            confidence: 1.0,
            separator,
        },
        |best| Piece {
            text: best.text.clone(),
            confidence: best.confidence,
            separator,
        },
    )
}

fn combine(owner: &str, pieces: &[Piece]) -> (String, f64) {
    if pieces.is_empty() {
        log::warn!("{owner} has no children to aggregate text from");
        return (String::new(), 0.0);
    }
    let mut text = String::new();
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 {
            text.push_str(pieces[i - 1].separator);
        }
        text.push_str(&piece.text);
    }
    let confidence = pieces.iter().map(|p| p.confidence).sum::<f64>() / pieces.len() as f64;
    (text, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrlayout_geometry::BoundingBox;

    fn element(id: &str, kind: ElementKind) -> LayoutElement {
        let polygon = BoundingBox::new(0.0, 0.0, 10.0, 10.0).to_polygon().unwrap();
        LayoutElement::new(id, kind, polygon)
    }

    #[test]
    fn test_combine_mean_and_separators() {
        let pieces = [
            Piece { text: "a".into(), confidence: 0.5, separator: "-" },
            Piece { text: "b".into(), confidence: 1.0, separator: "+" },
        ];
        let (text, confidence) = combine("x", &pieces);
        assert_eq!(text, "a-b");
        assert!((confidence - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_combine_empty() {
        assert_eq!(combine("x", &[]), (String::new(), 0.0));
    }

    #[test]
    fn test_pristine_child_contributes_full_confidence() {
        let piece = contribution(&element("w", ElementKind::Word), " ");
        assert_eq!(piece.text, "");
        assert!((piece.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flow_refine_prefers_element() {
        let inherited = Flow {
            direction: Some(ReadingDirection::RightToLeft),
            line_order: Some(TextLineOrder::BottomToTop),
        };
        let line = element("l", ElementKind::Line)
            .with_reading_direction(ReadingDirection::LeftToRight);
        let flow = inherited.refine(&line);
        assert!(!flow.reverses_children());
        assert!(flow.reverses_lines());
    }
}
