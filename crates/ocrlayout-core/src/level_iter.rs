//! Sibling iteration at one engine level
//!
//! The engine's own "advance" can land on structurally empty pseudo-elements
//! (non-text blocks when iterating paragraphs, words without symbols), and its
//! finality test only looks one level up. [`LevelIter`] skips the former and
//! tests finality against every level between the enclosing level and the
//! target.

use crate::engine::{Level, ResultCursor};

/// Iterate the siblings at `level` starting from `cursor`.
///
/// Iteration stops at the last element inside the current `enclosing`
/// element (default: `level.parent()`). At [`Level::Block`] there is no
/// enclosing level and iteration runs until the engine is exhausted.
///
/// Each item is a snapshot of the cursor positioned on one sibling.
pub fn iterate_level<C: ResultCursor>(
    cursor: C,
    level: Level,
    enclosing: Option<Level>,
) -> LevelIter<C> {
    LevelIter {
        cursor,
        level,
        enclosing: enclosing.or_else(|| level.parent()),
        finished: false,
    }
}

/// Iterator returned by [`iterate_level`]
#[derive(Debug, Clone)]
pub struct LevelIter<C> {
    cursor: C,
    level: Level,
    enclosing: Option<Level>,
    finished: bool,
}

impl<C: ResultCursor> LevelIter<C> {
    /// Final element with respect to every level from the enclosing one down
    /// to the target, both included
    fn is_last_sibling(&self) -> bool {
        let Some(enclosing) = self.enclosing else {
            return false;
        };
        let mut current = Some(enclosing);
        while let Some(outer) = current {
            if outer > self.level {
                break;
            }
            if !self.cursor.is_at_final_element(outer, self.level) {
                return false;
            }
            current = outer.child();
        }
        true
    }
}

impl<C: ResultCursor> Iterator for LevelIter<C> {
    type Item = C;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.cursor.is_empty(self.level) {
            self.finished = true;
            return None;
        }
        let snapshot = self.cursor.clone();

        if self.is_last_sibling() || !self.cursor.advance(self.level) {
            self.finished = true;
            return Some(snapshot);
        }
        while self.cursor.is_empty(self.level) && !self.cursor.is_empty(Level::Block) {
            log::debug!("Engine reported an empty {} element, skipping", self.level);
            if !self.cursor.advance(self.level) {
                self.finished = true;
                break;
            }
        }
        Some(snapshot)
    }
}

impl<C: ResultCursor> std::iter::FusedIterator for LevelIter<C> {}
