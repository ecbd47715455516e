use std::ops::Range;
use std::time::{Duration, Instant};

/// Which side of the cursor a deletion removed text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDirection {
    /// Backspace: text to the left of the cursor
    Backward,
    /// Delete key: text to the right of the cursor
    Forward,
}

/// Kind of an edit operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insert,
    Delete(DeleteDirection),
    Replace,
}

/// Atomic, reversible change to a buffer.
///
/// Offsets are char indices. `removed` is the text that occupied
/// `offset..offset + removed.chars().count()` before the edit, `inserted`
/// is what occupies `offset..offset + inserted.chars().count()` after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    kind: EditKind,
    offset: usize,
    removed: String,
    inserted: String,
    timestamp: Instant,
}

impl EditOperation {
    /// Text inserted at `offset`
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            offset,
            removed: String::new(),
            inserted: text.into(),
            timestamp: Instant::now(),
        }
    }

    /// Text removed from `offset`
    pub fn delete(offset: usize, removed: impl Into<String>, direction: DeleteDirection) -> Self {
        Self {
            kind: EditKind::Delete(direction),
            offset,
            removed: removed.into(),
            inserted: String::new(),
            timestamp: Instant::now(),
        }
    }

    /// `removed` at `offset` replaced by `inserted`
    pub fn replace(offset: usize, removed: impl Into<String>, inserted: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Replace,
            offset,
            removed: removed.into(),
            inserted: inserted.into(),
            timestamp: Instant::now(),
        }
    }

    /// Override the timestamp, for comparing operations directly with
    /// `can_merge_with`. `EditHistory::record` restamps with its own clock.
    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn kind(&self) -> EditKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn removed(&self) -> &str {
        &self.removed
    }

    pub fn inserted(&self) -> &str {
        &self.inserted
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: Instant) {
        self.timestamp = timestamp;
    }

    /// Range occupied by the removed text before the edit
    pub fn removed_range(&self) -> Range<usize> {
        self.offset..self.offset + self.removed.chars().count()
    }

    /// Range occupied by the inserted text after the edit
    pub fn inserted_range(&self) -> Range<usize> {
        self.offset..self.offset + self.inserted.chars().count()
    }

    /// Operations with nothing removed and nothing inserted are not worth recording.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.inserted.is_empty()
    }

    /// Check whether `next` may be folded into this operation.
    ///
    /// Only forward-typing inserts and backspace runs coalesce. Delete-key
    /// removals, replaces and anything containing a line break stay separate.
    pub fn can_merge_with(&self, next: &EditOperation, window: Duration) -> bool {
        let within_window = next
            .timestamp
            .checked_duration_since(self.timestamp)
            .is_some_and(|elapsed| elapsed < window);
        if !within_window {
            return false;
        }

        match (self.kind, next.kind) {
            (EditKind::Insert, EditKind::Insert) => {
                !self.inserted.contains('\n')
                    && !next.inserted.contains('\n')
                    && next.offset == self.inserted_range().end
            }
            (
                EditKind::Delete(DeleteDirection::Backward),
                EditKind::Delete(DeleteDirection::Backward),
            ) => {
                !self.removed.contains('\n')
                    && !next.removed.contains('\n')
                    && next.removed_range().end == self.offset
            }
            _ => false,
        }
    }

    /// Fold `next` into this operation. Callers check `can_merge_with` first.
    pub fn merge(&mut self, next: EditOperation) {
        match next.kind {
            EditKind::Insert => self.inserted.push_str(&next.inserted),
            EditKind::Delete(DeleteDirection::Backward) => {
                // Backspace grows the run to the left
                self.offset = next.offset;
                self.removed.insert_str(0, &next.removed);
            }
            EditKind::Delete(DeleteDirection::Forward) | EditKind::Replace => {}
        }
        self.timestamp = next.timestamp;
    }
}
