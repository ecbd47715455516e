use std::collections::VecDeque;
use std::ops::Range;
use std::time::Duration;

use chango_logger as logger;

use crate::clock::{Clock, SystemClock};
use crate::operation::EditOperation;

/// Default coalescing window in milliseconds
pub const DEFAULT_COALESCE_WINDOW_MS: u64 = 700;

/// Default maximum number of undo entries
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Error returned by undo/redo
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    EmptyHistory,
    #[error("nothing to redo")]
    EmptyRedo,
    #[error("edit range {start}..{end} exceeds buffer length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Buffer that history can apply operations to. Offsets are char indices.
pub trait EditTarget {
    fn len_chars(&self) -> usize;
    fn insert_at(&mut self, char_idx: usize, text: &str);
    fn remove_range(&mut self, range: Range<usize>);
}

impl EditTarget for String {
    fn len_chars(&self) -> usize {
        self.chars().count()
    }

    fn insert_at(&mut self, char_idx: usize, text: &str) {
        let byte_idx = char_to_byte(self, char_idx);
        self.insert_str(byte_idx, text);
    }

    fn remove_range(&mut self, range: Range<usize>) {
        let start = char_to_byte(self, range.start);
        let end = char_to_byte(self, range.end);
        self.replace_range(start..end, "");
    }
}

fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(s.len())
}

/// History tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Edits closer together than this may coalesce
    pub coalesce_window: Duration,
    /// Maximum number of undo entries kept
    pub max_depth: usize,
}

impl HistoryConfig {
    pub fn new(coalesce_window: Duration, max_depth: usize) -> Self {
        Self {
            coalesce_window,
            max_depth,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            coalesce_window: Duration::from_millis(DEFAULT_COALESCE_WINDOW_MS),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Linear undo/redo history for a single buffer.
///
/// Runs of contiguous typing or backspacing that arrive within the coalescing
/// window collapse into one entry. Any new edit drops the redo stack.
#[derive(Debug)]
pub struct EditHistory {
    /// Done entries, oldest first
    undo_stack: VecDeque<EditOperation>,
    /// Undone entries, most recent last
    redo_stack: Vec<EditOperation>,
    config: HistoryConfig,
    clock: Box<dyn Clock>,
    /// Top undo entry must not absorb further edits
    sealed: bool,
}

impl EditHistory {
    /// Create history with default settings and the system clock
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: HistoryConfig, clock: impl Clock + 'static) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            config,
            clock: Box::new(clock),
            sealed: false,
        }
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    /// Record an edit the host has already applied to the buffer.
    ///
    /// The redo stack is always dropped, even for an empty edit, which is
    /// otherwise not stored. The operation is restamped with the history clock.
    pub fn record(&mut self, mut operation: EditOperation) {
        self.redo_stack.clear();
        if operation.is_noop() {
            return;
        }
        operation.set_timestamp(self.clock.now());

        if !self.sealed {
            if let Some(last) = self.undo_stack.back_mut() {
                if last.can_merge_with(&operation, self.config.coalesce_window) {
                    last.merge(operation);
                    return;
                }
            }
        }
        self.sealed = false;

        self.undo_stack.push_back(operation);

        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Close the current run so the next edit starts a new entry
    /// (cursor jump, focus loss, save).
    pub fn break_coalescing(&mut self) {
        self.sealed = true;
    }

    /// Revert the most recent entry. Returns the range now holding the restored text.
    pub fn undo<T: EditTarget + ?Sized>(
        &mut self,
        target: &mut T,
    ) -> Result<Range<usize>, HistoryError> {
        let operation = self.undo_stack.back().ok_or(HistoryError::EmptyHistory)?;

        let inserted = operation.inserted_range();
        check_bounds(&inserted, target.len_chars())?;

        target.remove_range(inserted);
        target.insert_at(operation.offset(), operation.removed());
        let affected = operation.removed_range();

        if let Some(operation) = self.undo_stack.pop_back() {
            self.redo_stack.push(operation);
        }
        self.sealed = true;
        Ok(affected)
    }

    /// Re-apply the most recently undone entry. Returns the range now holding the inserted text.
    pub fn redo<T: EditTarget + ?Sized>(
        &mut self,
        target: &mut T,
    ) -> Result<Range<usize>, HistoryError> {
        let operation = self.redo_stack.last().ok_or(HistoryError::EmptyRedo)?;

        let removed = operation.removed_range();
        check_bounds(&removed, target.len_chars())?;

        target.remove_range(removed);
        target.insert_at(operation.offset(), operation.inserted());
        let affected = operation.inserted_range();

        if let Some(operation) = self.redo_stack.pop() {
            self.undo_stack.push_back(operation);
        }
        self.sealed = true;
        Ok(affected)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo entries
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo entries
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks (document loaded, reset or closed)
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.sealed = false;
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn check_bounds(range: &Range<usize>, len: usize) -> Result<(), HistoryError> {
    if range.end > len {
        logger::warn(format!(
            "History entry {}..{} no longer fits buffer of {} chars",
            range.start, range.end, len
        ));
        return Err(HistoryError::OutOfBounds {
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(())
}
