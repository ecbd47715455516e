use anyhow::{Context, Result};
use ropey::Rope;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::history::EditTarget;
use crate::operation::{DeleteDirection, EditOperation};
use crate::LineEnding;

/// Text buffer based on Rope for efficient work with large files.
///
/// Mutating methods return the [`EditOperation`] describing what changed,
/// for the host to hand to an [`EditHistory`](crate::EditHistory).
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// Rope structure for storing text
    rope: Rope,
    /// File path (if exists)
    file_path: Option<PathBuf>,
    /// Modified flag
    modified: bool,
    /// Line ending type (for saving)
    line_ending: LineEnding,
}

impl TextBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_rope(Rope::new())
    }

    /// Create buffer holding `text`
    pub fn from_text(text: &str) -> Self {
        Self::from_rope(Rope::from_str(text))
    }

    fn from_rope(rope: Rope) -> Self {
        Self {
            rope,
            file_path: None,
            modified: false,
            line_ending: LineEnding::LF,
        }
    }

    /// Load file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let line_ending = if contents.contains("\r\n") {
            LineEnding::CRLF
        } else {
            LineEnding::LF
        };

        // Keep a single '\n' representation in memory
        let rope = Rope::from_str(&contents.replace("\r\n", "\n"));

        Ok(Self {
            rope,
            file_path: Some(path.to_path_buf()),
            modified: false,
            line_ending,
        })
    }

    /// Save file
    pub fn save(&mut self) -> Result<()> {
        if let Some(path) = self.file_path.clone() {
            self.save_to(&path)
        } else {
            anyhow::bail!("No file path set")
        }
    }

    /// Save to specified file, restoring the original line endings
    pub fn save_to<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.rope.to_string();
        let contents = match self.line_ending {
            LineEnding::LF => text,
            LineEnding::CRLF => text.replace('\n', "\r\n"),
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Get line count
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get line by index
    pub fn line(&self, index: usize) -> Option<String> {
        if index < self.line_count() {
            Some(self.rope.line(index).to_string())
        } else {
            None
        }
    }

    /// Get all text
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text in a char range
    pub fn slice(&self, range: Range<usize>) -> Result<String> {
        self.check_range(&range)?;
        Ok(self.rope.slice(range).to_string())
    }

    /// Insert text at a char offset
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<EditOperation> {
        self.check_range(&(char_idx..char_idx))?;
        self.rope.insert(char_idx, text);
        self.modified = true;
        Ok(EditOperation::insert(char_idx, text))
    }

    /// Backspace at `char_idx`. Returns `None` at the start of the buffer.
    pub fn delete_backward(&mut self, char_idx: usize) -> Result<Option<EditOperation>> {
        if char_idx == 0 {
            return Ok(None);
        }
        self.delete_range(char_idx - 1..char_idx, DeleteDirection::Backward)
            .map(Some)
    }

    /// Delete key at `char_idx`. Returns `None` at the end of the buffer.
    pub fn delete_forward(&mut self, char_idx: usize) -> Result<Option<EditOperation>> {
        if char_idx >= self.rope.len_chars() {
            return Ok(None);
        }
        self.delete_range(char_idx..char_idx + 1, DeleteDirection::Forward)
            .map(Some)
    }

    /// Remove a char range
    pub fn delete_range(
        &mut self,
        range: Range<usize>,
        direction: DeleteDirection,
    ) -> Result<EditOperation> {
        let removed = self.slice(range.clone())?;
        self.rope.remove(range.clone());
        self.modified = true;
        Ok(EditOperation::delete(range.start, removed, direction))
    }

    /// Replace a char range with new text as a single operation
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<EditOperation> {
        let removed = self.slice(range.clone())?;
        self.rope.remove(range.clone());
        self.rope.insert(range.start, text);
        self.modified = true;
        Ok(EditOperation::replace(range.start, removed, text))
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        let len = self.rope.len_chars();
        if range.start > range.end || range.end > len {
            anyhow::bail!(
                "Range {}..{} out of bounds for buffer of {} chars",
                range.start,
                range.end,
                len
            );
        }
        Ok(())
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl EditTarget for TextBuffer {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert_at(&mut self, char_idx: usize, text: &str) {
        self.rope.insert(char_idx, text);
        self.modified = true;
    }

    fn remove_range(&mut self, range: Range<usize>) {
        self.rope.remove(range);
        self.modified = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditHistory, EditKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_insert_returns_operation() {
        let mut buffer = TextBuffer::new();
        let op = buffer.insert(0, "hello").unwrap();
        assert_eq!(op.kind(), EditKind::Insert);
        assert_eq!(op.inserted(), "hello");
        assert_eq!(buffer.text(), "hello");
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_delete_at_edges() {
        let mut buffer = TextBuffer::from_text("ab");
        assert!(buffer.delete_backward(0).unwrap().is_none());
        assert!(buffer.delete_forward(2).unwrap().is_none());

        let op = buffer.delete_backward(2).unwrap().unwrap();
        assert_eq!(op.kind(), EditKind::Delete(DeleteDirection::Backward));
        assert_eq!(op.removed(), "b");
        assert_eq!(buffer.text(), "a");
    }

    #[test]
    fn test_out_of_range_is_error() {
        let mut buffer = TextBuffer::from_text("abc");
        assert!(buffer.insert(10, "x").is_err());
        assert!(buffer.replace(2..9, "x").is_err());
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_replace_then_undo() {
        let mut buffer = TextBuffer::from_text("let x = 1;");
        let mut history = EditHistory::new();

        let op = buffer.replace(4..5, "value").unwrap();
        history.record(op);
        assert_eq!(buffer.text(), "let value = 1;");

        assert_eq!(history.undo(&mut buffer), Ok(4..5));
        assert_eq!(buffer.text(), "let x = 1;");
    }

    #[test]
    fn test_typing_with_history() {
        let mut buffer = TextBuffer::new();
        let mut history = EditHistory::new();

        for (i, ch) in "hey".chars().enumerate() {
            let op = buffer.insert(i, &ch.to_string()).unwrap();
            history.record(op);
        }
        let op = buffer.delete_backward(3).unwrap().unwrap();
        history.record(op);

        assert_eq!(buffer.text(), "he");
        assert_eq!(history.undo_depth(), 2);
        history.undo(&mut buffer).unwrap();
        history.undo(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_crlf_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "one\r\ntwo\r\n").unwrap();

        let mut buffer = TextBuffer::from_file(file.path()).unwrap();
        assert_eq!(buffer.line_ending(), LineEnding::CRLF);
        assert_eq!(buffer.text(), "one\ntwo\n");

        buffer.insert(3, "!").unwrap();
        buffer.save().unwrap();

        let saved = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(saved, "one!\r\ntwo\r\n");
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut buffer = TextBuffer::from_text("x");
        assert!(buffer.save().is_err());
    }
}
