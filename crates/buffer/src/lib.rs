//! Text buffer and edit history for chango.
//!
//! Provides rope-backed text storage along with a bounded undo/redo
//! history that coalesces runs of typing and deleting.

mod buffer;
mod clock;
mod history;
mod operation;

pub use buffer::TextBuffer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use history::{
    EditHistory, EditTarget, HistoryConfig, HistoryError, DEFAULT_COALESCE_WINDOW_MS,
    DEFAULT_MAX_DEPTH,
};
pub use operation::{DeleteDirection, EditKind, EditOperation};

/// Line ending type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    LF, // Unix \n
    CRLF, // Windows \r\n
}
