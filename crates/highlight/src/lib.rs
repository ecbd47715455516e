//! Syntax highlighting for chango.
//!
//! Languages are described by [`LanguageProfile`]s held in a host-owned
//! [`LanguageRegistry`]. [`HighlightDispatcher`] prefers a grammar-aware
//! tree-sitter tokenizer and falls back to line-oriented regex rules when
//! none is available or it fails.

mod definitions;
mod dispatcher;
mod fallback;
mod profile;
mod registry;
mod scheme;
mod span;
mod treesitter;

pub use definitions::{parse_definition, BUNDLED};
pub use dispatcher::HighlightDispatcher;
pub use fallback::fallback_highlight;
pub use profile::{
    LanguageProfile, PreciseTokenizer, RegexRule, RuleOptions, TokenizeError, PLAIN_TEXT,
};
pub use registry::{LanguageRegistry, RegistryError};
pub use scheme::{styled_segments, ColorScheme};
pub use span::{spans_are_well_formed, StyleTag, StyledSpan};
pub use treesitter::{TreeSitterTokenizer, HIGHLIGHT_NAMES, SUPPORTED_LANGUAGES};
