//! Precise tokenizers backed by statically linked tree-sitter grammars.

use std::sync::{Arc, OnceLock};
use tree_sitter_highlight::{HighlightConfiguration, HighlightEvent, Highlighter};

use crate::profile::{PreciseTokenizer, TokenizeError};
use crate::span::{StyleTag, StyledSpan};

/// Standard highlight categories used by tree-sitter.
pub const HIGHLIGHT_NAMES: &[&str] = &[
    "attribute",
    "comment",
    "constant",
    "constant.builtin",
    "constructor",
    "function",
    "function.builtin",
    "function.method",
    "keyword",
    "label",
    "number",
    "operator",
    "property",
    "punctuation",
    "punctuation.bracket",
    "punctuation.delimiter",
    "punctuation.special",
    "string",
    "string.special",
    "tag",
    "text.title",
    "text.emphasis",
    "text.strong",
    "type",
    "type.builtin",
    "variable",
    "variable.builtin",
    "variable.parameter",
    "escape",
    "embedded",
];

/// Grammar and queries for one language
#[derive(Clone, Copy)]
struct Grammar {
    language: fn() -> tree_sitter::Language,
    highlights: &'static str,
    injections: &'static str,
}

/// Languages with a bundled grammar
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "rust",
    "python",
    "go",
    "javascript",
    "typescript",
    "c",
    "cpp",
    "java",
    "ruby",
    "php",
    "html",
    "css",
    "json",
    "toml",
    "yaml",
    "bash",
    "markdown",
];

fn grammar_for(language_id: &str) -> Option<Grammar> {
    let grammar = match language_id {
        "rust" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_rust::LANGUAGE.into() },
            highlights: tree_sitter_rust::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "python" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_python::LANGUAGE.into() },
            highlights: tree_sitter_python::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "go" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_go::LANGUAGE.into() },
            highlights: tree_sitter_go::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "javascript" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_javascript::LANGUAGE.into() },
            highlights: tree_sitter_javascript::HIGHLIGHT_QUERY,
            injections: tree_sitter_javascript::INJECTIONS_QUERY,
        },
        "typescript" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into() },
            highlights: tree_sitter_typescript::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "c" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_c::LANGUAGE.into() },
            highlights: tree_sitter_c::HIGHLIGHT_QUERY,
            injections: "",
        },
        "cpp" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_cpp::LANGUAGE.into() },
            highlights: tree_sitter_cpp::HIGHLIGHT_QUERY,
            injections: "",
        },
        "java" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_java::LANGUAGE.into() },
            highlights: tree_sitter_java::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "ruby" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_ruby::LANGUAGE.into() },
            highlights: tree_sitter_ruby::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "php" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_php::LANGUAGE_PHP.into() },
            highlights: tree_sitter_php::HIGHLIGHTS_QUERY,
            injections: tree_sitter_php::INJECTIONS_QUERY,
        },
        "html" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_html::LANGUAGE.into() },
            highlights: tree_sitter_html::HIGHLIGHTS_QUERY,
            injections: tree_sitter_html::INJECTIONS_QUERY,
        },
        "css" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_css::LANGUAGE.into() },
            highlights: tree_sitter_css::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "json" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_json::LANGUAGE.into() },
            highlights: tree_sitter_json::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "toml" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_toml_ng::LANGUAGE.into() },
            highlights: tree_sitter_toml_ng::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "yaml" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_yaml::LANGUAGE.into() },
            highlights: tree_sitter_yaml::HIGHLIGHTS_QUERY,
            injections: "",
        },
        "bash" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_bash::LANGUAGE.into() },
            highlights: tree_sitter_bash::HIGHLIGHT_QUERY,
            injections: "",
        },
        // Block grammar only; inline markup stays unstyled
        "markdown" => Grammar {
            language: || -> tree_sitter::Language { tree_sitter_md::LANGUAGE.into() },
            highlights: tree_sitter_md::HIGHLIGHT_QUERY_BLOCK,
            injections: tree_sitter_md::INJECTION_QUERY_BLOCK,
        },
        _ => return None,
    };
    Some(grammar)
}

/// Tree-sitter tokenizer for one language.
///
/// The highlight configuration is compiled on first use; a grammar whose
/// queries fail to compile reports `TokenizeError::Grammar` on every call.
pub struct TreeSitterTokenizer {
    language_id: &'static str,
    grammar: Grammar,
    config: OnceLock<Result<HighlightConfiguration, String>>,
}

impl std::fmt::Debug for TreeSitterTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSitterTokenizer")
            .field("language_id", &self.language_id)
            .field("compiled", &self.config.get().is_some())
            .finish()
    }
}

impl TreeSitterTokenizer {
    /// Tokenizer for a language with a bundled grammar
    pub fn for_language(language_id: &str) -> Option<Self> {
        let language_id = SUPPORTED_LANGUAGES
            .iter()
            .copied()
            .find(|id| *id == language_id)?;
        let grammar = grammar_for(language_id)?;
        Some(Self {
            language_id,
            grammar,
            config: OnceLock::new(),
        })
    }

    /// Shared handle suitable for attaching to a profile
    pub fn shared(language_id: &str) -> Option<Arc<dyn PreciseTokenizer>> {
        Self::for_language(language_id).map(|t| Arc::new(t) as Arc<dyn PreciseTokenizer>)
    }

    fn config(&self) -> Result<&HighlightConfiguration, TokenizeError> {
        self.config
            .get_or_init(|| {
                let mut config = HighlightConfiguration::new(
                    (self.grammar.language)(),
                    self.language_id,
                    self.grammar.highlights,
                    self.grammar.injections,
                    "",
                )
                .map_err(|e| format!("{:?}", e))?;
                config.configure(HIGHLIGHT_NAMES);
                Ok(config)
            })
            .as_ref()
            .map_err(|e| TokenizeError::Grammar(format!("{}: {}", self.language_id, e)))
    }
}

impl PreciseTokenizer for TreeSitterTokenizer {
    fn name(&self) -> &str {
        "tree-sitter"
    }

    fn tokenize(&self, text: &str) -> Result<Vec<StyledSpan>, TokenizeError> {
        let config = self.config()?;
        let source = text.as_bytes();

        let mut highlighter = Highlighter::new();
        let events = highlighter
            .highlight(config, source, None, |_| None)
            .map_err(|e| TokenizeError::Failed(format!("{:?}", e)))?;

        let mut spans: Vec<StyledSpan> = Vec::new();
        let mut stack: Vec<StyleTag> = Vec::new();

        for event in events {
            match event.map_err(|e| TokenizeError::Failed(format!("{:?}", e)))? {
                HighlightEvent::Source { start, end } => {
                    let Some(&tag) = stack.last() else {
                        continue;
                    };
                    if tag == StyleTag::Default || start >= end {
                        continue;
                    }
                    match spans.last_mut() {
                        // Neighbouring captures with the same tag read as one token
                        Some(last) if last.tag == tag && last.end() == start => {
                            last.len += end - start;
                        }
                        _ => spans.push(StyledSpan::new(start, end - start, tag)),
                    }
                }
                HighlightEvent::HighlightStart(highlight) => {
                    let name = HIGHLIGHT_NAMES.get(highlight.0).copied().unwrap_or("");
                    stack.push(StyleTag::from_capture(name));
                }
                HighlightEvent::HighlightEnd => {
                    stack.pop();
                }
            }
        }

        Ok(spans)
    }
}
