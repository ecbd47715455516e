//! Language profiles: detection data plus highlighting rules.

use regex::{Regex, RegexBuilder};
use std::fmt;
use std::sync::Arc;

use crate::span::{StyleTag, StyledSpan};

/// Identifier of the plain-text language
pub const PLAIN_TEXT: &str = "text";

/// Failure inside a precise tokenizer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("grammar unavailable: {0}")]
    Grammar(String),
    #[error("tokenizer failed: {0}")]
    Failed(String),
    #[error("tokenizer panicked")]
    Panicked,
    #[error("tokenizer produced malformed spans")]
    MalformedOutput,
}

/// Grammar-aware tokenizer for one language.
pub trait PreciseTokenizer: fmt::Debug + Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Produce ordered, non-overlapping spans over `text`
    fn tokenize(&self, text: &str) -> Result<Vec<StyledSpan>, TokenizeError>;
}

/// Regex compilation options for a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOptions {
    /// Match over the whole text instead of line by line
    pub multiline: bool,
    pub case_insensitive: bool,
    /// Only style this capture group of each match
    pub capture_group: Option<usize>,
}

/// A single regex highlighting rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    style: StyleTag,
    options: RuleOptions,
}

impl RegexRule {
    pub fn new(pattern: &str, style: StyleTag) -> Result<Self, regex::Error> {
        Self::with_options(pattern, style, RuleOptions::default())
    }

    pub fn with_options(
        pattern: &str,
        style: StyleTag,
        options: RuleOptions,
    ) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(options.case_insensitive)
            .multi_line(options.multiline)
            .dot_matches_new_line(options.multiline)
            .build()?;
        Ok(Self {
            regex,
            style,
            options,
        })
    }

    /// Rule matching any of `words` as a whole word
    pub fn words<S: AsRef<str>>(
        words: &[S],
        style: StyleTag,
        case_insensitive: bool,
    ) -> Result<Self, regex::Error> {
        let alternation = words
            .iter()
            .map(|w| regex::escape(w.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        Self::with_options(
            &format!(r"\b(?:{})\b", alternation),
            style,
            RuleOptions {
                case_insensitive,
                ..RuleOptions::default()
            },
        )
    }

    pub fn style(&self) -> StyleTag {
        self.style
    }

    pub fn is_multiline(&self) -> bool {
        self.options.multiline
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Byte ranges this rule styles within `haystack`
    pub(crate) fn match_ranges<'h>(
        &'h self,
        haystack: &'h str,
    ) -> Box<dyn Iterator<Item = (usize, usize)> + 'h> {
        match self.options.capture_group {
            Some(group) => Box::new(
                self.regex
                    .captures_iter(haystack)
                    .filter_map(move |caps| caps.get(group))
                    .map(|m| (m.start(), m.end())),
            ),
            None => Box::new(self.regex.find_iter(haystack).map(|m| (m.start(), m.end()))),
        }
    }
}

/// Static description of a supported language.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    id: String,
    name: String,
    aliases: Vec<String>,
    /// Lowercase suffixes without the dot; entries starting with '.' match
    /// a whole file name (".gitignore")
    extensions: Vec<String>,
    /// In precedence order
    rules: Vec<RegexRule>,
    precise: Option<Arc<dyn PreciseTokenizer>>,
}

impl LanguageProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
            extensions: Vec::new(),
            rules: Vec::new(),
            precise: None,
        }
    }

    /// Profile with no rules; everything renders in the default style
    pub fn plain_text() -> Self {
        Self::new(PLAIN_TEXT, "Plain Text").with_extensions(["txt", "text", "log"])
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|a| a.into().to_lowercase()));
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions
            .extend(extensions.into_iter().map(|e| e.into().to_lowercase()));
        self
    }

    pub fn with_rule(mut self, rule: RegexRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_precise(mut self, tokenizer: Arc<dyn PreciseTokenizer>) -> Self {
        self.precise = Some(tokenizer);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }

    pub fn has_precise_tokenizer(&self) -> bool {
        self.precise.is_some()
    }

    pub fn precise_tokenizer(&self) -> Option<&Arc<dyn PreciseTokenizer>> {
        self.precise.as_ref()
    }

    /// Check whether `file_name` (already lowercased) belongs to this language
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            if ext.starts_with('.') {
                file_name == ext
            } else {
                file_name
                    .strip_suffix(ext.as_str())
                    .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
            }
        })
    }
}
