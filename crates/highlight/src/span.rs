//! Highlight output: style tags and spans.

use std::fmt;
use std::str::FromStr;

/// Semantic category of a span. Renderers map tags to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Default,
    Keyword,
    String,
    Comment,
    Number,
    Function,
    Class,
    Operator,
    Builtin,
    Error,
    Decorator,
    Type,
    Constant,
    Tag,
    Attribute,
    Property,
    Variable,
    Punctuation,
    Heading,
    Emphasis,
}

impl StyleTag {
    pub const ALL: &'static [StyleTag] = &[
        StyleTag::Default,
        StyleTag::Keyword,
        StyleTag::String,
        StyleTag::Comment,
        StyleTag::Number,
        StyleTag::Function,
        StyleTag::Class,
        StyleTag::Operator,
        StyleTag::Builtin,
        StyleTag::Error,
        StyleTag::Decorator,
        StyleTag::Type,
        StyleTag::Constant,
        StyleTag::Tag,
        StyleTag::Attribute,
        StyleTag::Property,
        StyleTag::Variable,
        StyleTag::Punctuation,
        StyleTag::Heading,
        StyleTag::Emphasis,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Default => "default",
            StyleTag::Keyword => "keyword",
            StyleTag::String => "string",
            StyleTag::Comment => "comment",
            StyleTag::Number => "number",
            StyleTag::Function => "function",
            StyleTag::Class => "class",
            StyleTag::Operator => "operator",
            StyleTag::Builtin => "builtin",
            StyleTag::Error => "error",
            StyleTag::Decorator => "decorator",
            StyleTag::Type => "type",
            StyleTag::Constant => "constant",
            StyleTag::Tag => "tag",
            StyleTag::Attribute => "attribute",
            StyleTag::Property => "property",
            StyleTag::Variable => "variable",
            StyleTag::Punctuation => "punctuation",
            StyleTag::Heading => "heading",
            StyleTag::Emphasis => "emphasis",
        }
    }

    /// Map a tree-sitter capture name (`function.method`, `string.special`...)
    /// onto a tag by its most specific known prefix.
    pub fn from_capture(name: &str) -> StyleTag {
        match name {
            "constant.builtin" | "variable.builtin" | "function.builtin" | "type.builtin" => {
                return StyleTag::Builtin;
            }
            "constructor" => return StyleTag::Class,
            "escape" => return StyleTag::String,
            "label" => return StyleTag::Constant,
            "punctuation.special" => return StyleTag::Operator,
            "text.title" => return StyleTag::Heading,
            "text.emphasis" | "text.strong" => return StyleTag::Emphasis,
            _ => {}
        }

        let head = name.split('.').next().unwrap_or(name);
        match head {
            "keyword" => StyleTag::Keyword,
            "string" => StyleTag::String,
            "comment" => StyleTag::Comment,
            "number" => StyleTag::Number,
            "function" => StyleTag::Function,
            "operator" => StyleTag::Operator,
            "type" => StyleTag::Type,
            "constant" => StyleTag::Constant,
            "tag" => StyleTag::Tag,
            "attribute" => StyleTag::Attribute,
            "property" => StyleTag::Property,
            "variable" => StyleTag::Variable,
            "punctuation" => StyleTag::Punctuation,
            _ => StyleTag::Default,
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("Unknown style tag: {}", s))
    }
}

/// Styled region of the highlighted text, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledSpan {
    pub start: usize,
    pub len: usize,
    pub tag: StyleTag,
}

impl StyledSpan {
    pub fn new(start: usize, len: usize, tag: StyleTag) -> Self {
        Self { start, len, tag }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Slice of `text` this span covers
    pub fn text<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end())
    }
}

/// Check that spans are ordered, non-overlapping, non-empty and on char
/// boundaries of `text`.
pub fn spans_are_well_formed(spans: &[StyledSpan], text: &str) -> bool {
    let mut cursor = 0;
    for span in spans {
        if span.len == 0 || span.start < cursor || span.end() > text.len() {
            return false;
        }
        if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end()) {
            return false;
        }
        cursor = span.end();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip_names() {
        for tag in StyleTag::ALL {
            assert_eq!(tag.as_str().parse::<StyleTag>(), Ok(*tag));
        }
        assert!("sparkly".parse::<StyleTag>().is_err());
    }

    #[test]
    fn test_capture_names() {
        assert_eq!(StyleTag::from_capture("function.method"), StyleTag::Function);
        assert_eq!(StyleTag::from_capture("string.special"), StyleTag::String);
        assert_eq!(StyleTag::from_capture("variable.builtin"), StyleTag::Builtin);
        assert_eq!(StyleTag::from_capture("constructor"), StyleTag::Class);
        assert_eq!(StyleTag::from_capture("embedded"), StyleTag::Default);
    }

    #[test]
    fn test_well_formed() {
        let text = "let x = 1;";
        let ok = [
            StyledSpan::new(0, 3, StyleTag::Keyword),
            StyledSpan::new(8, 1, StyleTag::Number),
        ];
        assert!(spans_are_well_formed(&ok, text));

        let overlapping = [
            StyledSpan::new(0, 3, StyleTag::Keyword),
            StyledSpan::new(2, 2, StyleTag::Number),
        ];
        assert!(!spans_are_well_formed(&overlapping, text));

        let past_end = [StyledSpan::new(8, 5, StyleTag::Number)];
        assert!(!spans_are_well_formed(&past_end, text));
    }
}
