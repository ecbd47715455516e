//! Color schemes mapping style tags to terminal styles.

use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;

use crate::span::{StyleTag, StyledSpan};

/// Available color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Dark,
    Light,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(ColorScheme::Dark),
            "light" => Ok(ColorScheme::Light),
            _ => Err(format!("Unknown color scheme: {}", s)),
        }
    }
}

impl ColorScheme {
    /// Convert a style tag to a ratatui Style
    pub fn style_for(self, tag: StyleTag) -> Style {
        if tag == StyleTag::Default {
            return Style::default();
        }

        let (fg, modifiers) = match self {
            ColorScheme::Dark => color_for_tag_dark(tag),
            ColorScheme::Light => color_for_tag_light(tag),
        };

        let mut style = Style::default().fg(fg);
        for modifier in modifiers {
            style = style.add_modifier(modifier);
        }
        style
    }
}

/// Dark scheme (VS Code Dark+ inspired)
fn color_for_tag_dark(tag: StyleTag) -> (Color, Vec<Modifier>) {
    match tag {
        StyleTag::Keyword | StyleTag::Tag => (Color::Rgb(86, 156, 214), vec![Modifier::BOLD]),
        StyleTag::String => (Color::Rgb(206, 145, 120), vec![]),
        StyleTag::Comment => (Color::Rgb(106, 153, 85), vec![Modifier::ITALIC]),
        StyleTag::Number | StyleTag::Constant => (Color::Rgb(181, 206, 168), vec![]),
        StyleTag::Function => (Color::Rgb(220, 220, 170), vec![]),
        StyleTag::Class | StyleTag::Type => (Color::Rgb(78, 201, 176), vec![]),
        StyleTag::Operator | StyleTag::Punctuation => (Color::Rgb(212, 212, 212), vec![]),
        StyleTag::Builtin => (Color::Rgb(86, 156, 214), vec![]),
        StyleTag::Error => (Color::Rgb(244, 71, 71), vec![]),
        StyleTag::Decorator | StyleTag::Attribute => (Color::Rgb(255, 198, 109), vec![]),
        StyleTag::Property | StyleTag::Variable => (Color::Rgb(156, 220, 254), vec![]),
        StyleTag::Heading => (Color::Rgb(86, 156, 214), vec![Modifier::BOLD]),
        StyleTag::Emphasis => (Color::Rgb(220, 220, 170), vec![Modifier::BOLD]),
        StyleTag::Default => (Color::Rgb(212, 212, 212), vec![]),
    }
}

/// Light scheme (VS Code Light+ inspired)
fn color_for_tag_light(tag: StyleTag) -> (Color, Vec<Modifier>) {
    match tag {
        StyleTag::Keyword | StyleTag::Tag => (Color::Rgb(0, 0, 255), vec![Modifier::BOLD]),
        StyleTag::String => (Color::Rgb(163, 21, 21), vec![]),
        StyleTag::Comment => (Color::Rgb(0, 128, 0), vec![Modifier::ITALIC]),
        StyleTag::Number | StyleTag::Constant => (Color::Rgb(9, 134, 88), vec![]),
        StyleTag::Function => (Color::Rgb(121, 94, 38), vec![]),
        StyleTag::Class | StyleTag::Type => (Color::Rgb(43, 145, 175), vec![]),
        StyleTag::Operator | StyleTag::Punctuation => (Color::Rgb(0, 0, 0), vec![]),
        StyleTag::Builtin => (Color::Rgb(0, 0, 255), vec![]),
        StyleTag::Error => (Color::Rgb(255, 0, 0), vec![]),
        StyleTag::Decorator | StyleTag::Attribute => (Color::Rgb(128, 128, 0), vec![]),
        StyleTag::Property | StyleTag::Variable => (Color::Rgb(0, 16, 128), vec![]),
        StyleTag::Heading => (Color::Rgb(0, 0, 255), vec![Modifier::BOLD]),
        StyleTag::Emphasis => (Color::Rgb(121, 94, 38), vec![Modifier::BOLD]),
        StyleTag::Default => (Color::Rgb(0, 0, 0), vec![]),
    }
}

/// Split `text` into styled segments for rendering, filling the gaps
/// between spans with the default style.
pub fn styled_segments<'a>(
    text: &'a str,
    spans: &[StyledSpan],
    scheme: ColorScheme,
) -> Vec<(&'a str, Style)> {
    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;

    for span in spans {
        let Some(styled) = span.text(text) else {
            continue;
        };
        if span.start < cursor {
            continue;
        }
        if span.start > cursor {
            segments.push((&text[cursor..span.start], Style::default()));
        }
        segments.push((styled, scheme.style_for(span.tag)));
        cursor = span.end();
    }

    if cursor < text.len() {
        segments.push((&text[cursor..], Style::default()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheme() {
        assert_eq!("Light".parse::<ColorScheme>(), Ok(ColorScheme::Light));
        assert!("sepia".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn test_keyword_is_bold_in_both_schemes() {
        for scheme in [ColorScheme::Dark, ColorScheme::Light] {
            let style = scheme.style_for(StyleTag::Keyword);
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
        assert_eq!(
            ColorScheme::Light.style_for(StyleTag::String).fg,
            Some(Color::Rgb(163, 21, 21))
        );
    }

    #[test]
    fn test_default_tag_has_no_style() {
        assert_eq!(ColorScheme::Dark.style_for(StyleTag::Default), Style::default());
    }

    #[test]
    fn test_segments_cover_text() {
        let text = "let x = 1;";
        let spans = [
            StyledSpan::new(0, 3, StyleTag::Keyword),
            StyledSpan::new(8, 1, StyleTag::Number),
        ];
        let segments = styled_segments(text, &spans, ColorScheme::Dark);

        let texts: Vec<_> = segments.iter().map(|(t, _)| *t).collect();
        assert_eq!(texts, vec!["let", " x = ", "1", ";"]);
        assert_eq!(segments[1].1, Style::default());
        assert_eq!(texts.concat(), text);
    }
}
