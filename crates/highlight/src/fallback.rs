//! Line-oriented regex highlighting.
//!
//! Rules run in precedence order. A match is kept only when no earlier rule
//! already claimed any of its bytes. Ordinary rules see one line at a time;
//! rules flagged multi-line see the whole text and may cross line breaks.

use std::collections::BTreeMap;

use crate::profile::LanguageProfile;
use crate::span::{StyleTag, StyledSpan};

/// Highlight `text` with the profile's regex rules.
///
/// A profile without rules yields a single default span over the whole text.
pub fn fallback_highlight(profile: &LanguageProfile, text: &str) -> Vec<StyledSpan> {
    if text.is_empty() {
        return Vec::new();
    }
    if profile.rules().is_empty() {
        return vec![StyledSpan::new(0, text.len(), StyleTag::Default)];
    }

    let lines = line_ranges(text);
    let mut claims = Claims::default();

    for rule in profile.rules() {
        if rule.is_multiline() {
            for (start, end) in rule.match_ranges(text) {
                claims.try_claim(start, end, rule.style());
            }
        } else {
            for &(line_start, line_end) in &lines {
                let line = &text[line_start..line_end];
                for (start, end) in rule.match_ranges(line) {
                    claims.try_claim(line_start + start, line_start + end, rule.style());
                }
            }
        }
    }

    claims.into_spans()
}

/// Byte ranges of each line without its terminator
fn line_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches('\n').trim_end_matches('\r');
        ranges.push((offset, offset + content.len()));
        offset += line.len();
    }
    ranges
}

/// Non-overlapping claimed regions keyed by start offset
#[derive(Default)]
struct Claims {
    spans: BTreeMap<usize, (usize, StyleTag)>,
}

impl Claims {
    fn try_claim(&mut self, start: usize, end: usize, tag: StyleTag) -> bool {
        if start >= end || self.overlaps(start, end) {
            return false;
        }
        self.spans.insert(start, (end, tag));
        true
    }

    /// Claims are disjoint, so the one starting last before `end` has the
    /// furthest end among all candidates.
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans
            .range(..end)
            .next_back()
            .is_some_and(|(_, &(claimed_end, _))| claimed_end > start)
    }

    fn into_spans(self) -> Vec<StyledSpan> {
        self.spans
            .into_iter()
            .map(|(start, (end, tag))| StyledSpan::new(start, end - start, tag))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{RegexRule, RuleOptions};
    use crate::span::spans_are_well_formed;

    fn c_like() -> LanguageProfile {
        LanguageProfile::new("c-like", "C-like")
            .with_rule(
                RegexRule::with_options(
                    r"/\*.*?\*/",
                    StyleTag::Comment,
                    RuleOptions {
                        multiline: true,
                        ..RuleOptions::default()
                    },
                )
                .unwrap(),
            )
            .with_rule(RegexRule::new(r"//.*$", StyleTag::Comment).unwrap())
            .with_rule(RegexRule::new(r#""(?:\\.|[^"\\])*""#, StyleTag::String).unwrap())
            .with_rule(RegexRule::words(&["int", "return"], StyleTag::Keyword, false).unwrap())
            .with_rule(RegexRule::new(r"\b\d+\b", StyleTag::Number).unwrap())
    }

    fn tagged<'a>(spans: &[StyledSpan], text: &'a str) -> Vec<(&'a str, StyleTag)> {
        spans
            .iter()
            .map(|s| (s.text(text).unwrap(), s.tag))
            .collect()
    }

    #[test]
    fn test_plain_profile_single_default_span() {
        let profile = LanguageProfile::plain_text();
        let text = "print('x')";
        assert_eq!(
            fallback_highlight(&profile, text),
            vec![StyledSpan::new(0, text.len(), StyleTag::Default)]
        );
        assert!(fallback_highlight(&profile, "").is_empty());
    }

    #[test]
    fn test_precedence_drops_covered_matches() {
        let text = "int x = 1; // return 2";
        let spans = fallback_highlight(&c_like(), text);
        assert_eq!(
            tagged(&spans, text),
            vec![
                ("int", StyleTag::Keyword),
                ("1", StyleTag::Number),
                ("// return 2", StyleTag::Comment),
            ]
        );
    }

    #[test]
    fn test_line_rules_do_not_cross_lines() {
        let profile = LanguageProfile::new("x", "X")
            .with_rule(RegexRule::new(r"a.*b", StyleTag::String).unwrap());
        let text = "a\nb";
        assert!(fallback_highlight(&profile, text).is_empty());
    }

    #[test]
    fn test_multiline_rule_crosses_lines() {
        let text = "int a; /* one\ntwo */ return 0;";
        let spans = fallback_highlight(&c_like(), text);
        assert_eq!(
            tagged(&spans, text),
            vec![
                ("int", StyleTag::Keyword),
                ("/* one\ntwo */", StyleTag::Comment),
                ("return", StyleTag::Keyword),
                ("0", StyleTag::Number),
            ]
        );
    }

    #[test]
    fn test_line_end_anchor_per_line() {
        let text = "x // first\r\ny // second\n";
        let spans = fallback_highlight(&c_like(), text);
        assert_eq!(
            tagged(&spans, text),
            vec![("// first", StyleTag::Comment), ("// second", StyleTag::Comment)]
        );
    }

    #[test]
    fn test_output_is_well_formed() {
        let text = "int main() {\n  return \"héllo\" /* ünïcode */ 42;\n}\n";
        let spans = fallback_highlight(&c_like(), text);
        assert!(spans_are_well_formed(&spans, text));
    }
}
