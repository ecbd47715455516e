//! Picks the precise tokenizer or the regex fallback for each request.

use std::panic::{self, AssertUnwindSafe};

use chango_logger as logger;

use crate::fallback::fallback_highlight;
use crate::profile::{LanguageProfile, PreciseTokenizer, TokenizeError};
use crate::registry::LanguageRegistry;
use crate::span::{spans_are_well_formed, StyledSpan};

/// Stateless highlighting front end over a borrowed registry.
///
/// Safe to use from a worker thread as long as the registry is not being
/// mutated; every call builds its own tokenizer state.
#[derive(Debug, Clone, Copy)]
pub struct HighlightDispatcher<'r> {
    registry: &'r LanguageRegistry,
    precise_enabled: bool,
    /// Texts longer than this (bytes) skip the precise tokenizer
    precise_limit: Option<usize>,
}

impl<'r> HighlightDispatcher<'r> {
    pub fn new(registry: &'r LanguageRegistry) -> Self {
        Self {
            registry,
            precise_enabled: true,
            precise_limit: None,
        }
    }

    /// Turn grammar-aware tokenizers on or off
    pub fn with_precise(mut self, enabled: bool) -> Self {
        self.precise_enabled = enabled;
        self
    }

    /// Use only the regex pipeline for texts above `bytes`
    pub fn with_precise_limit(mut self, bytes: Option<usize>) -> Self {
        self.precise_limit = bytes;
        self
    }

    pub fn registry(&self) -> &'r LanguageRegistry {
        self.registry
    }

    /// Language id for a file name; plain text when nothing matches
    pub fn detect_language(&self, file_name: &str) -> &'r str {
        self.registry.detect_language(file_name)
    }

    /// Highlight `text` as `language`. Never fails: unknown languages are
    /// plain text, and a failing precise tokenizer degrades to the regex rules.
    pub fn highlight(&self, text: &str, language: &str) -> Vec<StyledSpan> {
        let profile = self.registry.profile_or_plain(language);

        if let Some(tokenizer) = self.precise_for(profile, text) {
            match run_precise(tokenizer.as_ref(), text) {
                Ok(spans) => return spans,
                Err(e) => logger::debug(format!(
                    "{} tokenizer failed for {}, using regex rules: {}",
                    tokenizer.name(),
                    profile.id(),
                    e
                )),
            }
        }

        fallback_highlight(profile, text)
    }

    fn precise_for<'p>(
        &self,
        profile: &'p LanguageProfile,
        text: &str,
    ) -> Option<&'p std::sync::Arc<dyn PreciseTokenizer>> {
        if !self.precise_enabled || text.is_empty() {
            return None;
        }
        if self.precise_limit.is_some_and(|limit| text.len() > limit) {
            return None;
        }
        profile.precise_tokenizer()
    }
}

/// Run a tokenizer, turning panics and malformed output into errors.
fn run_precise(
    tokenizer: &dyn PreciseTokenizer,
    text: &str,
) -> Result<Vec<StyledSpan>, TokenizeError> {
    let spans = panic::catch_unwind(AssertUnwindSafe(|| tokenizer.tokenize(text)))
        .map_err(|_| TokenizeError::Panicked)??;

    if !spans_are_well_formed(&spans, text) {
        return Err(TokenizeError::MalformedOutput);
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::RegexRule;
    use crate::span::StyleTag;
    use std::sync::Arc;

    #[derive(Debug)]
    struct FailingTokenizer;

    impl PreciseTokenizer for FailingTokenizer {
        fn name(&self) -> &str {
            "failing"
        }

        fn tokenize(&self, _text: &str) -> Result<Vec<StyledSpan>, TokenizeError> {
            Err(TokenizeError::Failed("unsupported construct".to_string()))
        }
    }

    #[derive(Debug)]
    struct PanickingTokenizer;

    impl PreciseTokenizer for PanickingTokenizer {
        fn name(&self) -> &str {
            "panicking"
        }

        fn tokenize(&self, _text: &str) -> Result<Vec<StyledSpan>, TokenizeError> {
            panic!("grammar exploded")
        }
    }

    #[derive(Debug)]
    struct SloppyTokenizer;

    impl PreciseTokenizer for SloppyTokenizer {
        fn name(&self) -> &str {
            "sloppy"
        }

        fn tokenize(&self, text: &str) -> Result<Vec<StyledSpan>, TokenizeError> {
            Ok(vec![StyledSpan::new(0, text.len() + 10, StyleTag::Keyword)])
        }
    }

    #[derive(Debug)]
    struct WholeTextTokenizer;

    impl PreciseTokenizer for WholeTextTokenizer {
        fn name(&self) -> &str {
            "whole"
        }

        fn tokenize(&self, text: &str) -> Result<Vec<StyledSpan>, TokenizeError> {
            Ok(vec![StyledSpan::new(0, text.len(), StyleTag::Function)])
        }
    }

    fn toy_profile(tokenizer: Arc<dyn PreciseTokenizer>) -> LanguageProfile {
        LanguageProfile::new("toy", "Toy")
            .with_extensions(["toy"])
            .with_rule(RegexRule::new(r"#.*$", StyleTag::Comment).unwrap())
            .with_rule(RegexRule::words(&["let"], StyleTag::Keyword, false).unwrap())
            .with_precise(tokenizer)
    }

    fn registry_with(tokenizer: Arc<dyn PreciseTokenizer>) -> LanguageRegistry {
        let mut registry = LanguageRegistry::new();
        registry.register_profile(toy_profile(tokenizer));
        registry
    }

    #[test]
    fn test_unknown_language_is_plain_text() {
        let registry = LanguageRegistry::with_builtin();
        let dispatcher = HighlightDispatcher::new(&registry);
        let text = "print('x')";
        assert_eq!(
            dispatcher.highlight(text, "unknown-lang"),
            vec![StyledSpan::new(0, text.len(), StyleTag::Default)]
        );
    }

    #[test]
    fn test_failing_tokenizer_matches_fallback() {
        let registry = registry_with(Arc::new(FailingTokenizer));
        let dispatcher = HighlightDispatcher::new(&registry);
        let text = "let a = 1 # set a\nlet b = 2";

        let expected = fallback_highlight(registry.get("toy").unwrap(), text);
        assert!(!expected.is_empty());
        assert_eq!(dispatcher.highlight(text, "toy"), expected);
    }

    #[test]
    fn test_panicking_tokenizer_is_contained() {
        let registry = registry_with(Arc::new(PanickingTokenizer));
        let dispatcher = HighlightDispatcher::new(&registry);
        let text = "let x";

        assert_eq!(
            dispatcher.highlight(text, "toy"),
            vec![StyledSpan::new(0, 3, StyleTag::Keyword)]
        );
    }

    #[test]
    fn test_malformed_precise_output_rejected() {
        let registry = registry_with(Arc::new(SloppyTokenizer));
        let dispatcher = HighlightDispatcher::new(&registry);
        let text = "let x";
        assert_eq!(
            dispatcher.highlight(text, "toy"),
            fallback_highlight(registry.get("toy").unwrap(), text)
        );
    }

    #[test]
    fn test_precise_preferred_when_it_works() {
        let registry = registry_with(Arc::new(WholeTextTokenizer));
        let dispatcher = HighlightDispatcher::new(&registry);
        assert_eq!(
            dispatcher.highlight("let x", "toy"),
            vec![StyledSpan::new(0, 5, StyleTag::Function)]
        );
    }

    #[test]
    fn test_precise_switches() {
        let registry = registry_with(Arc::new(WholeTextTokenizer));
        let text = "let x";
        let fallback = fallback_highlight(registry.get("toy").unwrap(), text);

        let disabled = HighlightDispatcher::new(&registry).with_precise(false);
        assert_eq!(disabled.highlight(text, "toy"), fallback);

        let limited = HighlightDispatcher::new(&registry).with_precise_limit(Some(3));
        assert_eq!(limited.highlight(text, "toy"), fallback);
    }

    #[test]
    fn test_detect_then_highlight_python() {
        let registry = LanguageRegistry::with_builtin();
        let dispatcher = HighlightDispatcher::new(&registry);
        let language = dispatcher.detect_language("main.py");
        assert_eq!(language, "python");

        let text = "def greet():\n    return 'hi'  # done\n";
        let spans = dispatcher.highlight(text, language);
        assert!(spans_are_well_formed(&spans, text));
        assert!(spans
            .iter()
            .any(|s| s.tag == StyleTag::Comment && s.text(text) == Some("# done")));
    }

    #[test]
    fn test_empty_text() {
        let registry = LanguageRegistry::with_builtin();
        let dispatcher = HighlightDispatcher::new(&registry);
        assert!(dispatcher.highlight("", "rust").is_empty());
        assert!(dispatcher.highlight("", "nope").is_empty());
    }
}
