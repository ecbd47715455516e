//! Host-owned table of language profiles.

use std::collections::HashMap;
use std::path::Path;

use chango_logger as logger;

use crate::definitions::{self, BUNDLED};
use crate::profile::{LanguageProfile, PLAIN_TEXT};
use crate::treesitter::TreeSitterTokenizer;

/// Problem found while populating the registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{source_name}: {message}")]
    Parse { source_name: String, message: String },
    #[error("{source_name}: unknown style tag `{style}`")]
    UnknownStyle { source_name: String, style: String },
    #[error("{source_name}: rule #{index}: {message}")]
    InvalidRule {
        source_name: String,
        index: usize,
        message: String,
    },
    #[error("{source_name}: language `{id}` is already registered")]
    DuplicateId { source_name: String, id: String },
}

/// Registered language profiles.
///
/// Populated at startup and read-mostly afterwards. Profiles keep their
/// registration order, which is also the order file detection tries them in.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    profiles: Vec<LanguageProfile>,
    /// id -> index in `profiles`
    by_id: HashMap<String, usize>,
    /// Used for unknown ids when no "text" profile is registered
    plain: LanguageProfile,
}

impl LanguageRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            by_id: HashMap::new(),
            plain: LanguageProfile::plain_text(),
        }
    }

    /// Registry holding the bundled definitions, with tree-sitter tokenizers
    /// attached where a grammar exists. Definitions that fail to load are
    /// logged and skipped.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for error in registry.load_definitions(BUNDLED) {
            logger::error(format!("Language definition skipped: {}", error));
        }
        logger::debug(format!(
            "Language registry loaded {} profiles",
            registry.profiles.len()
        ));
        registry
    }

    /// Load `(source, toml)` definitions. Duplicate ids are rejected so a
    /// later file cannot silently replace an earlier one. Returns every
    /// problem found; valid definitions are registered regardless.
    pub fn load_definitions(&mut self, sources: &[(&str, &str)]) -> Vec<RegistryError> {
        let mut errors = Vec::new();

        for (source, content) in sources {
            let profile = match definitions::parse_definition(source, content) {
                Ok(profile) => profile,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            if self.by_id.contains_key(profile.id()) {
                errors.push(RegistryError::DuplicateId {
                    source_name: source.to_string(),
                    id: profile.id().to_string(),
                });
                continue;
            }

            let profile = match TreeSitterTokenizer::shared(profile.id()) {
                Some(tokenizer) => profile.with_precise(tokenizer),
                None => profile,
            };
            self.register_profile(profile);
        }

        errors
    }

    /// Register a profile. A profile with the same id is replaced in place
    /// and returned.
    pub fn register_profile(&mut self, profile: LanguageProfile) -> Option<LanguageProfile> {
        if let Some(&index) = self.by_id.get(profile.id()) {
            logger::warn(format!("Language `{}` re-registered", profile.id()));
            return Some(std::mem::replace(&mut self.profiles[index], profile));
        }

        self.by_id
            .insert(profile.id().to_string(), self.profiles.len());
        self.profiles.push(profile);
        None
    }

    /// All registered profiles in registration order
    pub fn profiles(&self) -> &[LanguageProfile] {
        &self.profiles
    }

    /// Profile by canonical id
    pub fn get(&self, id: &str) -> Option<&LanguageProfile> {
        self.by_id.get(id).map(|&index| &self.profiles[index])
    }

    /// Resolve a language name or alias (`py`, `C++`, `sh`...) to its profile
    pub fn resolve(&self, name: &str) -> Option<&LanguageProfile> {
        let name = name.trim().to_lowercase();
        self.get(&name).or_else(|| {
            self.profiles
                .iter()
                .find(|p| p.aliases().iter().any(|a| *a == name))
        })
    }

    /// Profile for a name or alias, falling back to plain text
    pub fn profile_or_plain(&self, name: &str) -> &LanguageProfile {
        self.resolve(name).unwrap_or_else(|| self.plain_text())
    }

    /// The plain-text profile
    pub fn plain_text(&self) -> &LanguageProfile {
        self.get(PLAIN_TEXT).unwrap_or(&self.plain)
    }

    /// Detect language id from a file name or path.
    ///
    /// First profile whose extensions match wins; no match yields plain text.
    pub fn detect_language(&self, file_name: impl AsRef<Path>) -> &str {
        let Some(name) = file_name
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
        else {
            return PLAIN_TEXT;
        };

        self.profiles
            .iter()
            .find(|p| p.matches_file_name(&name))
            .map(|p| p.id())
            .unwrap_or(PLAIN_TEXT)
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads_every_definition() {
        let mut registry = LanguageRegistry::new();
        let errors = registry.load_definitions(BUNDLED);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(registry.profiles().len(), BUNDLED.len());
    }

    #[test]
    fn test_builtin_attaches_tree_sitter() {
        let registry = LanguageRegistry::with_builtin();
        assert!(registry.get("rust").unwrap().has_precise_tokenizer());
        assert!(registry.get("python").unwrap().has_precise_tokenizer());
        assert!(!registry.get("csharp").unwrap().has_precise_tokenizer());
        assert!(!registry.get("text").unwrap().has_precise_tokenizer());
    }

    #[test]
    fn test_detect_language() {
        let registry = LanguageRegistry::with_builtin();
        assert_eq!(registry.detect_language("main.py"), "python");
        assert_eq!(registry.detect_language("src/lib.RS"), "rust");
        assert_eq!(registry.detect_language("App.tsx"), "typescript");
        assert_eq!(registry.detect_language("/etc/app.conf"), "ini");
        assert_eq!(registry.detect_language(".gitignore"), "text");
        assert_eq!(registry.detect_language("noext"), "text");
        assert_eq!(registry.detect_language(""), "text");
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = LanguageRegistry::new();
        registry.register_profile(LanguageProfile::new("first", "First").with_extensions(["h"]));
        registry.register_profile(LanguageProfile::new("second", "Second").with_extensions(["h"]));
        assert_eq!(registry.detect_language("x.h"), "first");
    }

    #[test]
    fn test_resolve_aliases() {
        let registry = LanguageRegistry::with_builtin();
        assert_eq!(registry.resolve("py").map(|p| p.id()), Some("python"));
        assert_eq!(registry.resolve("C++").map(|p| p.id()), Some("cpp"));
        assert_eq!(registry.resolve("sh").map(|p| p.id()), Some("bash"));
        assert!(registry.resolve("klingon").is_none());
        assert_eq!(registry.profile_or_plain("klingon").id(), "text");
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut registry = LanguageRegistry::new();
        registry.register_profile(LanguageProfile::new("a", "A"));
        registry.register_profile(LanguageProfile::new("b", "B"));

        let previous = registry.register_profile(LanguageProfile::new("a", "A2"));
        assert_eq!(previous.map(|p| p.name().to_string()), Some("A".to_string()));
        assert_eq!(registry.profiles()[0].name(), "A2");
        assert_eq!(registry.profiles().len(), 2);
    }

    #[test]
    fn test_bad_definitions_reported_rest_loaded() {
        let mut registry = LanguageRegistry::new();
        let good = "id = \"good\"\nname = \"Good\"\nextensions = [\"gd\"]\n";
        let broken = "id = \"broken\"\nname = \"Broken\"\n[[rules]]\npattern = \"(\"\nstyle = \"string\"\n";

        let errors = registry.load_definitions(&[
            ("good.toml", good),
            ("broken.toml", broken),
            ("again.toml", good),
        ]);

        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[1], RegistryError::DuplicateId { .. }));
        assert_eq!(registry.profiles().len(), 1);
        assert_eq!(registry.detect_language("x.gd"), "good");
    }

    #[test]
    fn test_plain_text_without_registration() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.plain_text().id(), "text");
        assert!(registry.plain_text().rules().is_empty());
    }
}
