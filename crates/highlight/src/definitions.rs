//! Declarative language definitions in TOML.

use serde::Deserialize;

use crate::profile::{LanguageProfile, RegexRule, RuleOptions};
use crate::registry::RegistryError;
use crate::span::StyleTag;

/// Definitions compiled into the binary, in detection order
pub const BUNDLED: &[(&str, &str)] = &[
    ("python", include_str!("../profiles/python.toml")),
    ("javascript", include_str!("../profiles/javascript.toml")),
    ("typescript", include_str!("../profiles/typescript.toml")),
    ("java", include_str!("../profiles/java.toml")),
    ("c", include_str!("../profiles/c.toml")),
    ("cpp", include_str!("../profiles/cpp.toml")),
    ("csharp", include_str!("../profiles/csharp.toml")),
    ("go", include_str!("../profiles/go.toml")),
    ("rust", include_str!("../profiles/rust.toml")),
    ("ruby", include_str!("../profiles/ruby.toml")),
    ("php", include_str!("../profiles/php.toml")),
    ("html", include_str!("../profiles/html.toml")),
    ("xml", include_str!("../profiles/xml.toml")),
    ("css", include_str!("../profiles/css.toml")),
    ("json", include_str!("../profiles/json.toml")),
    ("yaml", include_str!("../profiles/yaml.toml")),
    ("toml", include_str!("../profiles/toml.toml")),
    ("ini", include_str!("../profiles/ini.toml")),
    ("markdown", include_str!("../profiles/markdown.toml")),
    ("sql", include_str!("../profiles/sql.toml")),
    ("bash", include_str!("../profiles/bash.toml")),
    ("text", include_str!("../profiles/text.toml")),
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileDefinition {
    id: String,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    rules: Vec<RuleDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDefinition {
    #[serde(default)]
    pattern: Option<String>,
    /// Whole-word alternatives, an alternative to `pattern`
    #[serde(default)]
    words: Option<Vec<String>>,
    style: String,
    #[serde(default)]
    group: Option<usize>,
    #[serde(default)]
    multiline: bool,
    #[serde(default)]
    case_insensitive: bool,
}

/// Parse one definition into a profile without a precise tokenizer.
///
/// `source` names the definition in error messages.
pub fn parse_definition(source: &str, content: &str) -> Result<LanguageProfile, RegistryError> {
    let definition: ProfileDefinition =
        toml::from_str(content).map_err(|e| RegistryError::Parse {
            source_name: source.to_string(),
            message: e.to_string(),
        })?;

    let mut profile = LanguageProfile::new(definition.id.to_lowercase(), definition.name)
        .with_aliases(definition.aliases)
        .with_extensions(definition.extensions);

    for (index, rule) in definition.rules.into_iter().enumerate() {
        profile = profile.with_rule(compile_rule(source, index, rule)?);
    }

    Ok(profile)
}

fn compile_rule(
    source: &str,
    index: usize,
    rule: RuleDefinition,
) -> Result<RegexRule, RegistryError> {
    let style: StyleTag = rule
        .style
        .parse()
        .map_err(|_| RegistryError::UnknownStyle {
            source_name: source.to_string(),
            style: rule.style.clone(),
        })?;

    let invalid = |message: String| RegistryError::InvalidRule {
        source_name: source.to_string(),
        index,
        message,
    };

    let compiled = match (rule.pattern, rule.words) {
        (Some(pattern), None) => RegexRule::with_options(
            &pattern,
            style,
            RuleOptions {
                multiline: rule.multiline,
                case_insensitive: rule.case_insensitive,
                capture_group: rule.group,
            },
        ),
        (None, Some(words)) if !words.is_empty() => {
            RegexRule::words(&words, style, rule.case_insensitive)
        }
        (None, Some(_)) => return Err(invalid("empty word list".to_string())),
        _ => return Err(invalid("exactly one of `pattern` or `words` is required".to_string())),
    };

    compiled.map_err(|e| invalid(e.to_string()))
}
