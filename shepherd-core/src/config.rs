use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while decoding the owners config file.
///
/// Syntax and schema problems are reported separately so that a user can
/// tell a broken file apart from a well-formed file with the wrong fields.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file is not valid YAML at all.
    #[error("owners config is not valid YAML: {0}")]
    Syntax(serde_yaml::Error),
    /// The file is valid YAML but does not have the expected shape.
    #[error("owners config has an unexpected shape: {0}")]
    Schema(serde_yaml::Error),
}

/// A config value that is either a single whitespace-delimited string or a
/// YAML sequence of strings. Both forms normalize to a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringList(pub Vec<String>);

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringListVisitor;

        impl<'de> Visitor<'de> for StringListVisitor {
            type Value = StringList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a sequence of strings")
            }

            fn visit_str<E>(self, value: &str) -> Result<StringList, E>
            where
                E: de::Error,
            {
                Ok(StringList(
                    value.split_whitespace().map(str::to_string).collect(),
                ))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<StringList, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<String>()? {
                    items.push(item);
                }
                Ok(StringList(items))
            }
        }

        deserializer.deserialize_any(StringListVisitor)
    }
}

/// The declarative ownership table, loaded once per invocation from a file
/// at the head commit and never mutated afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path pattern to the owner identifiers claiming files under it.
    #[serde(default)]
    pub components: BTreeMap<String, StringList>,
    /// Authors whose changes are skipped entirely: no assignment, no review
    /// requests.
    #[serde(rename = "ignored-authors", default)]
    pub ignored_authors: StringList,
}

impl Config {
    /// Decode the owners file with exact-shape validation: unrecognized
    /// top-level fields are rejected as schema errors.
    pub fn parse(source: &str) -> Result<Config, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(source).map_err(ConfigError::Syntax)?;
        serde_yaml::from_value(value).map_err(ConfigError::Schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_owners_split_on_whitespace() {
        let config = Config::parse("components:\n  api/: \"alice  /team-x\"\n").unwrap();
        assert_eq!(
            config.components.get("api/"),
            Some(&StringList(vec![
                "alice".to_string(),
                "/team-x".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_sequence_owners_used_as_is() {
        let source = "components:\n  api/:\n    - alice\n    - /team-x\n";
        let config = Config::parse(source).unwrap();
        assert_eq!(
            config.components.get("api/"),
            Some(&StringList(vec![
                "alice".to_string(),
                "/team-x".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_ignored_authors_scalar_and_sequence() {
        let config = Config::parse("ignored-authors: \"dependabot renovate\"\n").unwrap();
        assert_eq!(
            config.ignored_authors,
            StringList(vec!["dependabot".to_string(), "renovate".to_string()])
        );

        let config = Config::parse("ignored-authors:\n  - dependabot\n").unwrap();
        assert_eq!(
            config.ignored_authors,
            StringList(vec!["dependabot".to_string()])
        );
    }

    #[test]
    fn test_parse_missing_fields_default_to_empty() {
        let config = Config::parse("components: {}\n").unwrap();
        assert!(config.components.is_empty());
        assert!(config.ignored_authors.0.is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_top_level_field() {
        let err = Config::parse("components: {}\nreviewers: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Schema(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_yaml_as_syntax_error() {
        let err = Config::parse("components: [unclosed\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn test_parse_rejects_wrong_value_shape_as_schema_error() {
        let err = Config::parse("components: 42\n").unwrap_err();
        assert!(matches!(err, ConfigError::Schema(_)));
    }
}
