use std::{fs, io, path::Path};

use math_tuples::TupleConfig;
use serde::Deserialize;

/// The contents of a configuration file. Command-line flags override these values.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Marks the lines that carry a document identifier; empty disables tracking.
    pub docid: String,
    /// Copy the text surrounding each formula to the output.
    pub context: bool,
    #[serde(flatten)]
    pub tuples: TupleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            docid: "<DOCNO>".to_string(),
            context: false,
            tuples: TupleConfig::default(),
        }
    }
}

/// Error type for configuration loading operations.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error when reading the file.
    Io(io::Error),
    /// TOML parsing error.
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {}", err),
            ConfigError::Parse(err) => write!(f, "TOML parsing error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Loads and deserializes the configuration from a TOML file.
///
/// Keys that are missing from the file keep their default values.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok(config)
}

#[inline]
fn parse_config(s: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(s)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use math_tuples::{Inclusion, Markup, SymbolTypes, Window};

    use super::*;

    #[test]
    fn test_full_config() {
        let toml_content = r#"
docid = "<DOC>"
context = true
window = 2
anchors = ["=", "≤"]
dups = "VN"
wild-dups = ""
synonyms = true
markup = "content"

[thresholds]
symbol-pairs = 99
terminals = 0
eol = 3
        "#;
        let config = parse_config(toml_content).unwrap();
        assert_eq!(config.docid, "<DOC>");
        assert!(config.context);
        let tuples = config.tuples;
        assert_eq!(tuples.window, Window::Bounded(2));
        assert_eq!(tuples.anchors, ["=", "≤"]);
        assert_eq!(tuples.dups, SymbolTypes::VARIABLE | SymbolTypes::NUMBER);
        assert!(tuples.wild_dups.is_empty());
        assert!(tuples.synonyms);
        assert_eq!(tuples.markup, Markup::Content);
        assert_eq!(tuples.thresholds.symbol_pairs, Inclusion::Unlimited);
        assert_eq!(tuples.thresholds.terminals, Inclusion::Excluded);
        assert_eq!(tuples.thresholds.eol, Inclusion::Limit(3));
        assert_eq!(tuples.thresholds.compounds, Inclusion::Limit(8));
    }

    #[test]
    fn test_invalid_config() {
        let invalid_toml = "invalid_toml";
        let result = parse_config(invalid_toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_symbol_types() {
        let result = parse_config(r#"dups = "VX""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
window = 0
        "#;
        let config = parse_config(toml_content).unwrap();
        assert_eq!(config.docid, "<DOCNO>");
        assert_eq!(config.tuples.window, Window::Unbounded);
        assert_eq!(config.tuples.anchors.len(), 21);
        assert_eq!(config.tuples.markup, Markup::Presentation);
    }
}
