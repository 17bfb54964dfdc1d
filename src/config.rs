//! Collection config.
//!
//! Only the parts of the host's config file this crate consumes. A scope or
//! usage kind is collected only when its key is present.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

/// Errors raised while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level config document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub collect: CollectConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// `collect` section: one optional entry per scope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectConfig {
    /// Any value, `null` included, enables npm dependency metrics.
    #[serde(default, deserialize_with = "present")]
    pub npm: bool,
    pub js: Option<JsConfig>,
    pub jsx: Option<ElementsScopeConfig>,
    pub wc: Option<ElementsScopeConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsConfig {
    /// `tokens: null` enables token collection.
    #[serde(default, deserialize_with = "present")]
    pub tokens: bool,
    pub functions: Option<FunctionsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionsConfig {
    #[serde(default)]
    pub allowed_argument_string_values: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElementsScopeConfig {
    pub elements: Option<ElementsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementsConfig {
    #[serde(default)]
    pub allowed_attribute_names: Vec<String>,
    #[serde(default)]
    pub allowed_attribute_string_values: Vec<String>,
}

/// True whenever the key exists, whatever its value.
fn present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    serde::de::IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = Config::from_json(
            r#"{
                "projectId": "abc",
                "collect": {
                    "npm": {},
                    "js": {
                        "tokens": null,
                        "functions": { "allowedArgumentStringValues": ["short"] }
                    },
                    "jsx": {
                        "elements": {
                            "allowedAttributeNames": ["kind"],
                            "allowedAttributeStringValues": ["primary"]
                        }
                    },
                    "wc": { "elements": {} }
                }
            }"#,
        )
        .unwrap();

        let collect = config.collect;
        assert!(collect.npm);
        let js = collect.js.unwrap();
        assert!(js.tokens);
        assert_eq!(js.functions.unwrap().allowed_argument_string_values, vec!["short"]);
        let jsx = collect.jsx.unwrap().elements.unwrap();
        assert_eq!(jsx.allowed_attribute_names, vec!["kind"]);
        assert_eq!(jsx.allowed_attribute_string_values, vec!["primary"]);
        assert!(collect.wc.unwrap().elements.unwrap().allowed_attribute_names.is_empty());
    }

    #[test]
    fn test_absent_keys_disable_collection() {
        let config = Config::from_json(r#"{"collect": {"js": {"functions": {}}}}"#).unwrap();
        assert!(!config.collect.npm);
        assert!(config.collect.jsx.is_none());
        let js = config.collect.js.unwrap();
        assert!(!js.tokens);
        assert!(js.functions.is_some());
    }

    #[test]
    fn test_empty_document() {
        let config = Config::from_json("{}").unwrap();
        assert!(config.collect.js.is_none());
        assert!(config.collect.wc.is_none());
    }
}
