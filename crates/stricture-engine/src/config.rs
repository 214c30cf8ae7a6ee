//! Engine configuration: per-rule severity overrides and disables.
//!
//! TOML surface:
//!
//! ```toml
//! [rules]
//! "CTR-request-shape" = "high"
//! "TQ-negative-cases" = "off"
//! ```
//!
//! Unknown rule IDs and unknown setting values are fatal. A typo that
//! silently configures nothing is worse than a hard error.

use crate::rules::catalogue_ids;
use crate::violation::Severity;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown rule id {rule:?}; known rules: {known}")]
    UnknownRule { rule: String, known: String },
}

/// One rule's configured disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum RuleSetting {
    Off,
    Severity(Severity),
}

impl TryFrom<String> for RuleSetting {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw == "off" {
            return Ok(RuleSetting::Off);
        }
        raw.parse::<Severity>()
            .map(RuleSetting::Severity)
            .map_err(|_| format!("expected off, low, medium, or high, got {raw:?}"))
    }
}

/// Parsed and validated engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,
}

impl EngineConfig {
    /// Whether a rule has been disabled outright.
    pub fn is_disabled(&self, rule_id: &str) -> bool {
        matches!(self.rules.get(rule_id), Some(RuleSetting::Off))
    }

    /// The configured severity for a rule, if overridden.
    pub fn severity_override(&self, rule_id: &str) -> Option<Severity> {
        match self.rules.get(rule_id) {
            Some(RuleSetting::Severity(severity)) => Some(*severity),
            _ => None,
        }
    }

    /// Reject settings for rule IDs the engine does not know.
    fn validate(self) -> Result<Self, ConfigError> {
        let known = catalogue_ids();
        for rule in self.rules.keys() {
            if !known.contains(&rule.as_str()) {
                return Err(ConfigError::UnknownRule {
                    rule: rule.clone(),
                    known: known.join(", "),
                });
            }
        }
        Ok(self)
    }
}

/// Read and validate a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&data, &path.display().to_string())
}

/// Parse and validate a configuration document.
pub fn parse_config(data: &str, origin: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(data).map_err(|source| ConfigError::ParseToml {
        path: origin.to_string(),
        source,
    })?;
    config.validate()
}
