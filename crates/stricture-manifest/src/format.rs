//! Named format registry.
//!
//! The manifest's `format` attribute is a closed registry of named
//! validators plus an escape hatch for inline patterns (`pattern:<regex>`).
//! Keeping the registry closed decouples the engine from any one regex
//! dialect; target ecosystems may back the same names with their native
//! pattern engines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

const PATTERN_PREFIX: &str = "pattern:";

/// The named validators the manifest may reference.
const NAMED_FORMATS: &[(&str, &str)] = &[
    ("uuid", r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"),
    ("url", r"^https?://[^\s]+$"),
    ("email", r"^[^@\s]+@[^@\s]+\.[^@\s]+$"),
    // RFC 3339 timestamp with optional fractional seconds.
    (
        "timestamp",
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$",
    ),
    ("sha256-hex", r"^[0-9a-f]{64}$"),
    // Entity tag with the surrounding quotes the wire format requires.
    ("quoted-etag", r#"^"[^"]+"$"#),
];

fn compiled_registry() -> &'static BTreeMap<&'static str, Regex> {
    static REGISTRY: OnceLock<BTreeMap<&'static str, Regex>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        NAMED_FORMATS
            .iter()
            .map(|(name, pattern)| {
                let regex = Regex::new(pattern)
                    .unwrap_or_else(|e| panic!("builtin format {name} must compile: {e}"));
                (*name, regex)
            })
            .collect()
    })
}

/// Names of every registered validator, ascending.
pub fn format_registry() -> Vec<&'static str> {
    compiled_registry().keys().copied().collect()
}

/// Whether `name` is a registered named validator.
pub fn is_known_format(name: &str) -> bool {
    compiled_registry().contains_key(name)
}

/// A field's declared format: a registry name or an inline pattern.
///
/// Serialized as a single string; `pattern:` prefixes select the inline
/// variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FormatSpec {
    Named(String),
    Pattern(String),
}

impl FormatSpec {
    /// The serialized identity of this format, used for parity comparison
    /// against the format a client enforces.
    pub fn id(&self) -> String {
        String::from(self.clone())
    }

    /// Validate the format itself: named formats must be registered,
    /// inline patterns must compile.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            FormatSpec::Named(name) => {
                if is_known_format(name) {
                    Ok(())
                } else {
                    Err(format!(
                        "unknown format {name:?}; known formats: {}",
                        format_registry().join(", ")
                    ))
                }
            }
            FormatSpec::Pattern(pattern) => Regex::new(pattern)
                .map(|_| ())
                .map_err(|e| format!("pattern does not compile: {e}")),
        }
    }

    /// Whether `value` matches this format. Inline patterns are compiled
    /// on demand; `validate` has already proven they compile.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            FormatSpec::Named(name) => compiled_registry()
                .get(name.as_str())
                .is_some_and(|regex| regex.is_match(value)),
            FormatSpec::Pattern(pattern) => Regex::new(pattern)
                .map(|regex| regex.is_match(value))
                .unwrap_or(false),
        }
    }
}

impl TryFrom<String> for FormatSpec {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw.trim().is_empty() {
            return Err("format must not be empty".to_string());
        }
        if let Some(pattern) = raw.strip_prefix(PATTERN_PREFIX) {
            Ok(FormatSpec::Pattern(pattern.to_string()))
        } else {
            Ok(FormatSpec::Named(raw))
        }
    }
}

impl From<FormatSpec> for String {
    fn from(spec: FormatSpec) -> Self {
        match spec {
            FormatSpec::Named(name) => name,
            FormatSpec::Pattern(pattern) => format!("{PATTERN_PREFIX}{pattern}"),
        }
    }
}

impl std::fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}
