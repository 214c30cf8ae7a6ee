//! Manifest data types.
//!
//! Dynamic field shapes in the source document are resolved once at load
//! time into the closed [`FieldSpec`] variant set; rules never re-interpret
//! raw JSON.

use crate::format::FormatSpec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A loaded set of contracts. Contract IDs are unique within the set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSet {
    pub manifest_version: String,
    pub contracts: Vec<Contract>,
}

impl ManifestSet {
    /// Look up a contract by ID.
    pub fn contract(&self, id: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == id)
    }
}

/// One producer's declared API surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    pub producer: String,
    #[serde(default)]
    pub consumers: BTreeSet<String>,
    pub protocol: String,
    pub endpoints: Vec<Endpoint>,
}

/// One method + path-template combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Path template with named parameters, e.g. `/objects/{key}`.
    pub path: String,
    /// HTTP verb or a contract-defined pseudo-verb.
    pub method: String,
    #[serde(default)]
    pub request: RequestSpec,
    #[serde(default)]
    pub response: ResponseSpec,
    /// Status codes this endpoint may return.
    pub status_codes: BTreeSet<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_shape: Option<ErrorShape>,
    /// Membership in a named multi-step protocol group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
    /// Implicit call preconditions the client must check before invoking,
    /// e.g. `credentials` for a signing operation.
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl Endpoint {
    /// The key used to join behavioral facts to this endpoint.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Declared status codes outside the 2xx success band, ascending.
    pub fn non_success_codes(&self) -> Vec<u16> {
        self.status_codes
            .iter()
            .copied()
            .filter(|code| !(200..300).contains(code))
            .collect()
    }

    /// All request field specs with their manifest paths, in declaration
    /// order: headers, path params, query params, then body fields.
    pub fn request_fields(&self) -> Vec<(String, &FieldSpec)> {
        let mut out = Vec::new();
        for (section, map) in [
            ("request.headers", &self.request.headers),
            ("request.pathParams", &self.request.path_params),
            ("request.queryParams", &self.request.query_params),
            ("request.body", &self.request.body),
        ] {
            for (name, field) in map {
                out.push((format!("{section}.{name}"), field));
            }
        }
        out
    }

    /// All response field specs with their manifest paths.
    pub fn response_fields(&self) -> Vec<(String, &FieldSpec)> {
        let mut out = Vec::new();
        for (section, map) in [
            ("response.headers", &self.response.headers),
            ("response.body", &self.response.body),
        ] {
            for (name, field) in map {
                out.push((format!("{section}.{name}"), field));
            }
        }
        out
    }

    /// Names of request headers flagged as conditional-write tokens.
    pub fn concurrency_headers(&self) -> Vec<&str> {
        self.request
            .headers
            .iter()
            .filter(|(_, field)| field.concurrency_token)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Request-side field specs, one map per location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    #[serde(default)]
    pub headers: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    pub path_params: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    pub query_params: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    pub body: BTreeMap<String, FieldSpec>,
}

/// Response-side field specs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSpec {
    #[serde(default)]
    pub headers: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    pub body: BTreeMap<String, FieldSpec>,
}

/// Closed variant tag for field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Enum,
    Array,
    Object,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Enum => "enum",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Typed constraint description for a single header/param/body field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<IntRange>,
    /// Finite value set; non-empty exactly when `kind` is `Enum`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub values: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Marks a conditional-write precondition header (`If-Match`,
    /// `If-None-Match`, …).
    #[serde(default)]
    pub concurrency_token: bool,
}

impl FieldSpec {
    /// Whether this field declares any constraint beyond bare presence.
    /// A non-string type also counts: a truthiness check cannot confirm it.
    pub fn is_constrained(&self) -> bool {
        self.format.is_some()
            || self.length.is_some()
            || self.range.is_some()
            || !self.values.is_empty()
            || self.kind != FieldKind::String
    }
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub fn contains(&self, other: &IntRange) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

impl std::fmt::Display for IntRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Inclusive byte/char length bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthBounds {
    pub min: u64,
    pub max: u64,
}

impl std::fmt::Display for LengthBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Structured error payload contract, e.g. format `json` with required
/// fields `Code`, `Message`, `Resource`, `RequestId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorShape {
    pub format: String,
    pub required_fields: Vec<String>,
}

/// Role of one endpoint inside a lifecycle protocol group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleRole {
    /// An intermediate milestone; halting here is an incomplete traversal.
    Step,
    /// A completing milestone.
    Terminal,
    /// A deliberate cleanup exit; reaching it is not a violation.
    Abort,
}

/// Membership of an endpoint in a named multi-step protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifecycle {
    /// Protocol group identifier, shared by ≥2 endpoints of the contract.
    pub protocol: String,
    /// Milestone name, e.g. `initiate`.
    pub step: String,
    /// Position in the protocol order, 1-based.
    pub order: u32,
    pub role: LifecycleRole,
}
