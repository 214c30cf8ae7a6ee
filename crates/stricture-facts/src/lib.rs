//! Behavioral model: normalized facts about one client and its tests.
//!
//! An external extractor analyzes the client's source and test suite and
//! emits this structure; the engine never parses source text itself. The
//! model is immutable input; the engine only reads it.
//!
//! Where the extractor could not determine whether a guard or boundary
//! exists, it records [`Evidence::Unknown`]. Every rule treats `Unknown`
//! exactly as `Absent`: the cost asymmetry of the domain favors surfacing a
//! possible gap over silently passing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use stricture_manifest::IntRange;

/// Errors raised while loading a behavioral model. All fatal.
#[derive(Debug, thiserror::Error)]
pub enum FactsError {
    #[error("failed to read facts: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid facts json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Three-valued extractor evidence. `Unknown` is fail-closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    Present,
    Absent,
    #[default]
    Unknown,
}

impl Evidence {
    /// Whether the evidence affirmatively holds. `Unknown` does not.
    pub fn holds(self) -> bool {
        self == Evidence::Present
    }
}

/// Facts about one client implementation plus its test suite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorModel {
    /// Name of the analyzed client, for report headers only.
    #[serde(default)]
    pub client: String,
    /// Per-endpoint facts: contract id → "METHOD path-template" → facts.
    #[serde(default)]
    pub endpoints: BTreeMap<String, BTreeMap<String, EndpointFacts>>,
    /// Observed lifecycle traversals: protocol id → step names in call
    /// order.
    #[serde(default)]
    pub lifecycle: BTreeMap<String, Vec<String>>,
}

impl BehaviorModel {
    /// Facts for one endpoint, if the extractor saw it at all.
    pub fn endpoint(&self, contract_id: &str, endpoint_key: &str) -> Option<&EndpointFacts> {
        self.endpoints.get(contract_id)?.get(endpoint_key)
    }
}

/// Read a behavioral model from disk.
pub fn load_facts(path: impl AsRef<Path>) -> Result<BehaviorModel, FactsError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| FactsError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| FactsError::ParseJson {
        path: path.display().to_string(),
        source,
    })
}

/// Parse a behavioral model from a JSON string.
pub fn parse_facts(data: &str) -> Result<BehaviorModel, FactsError> {
    serde_json::from_str(data).map_err(|source| FactsError::ParseJson {
        path: "<inline>".to_string(),
        source,
    })
}

/// Everything observed about one call site and its tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointFacts {
    #[serde(default)]
    pub request: RequestFacts,
    #[serde(default)]
    pub response: ResponseFacts,
    #[serde(default)]
    pub error_handling: ErrorHandlingFacts,
    #[serde(default)]
    pub tests: Vec<TestCase>,
    /// A read-then-write pattern was observed at this call site.
    #[serde(default)]
    pub read_modify_write: bool,
}

/// Fields and headers the client populates on outgoing calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFacts {
    /// Keyed by manifest field path, e.g. `request.body.tier`.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldObservation>,
    /// Implicit call preconditions the client verifies before invoking.
    #[serde(default)]
    pub checked_prerequisites: BTreeSet<String>,
}

/// What the client does with one outgoing field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldObservation {
    /// A pre-flight validation guard, if one was observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardObservation>,
    /// The type the client actually produces/stores for this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_type: Option<ObservedType>,
    /// A transformation the client applies that breaks the declared
    /// format, e.g. stripping the quotes off an entity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_transform: Option<String>,
    /// The integer range actually enforced after any narrowing operation
    /// (a truncating cast shrinks this below the guard's nominal range).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_range: Option<IntRange>,
}

/// A pre-flight validation guard and the constraint it enforces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardObservation {
    #[serde(default)]
    pub evidence: Evidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<EnforcedConstraint>,
}

/// The constraint a client-side guard enforces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum EnforcedConstraint {
    Range { min: i64, max: i64 },
    Length { min: u64, max: u64 },
    Values { values: BTreeSet<String> },
    Format { format: String },
}

/// The type the client was observed producing for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservedType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
}

impl std::fmt::Display for ObservedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObservedType::String => "string",
            ObservedType::Integer => "integer",
            ObservedType::Float => "float",
            ObservedType::Boolean => "boolean",
            ObservedType::Array => "array",
            ObservedType::Object => "object",
        };
        f.write_str(name)
    }
}

/// Response fields/headers the caller reads, and how.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFacts {
    /// Keyed by manifest field path, e.g. `response.body.etag`.
    #[serde(default)]
    pub fields: BTreeMap<String, ReadObservation>,
    /// Fields present in the client's result shape with no manifest
    /// counterpart.
    #[serde(default)]
    pub extra_fields: BTreeSet<String>,
    /// Status codes the caller branches on; everything else is treated
    /// uniformly as success.
    #[serde(default)]
    pub handled_statuses: BTreeSet<u16>,
}

/// How the caller consumes one response field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadObservation {
    #[serde(default)]
    pub read: bool,
    /// Null/absence guard around the read, for nullable fields.
    #[serde(default)]
    pub null_guard: Evidence,
}

/// Whether the call site can tell failure from success before consuming
/// the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHandlingFacts {
    #[serde(default)]
    pub boundary: Evidence,
}

/// Classification of one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Happy,
    Negative,
    Boundary,
}

/// Depth of one test assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionDepth {
    /// Presence/truthiness only.
    Shallow,
    /// Value, format, or type match.
    Deep,
}

/// One assertion inside a test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionFact {
    /// Manifest field path the assertion targets.
    pub field_path: String,
    pub depth: AssertionDepth,
}

/// One test case from the client's suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    pub kind: TestKind,
    /// Status codes this test exercises.
    #[serde(default)]
    pub statuses: BTreeSet<u16>,
    #[serde(default)]
    pub assertions: Vec<AssertionFact>,
}
