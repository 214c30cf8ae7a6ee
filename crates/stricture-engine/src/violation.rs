//! Violation records and deterministic finding identifiers.
//!
//! Two independent runs over the same manifest and behavioral model MUST
//! produce identical finding IDs, so the ID is derived from a canonical
//! key rather than from evaluation order:
//!
//! 1. Build the canonical finding key (schema, ruleId, contractId,
//!    endpointId, fieldPath, expected, observed)
//! 2. Serialize with sorted keys and no whitespace
//! 3. findingId = "f1_" || base32hex_lower(SHA256(keyBytes))
//!
//! The free-text rationale is deliberately excluded: rewording an
//! explanation must not change a finding's identity.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Severity band assigned by the fixed rule table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity {other:?}")),
        }
    }
}

/// One reported mismatch between contract and behavior.
///
/// Created only by rule evaluators; immutable once emitted. The aggregator
/// filters and sorts but never mutates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Deterministic content-derived identifier.
    pub finding_id: String,

    pub rule_id: String,

    pub severity: Severity,

    pub contract_id: String,

    /// "METHOD path-template", or a group key for protocol-level findings.
    pub endpoint_id: String,

    /// Pointer into the manifest (e.g. `request.body.tier`), or empty for
    /// endpoint- and suite-level findings.
    #[serde(default)]
    pub field_path: String,

    /// What the contract declares.
    pub expected: String,

    /// What the client/tests were observed doing.
    pub observed: String,

    /// Free-text explanation. Not part of the finding identity.
    pub rationale: String,
}

impl Violation {
    /// Build a violation with its severity from the fixed rule table and
    /// a computed finding ID.
    pub fn new(
        rule_id: &str,
        contract_id: impl Into<String>,
        endpoint_id: impl Into<String>,
        field_path: impl Into<String>,
        expected: impl Into<String>,
        observed: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        let contract_id = contract_id.into();
        let endpoint_id = endpoint_id.into();
        let field_path = field_path.into();
        let expected = expected.into();
        let observed = observed.into();
        let finding_id = compute_finding_id(
            rule_id,
            &contract_id,
            &endpoint_id,
            &field_path,
            &expected,
            &observed,
        );
        Self {
            finding_id,
            rule_id: rule_id.to_string(),
            severity: crate::aggregate::severity_for(rule_id),
            contract_id,
            endpoint_id,
            field_path,
            expected,
            observed,
            rationale: rationale.into(),
        }
    }

    /// Deduplication key per the aggregator contract.
    pub fn dedupe_key(&self) -> (&str, &str, &str, &str) {
        (
            &self.rule_id,
            &self.contract_id,
            &self.endpoint_id,
            &self.field_path,
        )
    }

    /// Ordering key: (contractId, endpointId, ruleId, fieldPath), with the
    /// finding ID as a final stable tiebreak.
    fn sort_key(&self) -> (&str, &str, &str, &str, &str) {
        (
            &self.contract_id,
            &self.endpoint_id,
            &self.rule_id,
            &self.field_path,
            &self.finding_id,
        )
    }
}

impl PartialOrd for Violation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Violation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Compute a finding ID from the canonical key fields.
pub fn compute_finding_id(
    rule_id: &str,
    contract_id: &str,
    endpoint_id: &str,
    field_path: &str,
    expected: &str,
    observed: &str,
) -> String {
    // serde_json::Map is a BTreeMap without the preserve_order feature, so
    // keys serialize in sorted order with no whitespace.
    let mut key = serde_json::Map::new();
    key.insert("schema".to_string(), 1.into());
    key.insert("ruleId".to_string(), rule_id.into());
    key.insert("contractId".to_string(), contract_id.into());
    key.insert("endpointId".to_string(), endpoint_id.into());
    key.insert("fieldPath".to_string(), field_path.into());
    key.insert("expected".to_string(), expected.into());
    key.insert("observed".to_string(), observed.into());

    let key_bytes = serde_json::to_vec(&serde_json::Value::Object(key))
        .expect("finding key serialization cannot fail");
    let hash = Sha256::digest(&key_bytes);
    format!("f1_{}", base32hex_lower_no_pad(&hash))
}

/// RFC 4648 base32hex, lowercase, without padding (alphabet 0-9 a-v).
fn base32hex_lower_no_pad(data: &[u8]) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuv";

    let mut result = String::new();
    let mut bits: u64 = 0;
    let mut num_bits: u32 = 0;

    for &byte in data {
        bits = (bits << 8) | (byte as u64);
        num_bits += 8;

        while num_bits >= 5 {
            num_bits -= 5;
            let idx = ((bits >> num_bits) & 0x1f) as usize;
            result.push(ALPHABET[idx] as char);
        }
    }

    if num_bits > 0 {
        let idx = ((bits << (5 - num_bits)) & 0x1f) as usize;
        result.push(ALPHABET[idx] as char);
    }

    result
}
