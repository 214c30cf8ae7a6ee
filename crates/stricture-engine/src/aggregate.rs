//! Violation aggregation: severity table, config application,
//! deduplication, and deterministic ordering.

use crate::config::EngineConfig;
use crate::rules::ids;
use crate::violation::{Severity, Violation};

/// The fixed severity table. Contract rules are high, test-quality rules
/// medium; config may override per rule.
pub fn severity_for(rule_id: &str) -> Severity {
    match rule_id {
        ids::REQUEST_SHAPE
        | ids::RESPONSE_SHAPE
        | ids::STATUS_CODE_HANDLING
        | ids::STRICTNESS_PARITY
        | ids::MANIFEST_CONFORMANCE
        | ids::LIFECYCLE_INCOMPLETE
        | ids::CONCURRENCY_SAFETY => Severity::High,
        ids::ERROR_PATH_COVERAGE | ids::NO_SHALLOW_ASSERTIONS | ids::NEGATIVE_CASES => {
            Severity::Medium
        }
        _ => Severity::Low,
    }
}

/// Filter, re-severity, sort, and dedupe raw rule output.
///
/// Deduplication keys on (ruleId, contractId, endpointId, fieldPath); the
/// first finding in sorted order wins. Sorting before deduping makes the
/// survivor independent of rule evaluation order.
pub fn aggregate(mut violations: Vec<Violation>, config: &EngineConfig) -> Vec<Violation> {
    violations.retain(|v| !config.is_disabled(&v.rule_id));

    for violation in &mut violations {
        if let Some(severity) = config.severity_override(&violation.rule_id) {
            violation.severity = severity;
        }
    }

    violations.sort();
    violations.dedup_by(|next, kept| next.dedupe_key() == kept.dedupe_key());
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn v(rule: &str, contract: &str, endpoint: &str, path: &str) -> Violation {
        Violation::new(rule, contract, endpoint, path, "x", "y", "r")
    }

    #[test]
    fn severity_table_bands() {
        assert_eq!(severity_for(ids::REQUEST_SHAPE), Severity::High);
        assert_eq!(severity_for(ids::LIFECYCLE_INCOMPLETE), Severity::High);
        assert_eq!(severity_for(ids::NEGATIVE_CASES), Severity::Medium);
    }

    #[test]
    fn sorted_and_deduped() {
        let raw = vec![
            v(ids::RESPONSE_SHAPE, "b", "GET /x", "f"),
            v(ids::REQUEST_SHAPE, "a", "GET /x", "f"),
            v(ids::REQUEST_SHAPE, "a", "GET /x", "f"),
        ];
        let out = aggregate(raw, &EngineConfig::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].contract_id, "a");
        assert_eq!(out[1].contract_id, "b");
    }

    #[test]
    fn dedupe_keeps_distinct_field_paths() {
        let raw = vec![
            v(ids::REQUEST_SHAPE, "a", "GET /x", "request.body.one"),
            v(ids::REQUEST_SHAPE, "a", "GET /x", "request.body.two"),
        ];
        assert_eq!(aggregate(raw, &EngineConfig::default()).len(), 2);
    }

    #[test]
    fn disabled_rule_filtered() {
        let config = parse_config(
            r#"
            [rules]
            "CTR-request-shape" = "off"
            "#,
            "<inline>",
        )
        .unwrap();
        let raw = vec![
            v(ids::REQUEST_SHAPE, "a", "GET /x", "f"),
            v(ids::RESPONSE_SHAPE, "a", "GET /x", "f"),
        ];
        let out = aggregate(raw, &config);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rule_id, ids::RESPONSE_SHAPE);
    }

    #[test]
    fn severity_override_applied() {
        let config = parse_config(
            r#"
            [rules]
            "TQ-negative-cases" = "high"
            "#,
            "<inline>",
        )
        .unwrap();
        let out = aggregate(vec![v(ids::NEGATIVE_CASES, "a", "GET /x", "")], &config);
        assert_eq!(out[0].severity, Severity::High);
    }

    #[test]
    fn idempotent() {
        let raw = vec![
            v(ids::RESPONSE_SHAPE, "b", "GET /x", "f"),
            v(ids::REQUEST_SHAPE, "a", "GET /x", "f"),
        ];
        let once = aggregate(raw, &EngineConfig::default());
        let twice = aggregate(once.clone(), &EngineConfig::default());
        assert_eq!(once, twice);
    }
}
