//! Static conformance checking of client behavior against API contracts.
//!
//! The engine joins a contract manifest with a behavioral model extracted
//! from a client and its tests, evaluates the rule catalogue, and emits a
//! deterministic, sorted violation report. It performs no I/O against the
//! described services and never executes the client; everything it knows
//! arrives in its two inputs.
//!
//! Evaluation is pure: the same manifest and behavioral model always
//! produce byte-identical reports, including finding IDs.

pub mod aggregate;
pub mod config;
pub mod lifecycle;
pub mod rules;
pub mod violation;

#[cfg(test)]
pub(crate) mod testutil;

use crate::config::EngineConfig;
use crate::rules::{Rule, RuleContext, default_rules};
use crate::violation::{Severity, Violation};
use serde::{Deserialize, Serialize};
use stricture_facts::{BehaviorModel, EndpointFacts};
use stricture_manifest::ManifestSet;

/// Aggregate counts for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub contracts: usize,
    pub endpoints: usize,
    /// Rules evaluated, including the protocol-group check.
    pub rules_run: usize,
    pub violations: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// The engine's complete output for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub client: String,
    pub summary: Summary,
    pub violations: Vec<Violation>,
}

impl Report {
    /// Whether anything at or above `floor` was found.
    pub fn has_findings_at(&self, floor: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= floor)
    }

    /// Keep only violations from the given rules and refresh the summary
    /// counters. Scope counters (contracts, endpoints, rules run) describe
    /// the evaluation and are left untouched.
    pub fn retain_rules(&mut self, keep: &std::collections::BTreeSet<String>) {
        self.violations.retain(|v| keep.contains(&v.rule_id));
        self.summary.violations = self.violations.len();
        self.summary.high = count_at(&self.violations, Severity::High);
        self.summary.medium = count_at(&self.violations, Severity::Medium);
        self.summary.low = count_at(&self.violations, Severity::Low);
    }
}

/// The conformance engine: a rule catalogue plus configuration.
pub struct Engine {
    rules: Vec<Box<dyn Rule>>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            rules: default_rules(),
            config,
        }
    }

    /// Evaluate every rule against every endpoint of every contract.
    ///
    /// Endpoints the extractor never observed run against empty facts, so
    /// absence of observation reads as absence of behavior.
    pub fn check(&self, manifest: &ManifestSet, model: &BehaviorModel) -> Report {
        let empty = EndpointFacts::default();
        let mut raw = Vec::new();
        let mut endpoints = 0usize;

        for contract in &manifest.contracts {
            for endpoint in &contract.endpoints {
                endpoints += 1;
                let endpoint_key = endpoint.key();
                let facts = model
                    .endpoint(&contract.id, &endpoint_key)
                    .unwrap_or(&empty);
                let ctx = RuleContext {
                    contract,
                    endpoint,
                    endpoint_key: &endpoint_key,
                    facts,
                };
                for rule in &self.rules {
                    raw.extend(rule.check(&ctx));
                }
            }
            raw.extend(lifecycle::check_lifecycle(contract, model));
        }

        let violations = aggregate::aggregate(raw, &self.config);
        let summary = Summary {
            contracts: manifest.contracts.len(),
            endpoints,
            rules_run: self.rules.len() + 1,
            violations: violations.len(),
            high: count_at(&violations, Severity::High),
            medium: count_at(&violations, Severity::Medium),
            low: count_at(&violations, Severity::Low),
        };

        Report {
            client: model.client.clone(),
            summary,
            violations,
        }
    }
}

fn count_at(violations: &[Violation], severity: Severity) -> usize {
    violations.iter().filter(|v| v.severity == severity).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stricture_facts::parse_facts;
    use stricture_manifest::parse_manifest;

    fn tiny_manifest() -> ManifestSet {
        parse_manifest(
            r#"{
              "manifestVersion": "1",
              "contracts": [{
                "id": "objects.v1",
                "producer": "object-store",
                "protocol": "http",
                "endpoints": [{
                  "path": "/objects/{key}",
                  "method": "GET",
                  "statusCodes": [200, 404]
                }]
              }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn empty_model_runs_fail_closed() {
        let engine = Engine::new(EngineConfig::default());
        let report = engine.check(&tiny_manifest(), &BehaviorModel::default());

        assert_eq!(report.summary.contracts, 1);
        assert_eq!(report.summary.endpoints, 1);
        assert_eq!(report.summary.rules_run, 10);
        // No boundary and no negative test against a 404-declaring endpoint.
        let rule_ids: Vec<&str> = report.violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert!(rule_ids.contains(&"CTR-status-code-handling"));
        assert!(rule_ids.contains(&"TQ-error-path-coverage"));
        assert!(rule_ids.contains(&"TQ-negative-cases"));
        assert_eq!(report.summary.violations, report.violations.len());
        assert!(report.has_findings_at(Severity::Medium));
    }

    #[test]
    fn reports_are_identical_across_runs() {
        let manifest = tiny_manifest();
        let model = parse_facts(r#"{"client": "sdk"}"#).unwrap();
        let engine = Engine::new(EngineConfig::default());

        let a = serde_json::to_string(&engine.check(&manifest, &model)).unwrap();
        let b = serde_json::to_string(&engine.check(&manifest, &model)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn retain_rules_filters_and_recounts() {
        let engine = Engine::new(EngineConfig::default());
        let mut report = engine.check(&tiny_manifest(), &BehaviorModel::default());
        assert!(report.summary.violations > 1);

        let keep: std::collections::BTreeSet<String> =
            ["TQ-negative-cases".to_string()].into_iter().collect();
        report.retain_rules(&keep);

        assert_eq!(report.summary.violations, 1);
        assert_eq!(report.violations[0].rule_id, "TQ-negative-cases");
        assert_eq!(report.summary.high, 0);
        assert_eq!(report.summary.medium, 1);
        // Scope counters still describe the full evaluation.
        assert_eq!(report.summary.rules_run, 10);
    }

    #[test]
    fn severity_counts_sum() {
        let engine = Engine::new(EngineConfig::default());
        let report = engine.check(&tiny_manifest(), &BehaviorModel::default());
        assert_eq!(
            report.summary.high + report.summary.medium + report.summary.low,
            report.summary.violations
        );
    }
}
