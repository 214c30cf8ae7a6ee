use crate::support::{
    EXIT_FATAL, EXIT_VIOLATIONS, generated_at, load_config_or_exit, load_facts_or_exit,
    load_manifest_or_exit, parse_severity_or_exit, print_json,
};
use serde_json::json;
use std::collections::BTreeSet;
use stricture_engine::Engine;
use stricture_engine::rules::catalogue_ids;

pub fn run(
    manifest: String,
    facts: String,
    config: Option<String>,
    min_severity: String,
    rules: Vec<String>,
    json_output: bool,
) {
    let floor = parse_severity_or_exit(&min_severity);
    let rule_filter = validate_rule_filter_or_exit(&rules);
    let manifest_set = load_manifest_or_exit(&manifest);
    let model = load_facts_or_exit(&facts);
    let engine_config = load_config_or_exit(config.as_deref());

    let mut report = Engine::new(engine_config).check(&manifest_set, &model);
    if let Some(keep) = &rule_filter {
        report.retain_rules(keep);
    }
    let failed = report.has_findings_at(floor);

    if json_output {
        let payload = json!({
            "generatedAt": generated_at(),
            "manifestPath": manifest,
            "factsPath": facts,
            "minSeverity": floor.to_string(),
            "report": report,
        });
        print_json(&payload);
    } else {
        println!("stricture check --manifest {manifest} --facts {facts}");
        if !report.client.is_empty() {
            println!("  Client: {}", report.client);
        }
        println!(
            "  Scope: {} contract(s), {} endpoint(s), {} rule(s)",
            report.summary.contracts, report.summary.endpoints, report.summary.rules_run
        );
        println!(
            "  Violations: {} ({} high, {} medium, {} low)",
            report.summary.violations, report.summary.high, report.summary.medium, report.summary.low
        );
        for v in &report.violations {
            println!("  [{}] {} {}", v.severity, v.rule_id, v.finding_id);
            println!("    at {} {}", v.endpoint_id, v.field_path);
            println!("    expected: {}", v.expected);
            println!("    observed: {}", v.observed);
            println!("    {}", v.rationale);
        }
        println!(
            "  Result: {}",
            if failed { "violations found" } else { "clean" }
        );
    }

    if failed {
        std::process::exit(EXIT_VIOLATIONS);
    }
}

fn validate_rule_filter_or_exit(rules: &[String]) -> Option<BTreeSet<String>> {
    if rules.is_empty() {
        return None;
    }
    let known = catalogue_ids();
    for rule in rules {
        if !known.contains(&rule.as_str()) {
            eprintln!(
                "error: unknown rule id {rule:?}; known rules: {}",
                known.join(", ")
            );
            std::process::exit(EXIT_FATAL);
        }
    }
    Some(rules.iter().cloned().collect())
}
