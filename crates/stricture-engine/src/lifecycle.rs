//! CTR-lifecycle-incomplete: multi-step protocol traversals must reach a
//! completing milestone.
//!
//! This check runs once per protocol group rather than per endpoint, so it
//! lives outside the [`crate::rules`] catalogue. Findings use the synthetic
//! endpoint ID `lifecycle/<protocol>`.

use crate::rules::ids;
use crate::violation::Violation;
use std::collections::BTreeMap;
use stricture_facts::BehaviorModel;
use stricture_manifest::{Contract, LifecycleRole};

/// One declared milestone of a protocol group.
#[derive(Debug, Clone)]
struct Milestone {
    step: String,
    order: u32,
    role: LifecycleRole,
}

/// Declared protocol groups of a contract: protocol id to milestones in
/// ascending order.
fn protocol_groups(contract: &Contract) -> BTreeMap<String, Vec<Milestone>> {
    let mut groups: BTreeMap<String, Vec<Milestone>> = BTreeMap::new();
    for endpoint in &contract.endpoints {
        if let Some(lifecycle) = &endpoint.lifecycle {
            groups
                .entry(lifecycle.protocol.clone())
                .or_default()
                .push(Milestone {
                    step: lifecycle.step.clone(),
                    order: lifecycle.order,
                    role: lifecycle.role,
                });
        }
    }
    for milestones in groups.values_mut() {
        milestones.sort_by_key(|m| m.order);
    }
    groups
}

/// Check every protocol group of a contract against the observed
/// traversals. A group with no observed calls at all is not a finding;
/// the client may simply never use that protocol.
pub fn check_lifecycle(contract: &Contract, facts: &BehaviorModel) -> Vec<Violation> {
    let mut out = Vec::new();

    for (protocol, milestones) in protocol_groups(contract) {
        let trace = facts
            .lifecycle
            .get(&protocol)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        if trace.is_empty() {
            continue;
        }

        let completes = trace.iter().any(|step| {
            milestones.iter().any(|m| {
                m.step == *step
                    && matches!(m.role, LifecycleRole::Terminal | LifecycleRole::Abort)
            })
        });
        if completes {
            continue;
        }

        let reached: Vec<&str> = trace.iter().map(String::as_str).collect();
        let remaining: Vec<&str> = milestones
            .iter()
            .filter(|m| !trace.iter().any(|step| step == &m.step))
            .map(|m| m.step.as_str())
            .collect();

        out.push(Violation::new(
            ids::LIFECYCLE_INCOMPLETE,
            contract.id.clone(),
            format!("lifecycle/{protocol}"),
            "",
            format!(
                "traversal of {protocol} ending at a terminal or abort step"
            ),
            format!(
                "calls reach {} and stop; never called: {}",
                reached.join(" -> "),
                remaining.join(", ")
            ),
            "A protocol left mid-flight leaks whatever the completing step would have released or cleaned up.",
        ));
    }

    out
}
