//! TQ-no-shallow-assertions: constrained fields deserve value assertions.

use crate::rules::{Rule, RuleContext, ids};
use crate::violation::Violation;
use std::collections::BTreeSet;

/// Fires for each constrained field that some test asserts on with a
/// presence/truthiness check only. A constrained field is one whose spec
/// declares more than bare presence, so a shallow assertion cannot
/// distinguish a conforming value from garbage.
pub struct NoShallowAssertions;

impl Rule for NoShallowAssertions {
    fn id(&self) -> &'static str {
        ids::NO_SHALLOW_ASSERTIONS
    }

    fn description(&self) -> &'static str {
        "Reject presence-only assertions on constrained fields"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let constrained: BTreeSet<String> = ctx
            .endpoint
            .request_fields()
            .into_iter()
            .chain(ctx.endpoint.response_fields())
            .filter(|(_, spec)| spec.is_constrained())
            .map(|(path, _)| path)
            .collect();

        let mut out = Vec::new();
        let mut seen = BTreeSet::new();

        for test in &ctx.facts.tests {
            for assertion in &test.assertions {
                if assertion.depth != stricture_facts::AssertionDepth::Shallow {
                    continue;
                }
                if !constrained.contains(&assertion.field_path) {
                    continue;
                }
                if !seen.insert(assertion.field_path.clone()) {
                    continue;
                }
                out.push(ctx.violation(
                    self.id(),
                    assertion.field_path.clone(),
                    "assertion on the field's value, format, or type",
                    "presence/truthiness check only",
                    format!(
                        "Test {:?} would pass with any non-empty value in {}.",
                        test.name, assertion.field_path
                    ),
                ));
            }
        }

        out
    }
}
