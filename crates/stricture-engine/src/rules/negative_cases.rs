//! TQ-negative-cases: endpoints with rejectable inputs need at least one
//! negative test.

use crate::rules::{Rule, RuleContext, ids};
use crate::violation::Violation;
use stricture_facts::TestKind;

/// Fires once per endpoint that declares error statuses or validated
/// request fields yet has no test classified as negative.
pub struct NegativeCases;

impl Rule for NegativeCases {
    fn id(&self) -> &'static str {
        ids::NEGATIVE_CASES
    }

    fn description(&self) -> &'static str {
        "Require a negative test where the contract can reject input"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let has_negative = ctx
            .facts
            .tests
            .iter()
            .any(|test| test.kind == TestKind::Negative);
        if has_negative {
            return Vec::new();
        }

        let rejectable = !ctx.endpoint.non_success_codes().is_empty()
            || ctx.endpoint.request_fields().iter().any(|(_, spec)| {
                spec.format.is_some() || spec.range.is_some() || !spec.values.is_empty()
            });
        if !rejectable {
            return Vec::new();
        }

        vec![ctx.violation(
            self.id(),
            "",
            "at least one negative test case",
            format!("{} test cases, all happy-path", ctx.facts.tests.len()),
            "A suite that only exercises acceptance never learns what the producer rejects.",
        )]
    }
}
