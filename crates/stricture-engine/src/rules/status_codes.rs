//! CTR-status-code-handling: distinct handling of declared error codes.

use crate::rules::{Rule, RuleContext, format_codes, ids};
use crate::violation::Violation;

/// Fires when declared non-2xx status codes are not branched on by the
/// caller. Without an affirmative error boundary the observed branch set
/// is discounted entirely: a `match` inside code that never runs on
/// failure handles nothing.
pub struct StatusCodeHandling;

impl Rule for StatusCodeHandling {
    fn id(&self) -> &'static str {
        ids::STATUS_CODE_HANDLING
    }

    fn description(&self) -> &'static str {
        "Require callers to branch on every declared non-success status"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let declared = ctx.endpoint.non_success_codes();
        if declared.is_empty() {
            return Vec::new();
        }

        let boundary = ctx.facts.error_handling.boundary;
        let unhandled: Vec<u16> = if boundary.holds() {
            declared
                .iter()
                .copied()
                .filter(|code| !ctx.facts.response.handled_statuses.contains(code))
                .collect()
        } else {
            declared
        };

        if unhandled.is_empty() {
            return Vec::new();
        }

        let observed = if boundary.holds() {
            format!(
                "caller branches on {} only",
                format_codes(
                    &ctx.facts
                        .response
                        .handled_statuses
                        .iter()
                        .copied()
                        .collect::<Vec<_>>()
                )
            )
        } else {
            "no error boundary at the call site".to_string()
        };

        vec![ctx.violation(
            self.id(),
            "",
            format!("distinct handling for statuses {}", format_codes(&unhandled)),
            observed,
            "Unbranched error statuses collapse into a generic failure the caller cannot recover from.",
        )]
    }
}
