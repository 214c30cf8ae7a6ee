//! CTR-request-shape: required request fields and call preconditions.

use crate::rules::{Rule, RuleContext, ids};
use crate::violation::Violation;

/// Fires once per required request field/header the client never
/// populates, and once per declared call prerequisite it never checks.
pub struct RequestShape;

impl Rule for RequestShape {
    fn id(&self) -> &'static str {
        ids::REQUEST_SHAPE
    }

    fn description(&self) -> &'static str {
        "Require the client request shape to match the contract"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut out = Vec::new();

        for (path, field) in ctx.endpoint.request_fields() {
            if !field.required {
                continue;
            }
            if ctx.facts.request.fields.contains_key(&path) {
                continue;
            }
            out.push(ctx.violation(
                self.id(),
                path.clone(),
                format!("required {} field populated on every call", field.kind),
                "field is never populated by the client",
                format!(
                    "Calls omitting the required field {path} are rejected by the producer at runtime."
                ),
            ));
        }

        for prerequisite in &ctx.endpoint.prerequisites {
            if ctx
                .facts
                .request
                .checked_prerequisites
                .contains(prerequisite)
            {
                continue;
            }
            out.push(ctx.violation(
                self.id(),
                format!("prerequisites.{prerequisite}"),
                format!("{prerequisite} verified before invoking the call"),
                "no pre-call check observed",
                format!(
                    "Invoking this operation without checking {prerequisite} fails in a way the caller cannot attribute."
                ),
            ));
        }

        out
    }
}
