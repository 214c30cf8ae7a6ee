//! CTR-response-shape: response consumption discipline.

use crate::rules::{Rule, RuleContext, ids};
use crate::violation::Violation;

/// Flags required response fields the caller never reads, nullable fields
/// read without a null guard, and fields the client's result shape exposes
/// that the contract does not declare.
pub struct ResponseShape;

impl Rule for ResponseShape {
    fn id(&self) -> &'static str {
        ids::RESPONSE_SHAPE
    }

    fn description(&self) -> &'static str {
        "Require response fields to be consumed as the contract declares"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut out = Vec::new();

        for (path, field) in ctx.endpoint.response_fields() {
            let obs = ctx.facts.response.fields.get(&path);

            if field.required && !obs.is_some_and(|o| o.read) {
                out.push(ctx.violation(
                    self.id(),
                    path.clone(),
                    "required field read by the caller",
                    "field is never read",
                    format!(
                        "The producer guarantees {path} on every response; discarding it usually means the caller re-derives it elsewhere."
                    ),
                ));
                continue;
            }

            if field.nullable {
                if let Some(obs) = obs {
                    if obs.read && !obs.null_guard.holds() {
                        out.push(ctx.violation(
                            self.id(),
                            path.clone(),
                            "null guard before reading the nullable field",
                            "field is read without a null check",
                            format!(
                                "{path} is declared nullable; an unguarded read fails on the null case."
                            ),
                        ));
                    }
                }
            }
        }

        for extra in &ctx.facts.response.extra_fields {
            out.push(ctx.violation(
                self.id(),
                extra.clone(),
                "only contract-declared fields in the client result shape",
                "field has no contract counterpart",
                format!(
                    "{extra} does not exist in the producer's response; the client is inventing data."
                ),
            ));
        }

        out
    }
}
