//! CTR-concurrency-safety: read-modify-write cycles must carry the
//! declared conditional-write token.

use crate::rules::{Rule, RuleContext, ids};
use crate::violation::Violation;

/// Fires when the call site follows a read-then-write pattern against an
/// endpoint that declares a concurrency token header, and the client never
/// sends that header. Sending the token on any observed call suppresses
/// the finding.
pub struct ConcurrencySafety;

impl Rule for ConcurrencySafety {
    fn id(&self) -> &'static str {
        ids::CONCURRENCY_SAFETY
    }

    fn description(&self) -> &'static str {
        "Require conditional-write tokens on read-modify-write cycles"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        if !ctx.facts.read_modify_write {
            return Vec::new();
        }

        let headers = ctx.endpoint.concurrency_headers();
        if headers.is_empty() {
            return Vec::new();
        }

        let sends_token = headers.iter().any(|header| {
            ctx.facts
                .request
                .fields
                .contains_key(&format!("request.headers.{header}"))
        });
        if sends_token {
            return Vec::new();
        }

        vec![ctx.violation(
            self.id(),
            "",
            format!(
                "read-modify-write guarded by {}",
                headers.join(" or ")
            ),
            "unconditional write after a read",
            "Two concurrent callers doing blind read-then-write cycles silently lose one writer's update.",
        )]
    }
}
