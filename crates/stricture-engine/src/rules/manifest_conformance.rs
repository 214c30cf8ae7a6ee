//! CTR-manifest-conformance: values sent on the wire match the declared
//! type and format.

use crate::rules::{Rule, RuleContext, ids};
use crate::violation::Violation;
use stricture_facts::ObservedType;
use stricture_manifest::FieldKind;

/// Flags request fields whose produced type contradicts the declared kind,
/// and declared-format fields the client transforms before sending.
pub struct ManifestConformance;

impl Rule for ManifestConformance {
    fn id(&self) -> &'static str {
        ids::MANIFEST_CONFORMANCE
    }

    fn description(&self) -> &'static str {
        "Require outgoing values to carry the declared type and format"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut out = Vec::new();

        for (path, spec) in ctx.endpoint.request_fields() {
            let Some(obs) = ctx.facts.request.fields.get(&path) else {
                continue;
            };

            let mut mismatches = Vec::new();

            if let Some(observed) = obs.observed_type {
                if !kind_matches(spec.kind, observed) {
                    mismatches.push(format!(
                        "declared type {}, client produces {observed}",
                        spec.kind
                    ));
                }
            }

            if let (Some(format), Some(transform)) = (&spec.format, &obs.format_transform) {
                mismatches.push(format!(
                    "declared format {}, client applies transform {transform:?} before sending",
                    format.id()
                ));
            }

            if mismatches.is_empty() {
                continue;
            }

            out.push(ctx.violation(
                self.id(),
                path.clone(),
                "wire value matching the declared type and format",
                mismatches.join("; "),
                format!(
                    "The producer parses {path} per its declaration; a reshaped value is rejected or silently misread."
                ),
            ));
        }

        out
    }
}

/// Wire compatibility between a declared kind and a produced type.
/// Enums travel as strings.
fn kind_matches(declared: FieldKind, observed: ObservedType) -> bool {
    matches!(
        (declared, observed),
        (FieldKind::String, ObservedType::String)
            | (FieldKind::Integer, ObservedType::Integer)
            | (FieldKind::Enum, ObservedType::String)
            | (FieldKind::Array, ObservedType::Array)
            | (FieldKind::Object, ObservedType::Object)
    )
}
