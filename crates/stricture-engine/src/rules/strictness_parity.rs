//! CTR-strictness-parity: client-side validation must match the declared
//! constraints exactly.
//!
//! The rule only judges enforcement the extractor affirmatively observed.
//! A field with no guard and no narrowing evidence is silent here; the
//! shape rules cover outright absence.

use crate::rules::{Rule, RuleContext, ids};
use crate::violation::Violation;
use stricture_facts::{EnforcedConstraint, FieldObservation, GuardObservation};
use stricture_manifest::{FieldSpec, IntRange};

pub struct StrictnessParity;

impl Rule for StrictnessParity {
    fn id(&self) -> &'static str {
        ids::STRICTNESS_PARITY
    }

    fn description(&self) -> &'static str {
        "Require client-side validation to match declared constraints exactly"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut out = Vec::new();

        for (path, spec) in ctx.endpoint.request_fields() {
            let Some(obs) = ctx.facts.request.fields.get(&path) else {
                continue;
            };

            let mut mismatches = Vec::new();
            enum_parity(spec, obs, &mut mismatches);
            range_parity(spec, obs, &mut mismatches);
            length_parity(spec, obs, &mut mismatches);
            format_parity(spec, obs, &mut mismatches);

            if mismatches.is_empty() {
                continue;
            }

            out.push(ctx.violation(
                self.id(),
                path.clone(),
                "client validation identical to the declared constraint",
                mismatches.join("; "),
                format!(
                    "A laxer guard on {path} lets requests through that the producer rejects; a stricter one refuses values the contract permits."
                ),
            ));
        }

        out
    }
}

fn enforced(obs: &FieldObservation) -> Option<&EnforcedConstraint> {
    match &obs.guard {
        Some(GuardObservation {
            evidence,
            constraint: Some(constraint),
        }) if evidence.holds() => Some(constraint),
        _ => None,
    }
}

fn enum_parity(spec: &FieldSpec, obs: &FieldObservation, mismatches: &mut Vec<String>) {
    if spec.values.is_empty() {
        return;
    }
    let Some(EnforcedConstraint::Values { values }) = enforced(obs) else {
        return;
    };

    let missing: Vec<&str> = spec
        .values
        .difference(values)
        .map(String::as_str)
        .collect();
    let extra: Vec<&str> = values
        .difference(&spec.values)
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        mismatches.push(format!(
            "guard rejects declared values {}",
            missing.join(", ")
        ));
    }
    if !extra.is_empty() {
        mismatches.push(format!(
            "guard accepts undeclared values {}",
            extra.join(", ")
        ));
    }
}

fn range_parity(spec: &FieldSpec, obs: &FieldObservation, mismatches: &mut Vec<String>) {
    let Some(declared) = spec.range else {
        return;
    };

    // A narrowing conversion downstream of the guard overrides whatever
    // the guard nominally accepts.
    let observed: Option<IntRange> = obs.effective_range.or_else(|| match enforced(obs) {
        Some(EnforcedConstraint::Range { min, max }) => Some(IntRange {
            min: *min,
            max: *max,
        }),
        _ => None,
    });

    if let Some(observed) = observed {
        if observed != declared {
            mismatches.push(format!(
                "declared range {declared}, enforced range {observed}"
            ));
        }
    }
}

fn length_parity(spec: &FieldSpec, obs: &FieldObservation, mismatches: &mut Vec<String>) {
    let Some(declared) = spec.length else {
        return;
    };
    let Some(EnforcedConstraint::Length { min, max }) = enforced(obs) else {
        return;
    };

    if *min != declared.min || *max != declared.max {
        mismatches.push(format!(
            "declared length {declared}, enforced length [{min}, {max}]"
        ));
    }
}

fn format_parity(spec: &FieldSpec, obs: &FieldObservation, mismatches: &mut Vec<String>) {
    let Some(declared) = &spec.format else {
        return;
    };
    let Some(EnforcedConstraint::Format { format }) = enforced(obs) else {
        return;
    };

    if format != &declared.id() {
        mismatches.push(format!(
            "declared format {}, guard checks {format}",
            declared.id()
        ));
    }
}
