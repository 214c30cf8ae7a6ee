//! The rule catalogue.
//!
//! Each rule is a pure evaluator from (endpoint contract, behavioral
//! facts) to zero or more violations, independent of evaluation order and
//! of every other rule's output. Rules never raise: well-formed input that
//! does not trigger the condition yields an empty list.
//!
//! One module per rule; `CTR-lifecycle-incomplete` lives in
//! [`crate::lifecycle`] because it runs once per protocol group rather
//! than per endpoint.

mod concurrency_safety;
mod error_path_coverage;
mod manifest_conformance;
mod negative_cases;
mod request_shape;
mod response_shape;
mod shallow_assertions;
mod status_codes;
mod strictness_parity;

pub use concurrency_safety::ConcurrencySafety;
pub use error_path_coverage::ErrorPathCoverage;
pub use manifest_conformance::ManifestConformance;
pub use negative_cases::NegativeCases;
pub use request_shape::RequestShape;
pub use response_shape::ResponseShape;
pub use shallow_assertions::NoShallowAssertions;
pub use status_codes::StatusCodeHandling;
pub use strictness_parity::StrictnessParity;

use crate::violation::Violation;
use stricture_facts::EndpointFacts;
use stricture_manifest::{Contract, Endpoint};

/// Rule ID constants.
pub mod ids {
    pub const REQUEST_SHAPE: &str = "CTR-request-shape";
    pub const RESPONSE_SHAPE: &str = "CTR-response-shape";
    pub const STATUS_CODE_HANDLING: &str = "CTR-status-code-handling";
    pub const STRICTNESS_PARITY: &str = "CTR-strictness-parity";
    pub const MANIFEST_CONFORMANCE: &str = "CTR-manifest-conformance";
    pub const LIFECYCLE_INCOMPLETE: &str = "CTR-lifecycle-incomplete";
    pub const CONCURRENCY_SAFETY: &str = "CTR-concurrency-safety";
    pub const ERROR_PATH_COVERAGE: &str = "TQ-error-path-coverage";
    pub const NO_SHALLOW_ASSERTIONS: &str = "TQ-no-shallow-assertions";
    pub const NEGATIVE_CASES: &str = "TQ-negative-cases";
}

/// Everything a per-endpoint rule may look at.
pub struct RuleContext<'a> {
    pub contract: &'a Contract,
    pub endpoint: &'a Endpoint,
    /// Precomputed `endpoint.key()`.
    pub endpoint_key: &'a str,
    /// Facts for this endpoint; empty defaults when the extractor never
    /// saw the call site (fail-closed).
    pub facts: &'a EndpointFacts,
}

impl RuleContext<'_> {
    /// Shorthand for building a violation bound to this endpoint.
    pub fn violation(
        &self,
        rule_id: &str,
        field_path: impl Into<String>,
        expected: impl Into<String>,
        observed: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Violation {
        Violation::new(
            rule_id,
            self.contract.id.clone(),
            self.endpoint_key,
            field_path,
            expected,
            observed,
            rationale,
        )
    }
}

/// A rule in the catalogue.
pub trait Rule {
    /// Unique rule identifier, e.g. `CTR-request-shape`.
    fn id(&self) -> &'static str;

    /// One-line description for the catalogue listing.
    fn description(&self) -> &'static str;

    /// Evaluate against one endpoint. Total; never raises.
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation>;
}

/// The full per-endpoint catalogue, in a fixed registration order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(RequestShape),
        Box::new(ResponseShape),
        Box::new(StatusCodeHandling),
        Box::new(StrictnessParity),
        Box::new(ManifestConformance),
        Box::new(ConcurrencySafety),
        Box::new(ErrorPathCoverage),
        Box::new(NoShallowAssertions),
        Box::new(NegativeCases),
    ]
}

/// Every rule ID the engine knows, including the protocol-group rule.
/// Config validation and the CLI catalogue listing key off this.
pub fn catalogue_ids() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = default_rules().iter().map(|rule| rule.id()).collect();
    all.push(ids::LIFECYCLE_INCOMPLETE);
    all.sort_unstable();
    all
}

/// Format a status-code set for messages: `403, 404, 500`.
pub(crate) fn format_codes(codes: &[u16]) -> String {
    codes
        .iter()
        .map(|code| code.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
