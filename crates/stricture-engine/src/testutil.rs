//! Shared fixture builders for rule unit tests.

use crate::rules::{Rule, RuleContext};
use crate::violation::Violation;
use std::collections::BTreeSet;
use stricture_facts::EndpointFacts;
use stricture_manifest::{Contract, Endpoint, FieldKind, FieldSpec};

pub(crate) fn field(kind: FieldKind) -> FieldSpec {
    FieldSpec {
        kind,
        required: false,
        nullable: false,
        format: None,
        length: None,
        range: None,
        values: BTreeSet::new(),
        encoding: None,
        concurrency_token: false,
    }
}

pub(crate) fn required_field(kind: FieldKind) -> FieldSpec {
    FieldSpec {
        required: true,
        ..field(kind)
    }
}

pub(crate) fn endpoint(method: &str, path: &str, codes: &[u16]) -> Endpoint {
    Endpoint {
        path: path.to_string(),
        method: method.to_string(),
        request: Default::default(),
        response: Default::default(),
        status_codes: codes.iter().copied().collect(),
        error_shape: None,
        lifecycle: None,
        prerequisites: Vec::new(),
    }
}

pub(crate) fn contract_with(endpoint: Endpoint) -> Contract {
    Contract {
        id: "objects.v1".to_string(),
        producer: "object-store".to_string(),
        consumers: BTreeSet::new(),
        protocol: "http".to_string(),
        endpoints: vec![endpoint],
    }
}

/// Run a rule against the first endpoint of a contract.
pub(crate) fn check_first(
    rule: &dyn Rule,
    contract: &Contract,
    facts: &EndpointFacts,
) -> Vec<Violation> {
    let endpoint = &contract.endpoints[0];
    let endpoint_key = endpoint.key();
    rule.check(&RuleContext {
        contract,
        endpoint,
        endpoint_key: &endpoint_key,
        facts,
    })
}
