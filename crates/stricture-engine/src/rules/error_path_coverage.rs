//! TQ-error-path-coverage: every declared error status needs a test.

use crate::rules::{Rule, RuleContext, format_codes, ids};
use crate::violation::Violation;
use std::collections::BTreeSet;

/// Fires once per endpoint whose declared non-2xx statuses are not all
/// exercised somewhere in the test suite, listing the untested codes.
pub struct ErrorPathCoverage;

impl Rule for ErrorPathCoverage {
    fn id(&self) -> &'static str {
        ids::ERROR_PATH_COVERAGE
    }

    fn description(&self) -> &'static str {
        "Require tests to exercise every declared non-success status"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let declared = ctx.endpoint.non_success_codes();
        if declared.is_empty() {
            return Vec::new();
        }

        let tested: BTreeSet<u16> = ctx
            .facts
            .tests
            .iter()
            .flat_map(|test| test.statuses.iter().copied())
            .collect();

        let untested: Vec<u16> = declared
            .into_iter()
            .filter(|code| !tested.contains(code))
            .collect();
        if untested.is_empty() {
            return Vec::new();
        }

        vec![ctx.violation(
            self.id(),
            "",
            format!("tests covering statuses {}", format_codes(&untested)),
            format!("{} test cases, none exercising them", ctx.facts.tests.len()),
            "An untested error path is the first place a contract drift goes unnoticed.",
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{check_first, contract_with, endpoint};
    use stricture_facts::{EndpointFacts, TestCase, TestKind};

    fn test_case(name: &str, kind: TestKind, statuses: &[u16]) -> TestCase {
        TestCase {
            name: name.to_string(),
            kind,
            statuses: statuses.iter().copied().collect(),
            assertions: Vec::new(),
        }
    }

    #[test]
    fn untested_codes_listed_in_one_violation() {
        let contract = contract_with(endpoint("GET", "/objects/{key}", &[200, 403, 404, 500]));
        let facts = EndpointFacts {
            tests: vec![test_case("get_ok", TestKind::Happy, &[200])],
            ..Default::default()
        };

        let violations = check_first(&ErrorPathCoverage, &contract, &facts);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].expected.contains("403, 404, 500"));
    }

    #[test]
    fn coverage_across_multiple_tests_counts() {
        let contract = contract_with(endpoint("GET", "/objects/{key}", &[200, 403, 404]));
        let facts = EndpointFacts {
            tests: vec![
                test_case("get_forbidden", TestKind::Negative, &[403]),
                test_case("get_missing", TestKind::Negative, &[404]),
            ],
            ..Default::default()
        };
        assert!(check_first(&ErrorPathCoverage, &contract, &facts).is_empty());
    }

    #[test]
    fn no_declared_error_codes_is_clean() {
        let contract = contract_with(endpoint("GET", "/ping", &[200]));
        assert!(
            check_first(&ErrorPathCoverage, &contract, &EndpointFacts::default()).is_empty()
        );
    }
}
