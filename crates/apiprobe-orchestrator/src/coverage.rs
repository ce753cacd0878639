//! Cumulative coverage of generated test suites

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::test_case::TestCase;

/// Append-only accumulator fed by every run of one orchestrator
///
/// Input coverage tracks which operations and parameters the suites
/// exercised; output coverage tracks the expected status codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMeter {
    suites: usize,
    test_cases: usize,
    faulty: usize,
    operations: BTreeMap<String, usize>,
    parameters: BTreeMap<String, BTreeSet<String>>,
    status_codes: BTreeMap<String, usize>,
}

impl CoverageMeter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one suite
    pub fn add_test_suite(&mut self, cases: &[TestCase]) {
        self.suites += 1;
        for case in cases {
            self.test_cases += 1;
            if case.faulty {
                self.faulty += 1;
            }

            let key = case.operation_key();
            *self.operations.entry(key.clone()).or_default() += 1;

            let params = self.parameters.entry(key).or_default();
            for (location, map) in [
                ("query", &case.query_parameters),
                ("path", &case.path_parameters),
                ("header", &case.header_parameters),
                ("formData", &case.form_parameters),
            ] {
                params.extend(map.keys().map(|name| format!("{location}:{name}")));
            }
            if case.body.is_some() {
                params.insert("body".to_string());
            }

            if let Some(status) = &case.expected_status {
                *self.status_codes.entry(status.clone()).or_default() += 1;
            }
        }
    }

    #[must_use]
    pub fn suites(&self) -> usize {
        self.suites
    }

    #[must_use]
    pub fn test_cases(&self) -> usize {
        self.test_cases
    }

    #[must_use]
    pub fn faulty(&self) -> usize {
        self.faulty
    }

    /// Distinct operations covered
    #[must_use]
    pub fn operations_covered(&self) -> usize {
        self.operations.len()
    }

    /// Distinct `location:name` parameters used by `operation_key`
    #[must_use]
    pub fn parameters_of(&self, operation_key: &str) -> Option<&BTreeSet<String>> {
        self.parameters.get(operation_key)
    }

    #[must_use]
    pub fn status_codes(&self) -> &BTreeMap<String, usize> {
        &self.status_codes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites == 0
    }
}
