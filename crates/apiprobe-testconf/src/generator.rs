//! Configuration rule engine
//!
//! Builds a [`TestConfigurationDocument`] from an API description and a list
//! of filters. Each filter is applied independently, so a path matched by two
//! filters appears twice in the output.

use apiprobe_openapi::{ApiSpec, OperationSpec, PathSpec};
use apiprobe_utils::error::TestConfError;
use camino::Utf8Path;
use tracing::{debug, info, warn};

use crate::filter::Filter;
use crate::io;
use crate::model::{
    AuthSpec, Operation, PLACEHOLDER_OPERATION_ID, TestConfigurationDocument, TestParameter,
    TestPath,
};
use crate::rules::generator_for;

/// Expected status written for every generated operation
pub const DEFAULT_EXPECTED_RESPONSE: &str = "200";

/// Stateless builder of default test configurations
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigRuleEngine;

impl ConfigRuleEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the document and persist it to `destination`
    ///
    /// Persistence failures are logged and the in-memory document is still
    /// returned.
    ///
    /// # Errors
    /// Returns `TestConfError::UnsupportedParameterType` if any selected
    /// operation has a query/path parameter without a generator. Nothing is
    /// written in that case.
    pub fn generate(
        &self,
        spec: &ApiSpec,
        destination: &Utf8Path,
        filters: &[Filter],
    ) -> Result<TestConfigurationDocument, TestConfError> {
        let doc = self.build(spec, filters)?;

        match io::save(&doc, destination) {
            Ok(()) => info!(
                destination = %destination,
                test_paths = doc.test_paths().len(),
                "Wrote test configuration"
            ),
            Err(e) => warn!(
                destination = %destination,
                error = %e,
                "Failed to persist test configuration; continuing with in-memory document"
            ),
        }
        Ok(doc)
    }

    /// Build the document without touching the filesystem
    ///
    /// # Errors
    /// See [`ConfigRuleEngine::generate`].
    pub fn build(
        &self,
        spec: &ApiSpec,
        filters: &[Filter],
    ) -> Result<TestConfigurationDocument, TestConfError> {
        let mut test_paths = Vec::new();
        for filter in filters {
            for path in spec.paths.iter().filter(|p| filter.matches_path(&p.template)) {
                test_paths.push(test_path(path, filter)?);
            }
            debug!(filter = %filter, total_paths = test_paths.len(), "Applied filter");
        }
        Ok(TestConfigurationDocument::new(default_auth(), test_paths))
    }
}

/// Authentication section of a fresh document
///
/// Marked required with no parameters; users fill in credentials by hand.
#[must_use]
pub fn default_auth() -> AuthSpec {
    AuthSpec {
        required: true,
        header_params: Vec::new(),
        query_params: Vec::new(),
    }
}

fn test_path(path: &PathSpec, filter: &Filter) -> Result<TestPath, TestConfError> {
    let operations = path
        .operations_matching(|m| filter.accepts(m))
        .map(operation)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TestPath {
        test_path: path.template.clone(),
        operations,
    })
}

fn operation(op: &OperationSpec) -> Result<Operation, TestConfError> {
    let test_parameters = op
        .parameters
        .iter()
        .map(generator_for)
        .collect::<Result<Vec<TestParameter>, _>>()?;
    Ok(Operation {
        operation_id: op
            .operation_id
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_OPERATION_ID.to_string()),
        method: op.method.as_str().to_string(),
        test_parameters,
        expected_response: DEFAULT_EXPECTED_RESPONSE.to_string(),
    })
}
