//! Test configuration document
//!
//! Field names follow the YAML layout consumed by test-case generators:
//!
//! ```yaml
//! auth:
//!   required: true
//!   headerParams: []
//!   queryParams: []
//! testConfiguration:
//!   testPaths:
//!     - testPath: /items/{id}
//!       operations:
//!         - operationId: getItem
//!           method: get
//!           testParameters:
//!             - name: id
//!               generator:
//!                 type: RandomNumber
//!                 genParameters:
//!                   - name: type
//!                     values: [integer]
//!           expectedResponse: "200"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation id written when the API description declares none
pub const PLACEHOLDER_OPERATION_ID: &str = "<SET OPERATION ID>";

/// Root of a test configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfigurationDocument {
    pub auth: AuthSpec,
    pub test_configuration: TestConfiguration,
}

impl TestConfigurationDocument {
    #[must_use]
    pub fn new(auth: AuthSpec, test_paths: Vec<TestPath>) -> Self {
        Self {
            auth,
            test_configuration: TestConfiguration { test_paths },
        }
    }

    #[must_use]
    pub fn test_paths(&self) -> &[TestPath] {
        &self.test_configuration.test_paths
    }

    /// Every operation across all test paths, in document order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.test_configuration
            .test_paths
            .iter()
            .flat_map(|p| p.operations.iter())
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        self.test_configuration
            .test_paths
            .iter_mut()
            .flat_map(|p| p.operations.iter_mut())
    }
}

/// Authentication settings attached to every request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSpec {
    pub required: bool,
    #[serde(default)]
    pub header_params: Vec<HeaderParam>,
    #[serde(default)]
    pub query_params: Vec<QueryParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfiguration {
    #[serde(default)]
    pub test_paths: Vec<TestPath>,
}

/// One path template and the operations to test on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPath {
    pub test_path: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: String,
    /// Lower-case HTTP verb
    pub method: String,
    #[serde(default)]
    pub test_parameters: Vec<TestParameter>,
    pub expected_response: String,
}

impl Operation {
    /// Whether any parameter is generated by a semantic generator
    #[must_use]
    pub fn has_semantic_parameters(&self) -> bool {
        self.test_parameters
            .iter()
            .any(|p| p.generator.kind.is_semantic())
    }
}

/// One parameter and how its values are produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParameter {
    pub name: String,
    /// Inclusion probability; absent means the parameter is always sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    pub generator: GeneratorSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorSpec {
    #[serde(rename = "type")]
    pub kind: GeneratorKind,
    #[serde(default)]
    pub gen_parameters: Vec<GenParameter>,
}

impl GeneratorSpec {
    #[must_use]
    pub fn new(kind: GeneratorKind) -> Self {
        Self {
            kind,
            gen_parameters: Vec::new(),
        }
    }

    /// Append a named sub-parameter
    #[must_use]
    pub fn with_param<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gen_parameters.push(GenParameter {
            name: name.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&GenParameter> {
        self.gen_parameters.iter().find(|p| p.name == name)
    }

    /// Values of a sub-parameter, empty when it is not present
    #[must_use]
    pub fn values_of(&self, name: &str) -> &[String] {
        self.param(name).map(|p| p.values.as_slice()).unwrap_or(&[])
    }

    /// Replace the values of `name`, adding the sub-parameter if needed
    pub fn set_values(&mut self, name: &str, values: Vec<String>) {
        match self.gen_parameters.iter_mut().find(|p| p.name == name) {
            Some(param) => param.values = values,
            None => self.gen_parameters.push(GenParameter {
                name: name.to_string(),
                values,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenParameter {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Input generator family
///
/// Unknown names survive a load/save cycle as [`GeneratorKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeneratorKind {
    RandomEnglishWord,
    RandomNumber,
    RandomBoolean,
    RandomInputValue,
    SemanticParameter,
    Other(String),
}

impl GeneratorKind {
    pub const SEMANTIC_MARKER: &'static str = "SemanticParameter";

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::RandomEnglishWord => "RandomEnglishWord",
            Self::RandomNumber => "RandomNumber",
            Self::RandomBoolean => "RandomBoolean",
            Self::RandomInputValue => "RandomInputValue",
            Self::SemanticParameter => Self::SEMANTIC_MARKER,
            Self::Other(name) => name,
        }
    }

    /// Semantic marker match, ignoring ASCII case
    #[must_use]
    pub fn is_semantic(&self) -> bool {
        self.as_str().eq_ignore_ascii_case(Self::SEMANTIC_MARKER)
    }
}

impl From<String> for GeneratorKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "RandomEnglishWord" => Self::RandomEnglishWord,
            "RandomNumber" => Self::RandomNumber,
            "RandomBoolean" => Self::RandomBoolean,
            "RandomInputValue" => Self::RandomInputValue,
            "SemanticParameter" => Self::SemanticParameter,
            _ => Self::Other(name),
        }
    }
}

impl From<GeneratorKind> for String {
    fn from(kind: GeneratorKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
