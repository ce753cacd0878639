//! Concrete test cases flowing through the pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One concrete request plus the outcome it is expected to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub operation_id: String,
    /// Lower-case HTTP verb
    pub method: String,
    /// Path template, e.g. `/items/{id}`
    pub path: String,
    #[serde(default)]
    pub faulty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faulty_reason: Option<String>,
    #[serde(default)]
    pub query_parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub path_parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub header_parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub form_parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<String>,
}

impl TestCase {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        operation_id: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            operation_id: operation_id.into(),
            method: method.into(),
            path: path.into(),
            faulty: false,
            faulty_reason: None,
            query_parameters: BTreeMap::new(),
            path_parameters: BTreeMap::new(),
            header_parameters: BTreeMap::new(),
            form_parameters: BTreeMap::new(),
            body: None,
            expected_status: None,
        }
    }

    /// Mark the case as faulty with a reason
    #[must_use]
    pub fn faulty(mut self, reason: impl Into<String>) -> Self {
        self.faulty = true;
        self.faulty_reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_parameters.insert(name.into(), value.into());
        self
    }

    /// `"GET /items/{id}"`, used to key coverage
    #[must_use]
    pub fn operation_key(&self) -> String {
        format!("{} {}", self.method.to_ascii_uppercase(), self.path)
    }

    /// Column names of [`TestCase::to_csv_record`]
    #[must_use]
    pub fn csv_header() -> &'static str {
        "testCaseId,operationId,method,path,faulty,faultyReason,expectedStatus,queryParameters,pathParameters,headerParameters,formParameters,body"
    }

    /// One CSV line (without trailing newline)
    ///
    /// Parameter maps are flattened to `name=value` pairs joined by `;`.
    #[must_use]
    pub fn to_csv_record(&self) -> String {
        let fields = [
            self.id.clone(),
            self.operation_id.clone(),
            self.method.clone(),
            self.path.clone(),
            self.faulty.to_string(),
            self.faulty_reason.clone().unwrap_or_default(),
            self.expected_status.clone().unwrap_or_default(),
            flatten(&self.query_parameters),
            flatten(&self.path_parameters),
            flatten(&self.header_parameters),
            flatten(&self.form_parameters),
            self.body.clone().unwrap_or_default(),
        ];
        fields
            .iter()
            .map(|f| escape_csv(f))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn flatten(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Quote a field when it contains a delimiter, quote or line break
pub(crate) fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
