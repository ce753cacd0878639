use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// HTTP verbs an OpenAPI path item can declare
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Lower-case verb as written in documents
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

/// Where a parameter travels in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    Body,
    FormData,
    /// OpenAPI 3 only
    Cookie,
}

impl ParameterLocation {
    /// Query and path parameters are the ones that get typed generators
    #[must_use]
    pub const fn is_query_or_path(self) -> bool {
        matches!(self, Self::Query | Self::Path)
    }
}

/// Declared type of a parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    /// Array with its item type, when declared
    Array(Option<Box<ParamType>>),
    /// Any other declared type (`object`, `file`, a missing type)
    Other(String),
}

impl ParamType {
    /// Map an OpenAPI `type` keyword
    #[must_use]
    pub fn from_keyword(keyword: Option<&str>, items: Option<ParamType>) -> Self {
        match keyword {
            Some("string") => Self::String,
            Some("number") => Self::Number,
            Some("integer") => Self::Integer,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array(items.map(Box::new)),
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other("unspecified".to_string()),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array(_) => write!(f, "array"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// One declared parameter, flattened from either document version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParameterLocation,
    pub declared_type: ParamType,
    /// Values of the parameter's own `enum`, as strings
    pub enum_values: Vec<String>,
    pub required: bool,
}

impl ParameterDescriptor {
    /// Convenience constructor for a parameter without an enumeration
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        declared_type: ParamType,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            declared_type,
            enum_values: Vec::new(),
            required,
        }
    }

    #[must_use]
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// One operation of a path, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
}

/// One path template and its operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub template: String,
    pub operations: Vec<OperationSpec>,
}

impl PathSpec {
    /// Operations whose verb is accepted by `keep`, in declaration order
    pub fn operations_matching<'a, F>(&'a self, keep: F) -> impl Iterator<Item = &'a OperationSpec>
    where
        F: Fn(HttpMethod) -> bool + 'a,
    {
        self.operations.iter().filter(move |op| keep(op.method))
    }
}

/// Loaded API description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSpec {
    /// `info.title`
    pub title: String,
    /// `info.version`
    pub version: Option<String>,
    pub paths: Vec<PathSpec>,
}

impl ApiSpec {
    /// Find a path by exact template
    #[must_use]
    pub fn path(&self, template: &str) -> Option<&PathSpec> {
        self.paths.iter().find(|p| p.template == template)
    }

    /// Total number of operations across all paths
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|p| p.operations.len()).sum()
    }
}
