use once_cell::sync::Lazy;
use regex::Regex;

use apiprobe_testconf::{Operation, TestParameter};
use apiprobe_utils::error::GroundingError;

/// Generator sub-parameter listing the predicates to follow
pub const PREDICATES_PARAM: &str = "predicates";

/// Generator sub-parameter receiving grounded values
pub const VALUES_PARAM: &str = "values";

const PREFIXES: &str = "\
PREFIX dbo: <http://dbpedia.org/ontology/>
PREFIX dbp: <http://dbpedia.org/property/>
PREFIX dbr: <http://dbpedia.org/resource/>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
";

static PREFIXED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*:[A-Za-z0-9_][A-Za-z0-9_.-]*$")
        .expect("valid prefixed name pattern")
});

static FULL_IRI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^<[^<>"{}|^`\\\s]+>$"#).expect("valid IRI pattern"));

/// Builds the knowledge-base query for one semantic parameter
pub trait QueryBuilder: Send + Sync {
    /// # Errors
    /// Returns `GroundingError::QueryBuild` when no query can be formed.
    fn build(&self, operation: &Operation, parameter: &TestParameter)
    -> Result<String, GroundingError>;
}

/// SPARQL builder driven by the parameter's `predicates` list
///
/// Every predicate contributes one `UNION` branch; objects that are resources
/// are replaced by their English label when one exists.
#[derive(Debug, Clone)]
pub struct PredicateQueryBuilder {
    limit: u32,
}

impl PredicateQueryBuilder {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }
}

impl Default for PredicateQueryBuilder {
    fn default() -> Self {
        Self::new(100)
    }
}

impl QueryBuilder for PredicateQueryBuilder {
    fn build(
        &self,
        operation: &Operation,
        parameter: &TestParameter,
    ) -> Result<String, GroundingError> {
        let fail = |reason: String| GroundingError::QueryBuild {
            operation: operation.operation_id.clone(),
            parameter: parameter.name.clone(),
            reason,
        };

        let predicates = parameter.generator.values_of(PREDICATES_PARAM);
        if predicates.is_empty() {
            return Err(fail(format!(
                "no '{PREDICATES_PARAM}' declared for the semantic generator"
            )));
        }
        if let Some(bad) = predicates
            .iter()
            .find(|p| !PREFIXED_NAME.is_match(p) && !FULL_IRI.is_match(p))
        {
            return Err(fail(format!("'{bad}' is not a prefixed name or <IRI>")));
        }

        let branches: Vec<String> = predicates
            .iter()
            .map(|p| format!("{{ ?subject {p} ?object }}"))
            .collect();

        Ok(format!(
            "{PREFIXES}SELECT DISTINCT ?value WHERE {{\n  {}\n  OPTIONAL {{ ?object rdfs:label ?label . FILTER(langMatches(lang(?label), \"en\")) }}\n  BIND(STR(COALESCE(?label, ?object)) AS ?value)\n}}\nLIMIT {}\n",
            branches.join("\n  UNION\n  "),
            self.limit
        ))
    }
}
