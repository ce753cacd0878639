//! SPARQL-over-HTTP knowledge base

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::debug;

use apiprobe_utils::error::GroundingError;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Remote store answering one query with a flat list of values
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Execute `query` once, without retrying
    ///
    /// # Errors
    /// Returns a `GroundingError` for transport, status or decoding failures.
    async fn query(&self, query: &str) -> Result<Vec<String>, GroundingError>;

    /// Human-readable location used in logs and errors
    fn endpoint(&self) -> &str;
}

/// SPARQL 1.1 protocol endpoint queried with GET
#[derive(Debug, Clone)]
pub struct SparqlEndpoint {
    client: Client,
    endpoint: String,
    request_timeout: Duration,
}

impl SparqlEndpoint {
    /// # Errors
    /// Returns `GroundingError::Query` if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Result<Self, GroundingError> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| GroundingError::Query {
                endpoint: endpoint.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint,
            request_timeout,
        })
    }

    fn query_url(&self, query: &str) -> Result<Url, GroundingError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| GroundingError::Query {
            endpoint: self.endpoint.clone(),
            reason: format!("invalid endpoint URL: {e}"),
        })?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url)
    }
}

#[async_trait]
impl KnowledgeBase for SparqlEndpoint {
    async fn query(&self, query: &str) -> Result<Vec<String>, GroundingError> {
        let url = self.query_url(query)?;
        debug!(endpoint = %self.endpoint, query_len = query.len(), "Executing SPARQL query");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GroundingError::Timeout {
                        endpoint: self.endpoint.clone(),
                        timeout_seconds: self.request_timeout.as_secs(),
                    }
                } else {
                    GroundingError::Query {
                        endpoint: self.endpoint.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GroundingError::Query {
                endpoint: self.endpoint.clone(),
                reason: format!("endpoint answered {status}"),
            });
        }

        let body: SparqlResults =
            response
                .json()
                .await
                .map_err(|e| GroundingError::InvalidResponse {
                    endpoint: self.endpoint.clone(),
                    reason: e.to_string(),
                })?;
        Ok(body.into_values())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `application/sparql-results+json` document
#[derive(Debug, Deserialize)]
struct SparqlResults {
    head: SparqlHead,
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

impl SparqlResults {
    /// Values bound to the first projected variable, deduplicated in order
    fn into_values(self) -> Vec<String> {
        let Some(var) = self.head.vars.first() else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.results
            .bindings
            .into_iter()
            .filter_map(|mut row| row.remove(var))
            .map(|term| term.value)
            .filter(|v| !v.is_empty() && seen.insert(v.clone()))
            .collect()
    }
}
