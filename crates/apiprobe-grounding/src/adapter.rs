use camino::{Utf8Path, Utf8PathBuf};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use apiprobe_testconf::TestConfigurationDocument;
use apiprobe_utils::atomic_write::write_file_atomic;
use apiprobe_utils::error::{GroundingError, SinkError};
use apiprobe_utils::report_sink::file_stem;

use crate::query::{QueryBuilder, VALUES_PARAM};
use crate::sparql::KnowledgeBase;

/// What happened to one semantic parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterOutcome {
    pub operation_id: String,
    pub parameter: String,
    /// Number of values written back into the document
    pub value_count: usize,
    /// Sink the values were written to, when the write succeeded
    pub sink: Option<Utf8PathBuf>,
    /// Query or sink failure, if any
    pub error: Option<String>,
}

/// Per-parameter outcomes of one grounding pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingReport {
    pub outcomes: Vec<ParameterOutcome>,
}

impl GroundingReport {
    /// Parameters that received at least one value
    #[must_use]
    pub fn grounded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.value_count > 0).count()
    }

    /// Parameters whose query or sink failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}

/// Value file for one (operation, parameter) pair
///
/// `{output_dir}/{spec_title}/{operation_id}_{parameter}.csv`. Path separators
/// in the title are replaced so every sink stays inside `output_dir`; the file
/// name is reduced to [`file_stem`] characters.
#[must_use]
pub fn sink_path(
    output_dir: &Utf8Path,
    spec_title: &str,
    operation_id: &str,
    parameter: &str,
) -> Utf8PathBuf {
    output_dir
        .join(spec_title.replace(['/', '\\'], "_"))
        .join(format!("{}_{}.csv", file_stem(operation_id), file_stem(parameter)))
}

/// Fills semantic parameters from a knowledge base
pub struct GroundingAdapter {
    query_builder: Box<dyn QueryBuilder>,
    knowledge_base: Box<dyn KnowledgeBase>,
    query_timeout: Duration,
    output_dir: Utf8PathBuf,
}

impl GroundingAdapter {
    #[must_use]
    pub fn new(
        query_builder: Box<dyn QueryBuilder>,
        knowledge_base: Box<dyn KnowledgeBase>,
        query_timeout: Duration,
        output_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            query_builder,
            knowledge_base,
            query_timeout,
            output_dir: output_dir.into(),
        }
    }

    /// Ground every semantic parameter of `doc` in place
    ///
    /// Parameters are processed one at a time in document order. A failed
    /// query leaves that parameter with an empty value set; a failed sink write
    /// is recorded and does not undo the in-memory update.
    pub async fn ground(
        &self,
        doc: &mut TestConfigurationDocument,
        spec_title: &str,
    ) -> GroundingReport {
        let mut report = GroundingReport::default();

        for operation in doc.operations_mut() {
            if !operation.has_semantic_parameters() {
                continue;
            }

            for index in 0..operation.test_parameters.len() {
                if !operation.test_parameters[index].generator.kind.is_semantic() {
                    continue;
                }

                let parameter = &operation.test_parameters[index];
                let result = match self.query_builder.build(operation, parameter) {
                    Ok(query) => self.run_query(&query).await,
                    Err(e) => Err(e),
                };

                let parameter_name = parameter.name.clone();
                let (values, mut error) = match result {
                    Ok(values) => (values, None),
                    Err(e) => {
                        warn!(
                            operation = %operation.operation_id,
                            parameter = %parameter_name,
                            error = %e,
                            "Grounding failed; parameter left without values"
                        );
                        (Vec::new(), Some(e.to_string()))
                    }
                };

                let sink = sink_path(
                    &self.output_dir,
                    spec_title,
                    &operation.operation_id,
                    &parameter_name,
                );
                let written = match write_sink(&sink, &values) {
                    Ok(()) => Some(sink),
                    Err(e) => {
                        warn!(error = %e, "Failed to write grounding sink");
                        error.get_or_insert(e.to_string());
                        None
                    }
                };

                let value_count = values.len();
                operation.test_parameters[index]
                    .generator
                    .set_values(VALUES_PARAM, values);

                info!(
                    operation = %operation.operation_id,
                    parameter = %parameter_name,
                    values = value_count,
                    "Grounded parameter"
                );
                report.outcomes.push(ParameterOutcome {
                    operation_id: operation.operation_id.clone(),
                    parameter: parameter_name,
                    value_count,
                    sink: written,
                    error,
                });
            }
        }

        report
    }

    async fn run_query(&self, query: &str) -> Result<Vec<String>, GroundingError> {
        match timeout(self.query_timeout, self.knowledge_base.query(query)).await {
            Ok(result) => result,
            Err(_) => Err(GroundingError::Timeout {
                endpoint: self.knowledge_base.endpoint().to_string(),
                timeout_seconds: self.query_timeout.as_secs(),
            }),
        }
    }
}

fn write_sink(path: &Utf8Path, values: &[String]) -> Result<(), SinkError> {
    write_file_atomic(path, &values.join("\n"))
        .map(|_| ())
        .map_err(|e| SinkError::Write {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })
}
