//! JSON test suites: replaying generator and artifact writer

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use apiprobe_utils::atomic_write::write_file_atomic;
use apiprobe_utils::error::PipelineError;

use crate::collaborators::{TestCaseGenerator, TestWriter};
use crate::test_case::TestCase;

/// On-disk suite document, shared by the generator and the writer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub test_cases: Vec<TestCase>,
}

/// Replays the test cases stored in a suite file
///
/// Every call to `generate` rereads the file, so edits between runs are
/// picked up.
#[derive(Debug, Clone)]
pub struct SuiteFileGenerator {
    path: Utf8PathBuf,
    nominal: usize,
    faulty: usize,
}

impl SuiteFileGenerator {
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            nominal: 0,
            faulty: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Parse a suite file into test cases
    ///
    /// Accepts either a full suite document or a bare array of cases.
    ///
    /// # Errors
    /// Returns `PipelineError::Generation` if the file is unreadable or malformed.
    pub fn load(path: &Utf8Path) -> Result<Vec<TestCase>, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Generation {
            reason: format!("cannot read suite {path}: {e}"),
        })?;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum SuiteShape {
            Document(TestSuiteFile),
            Cases(Vec<TestCase>),
        }

        match serde_json::from_str::<SuiteShape>(&content) {
            Ok(SuiteShape::Document(doc)) => Ok(doc.test_cases),
            Ok(SuiteShape::Cases(cases)) => Ok(cases),
            Err(e) => Err(PipelineError::Generation {
                reason: format!("invalid suite {path}: {e}"),
            }),
        }
    }
}

impl TestCaseGenerator for SuiteFileGenerator {
    fn reset_current_counts(&mut self) {
        self.nominal = 0;
        self.faulty = 0;
    }

    fn generate(&mut self) -> Result<Vec<TestCase>, PipelineError> {
        let cases = Self::load(&self.path)?;
        let faulty = cases.iter().filter(|c| c.faulty).count();
        self.faulty += faulty;
        self.nominal += cases.len() - faulty;
        debug!(suite = %self.path, cases = cases.len(), faulty, "Loaded test suite");
        Ok(cases)
    }

    fn nominal_count(&self) -> usize {
        self.nominal
    }

    fn faulty_count(&self) -> usize {
        self.faulty
    }
}

/// Writes the suite as a pretty-printed JSON artifact
///
/// The artifact for `{targetDir}/{testClassName}` is written to
/// `{targetDir}/{testClassName}.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSuiteWriter;

impl JsonSuiteWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TestWriter for JsonSuiteWriter {
    fn write(
        &self,
        cases: &[TestCase],
        destination: &Utf8Path,
    ) -> Result<Utf8PathBuf, PipelineError> {
        let artifact = destination.with_extension("json");
        let doc = TestSuiteFile {
            class_name: destination.file_name().map(str::to_string),
            generated_at: Some(chrono::Utc::now().to_rfc3339()),
            test_cases: cases.to_vec(),
        };
        let write_err = |reason: String| PipelineError::Write {
            path: artifact.to_string(),
            reason,
        };

        let json = serde_json::to_string_pretty(&doc).map_err(|e| write_err(e.to_string()))?;
        write_file_atomic(&artifact, &json).map_err(|e| write_err(format!("{e:#}")))?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_generator_counts_accumulate_until_reset() {
        let temp = TempDir::new().unwrap();
        let path = utf8(&temp).join("suite.json");
        std::fs::write(
            &path,
            r#"[
                {"id":"1","operationId":"listItems","method":"get","path":"/items"},
                {"id":"2","operationId":"listItems","method":"get","path":"/items","faulty":true}
            ]"#,
        )
        .unwrap();

        let mut generator = SuiteFileGenerator::new(&path);
        assert_eq!(generator.generate().unwrap().len(), 2);
        generator.generate().unwrap();
        assert_eq!(generator.nominal_count(), 2);
        assert_eq!(generator.faulty_count(), 2);

        generator.reset_current_counts();
        assert_eq!(generator.nominal_count(), 0);
        assert_eq!(generator.faulty_count(), 0);
    }

    #[test]
    fn test_missing_suite_is_a_generation_error() {
        let mut generator = SuiteFileGenerator::new("/nonexistent/suite.json");
        let err = generator.generate().unwrap_err();
        assert!(matches!(err, PipelineError::Generation { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_writer_output_replays_through_generator() {
        let temp = TempDir::new().unwrap();
        let destination = utf8(&temp).join("generated").join("ItemsTest");
        let cases = vec![
            TestCase::new("1", "getItem", "get", "/items/{id}").with_path_param("id", "3"),
        ];

        let artifact = JsonSuiteWriter::new().write(&cases, &destination).unwrap();

        assert_eq!(artifact, destination.with_extension("json"));
        let raw: TestSuiteFile =
            serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
        assert_eq!(raw.class_name.as_deref(), Some("ItemsTest"));
        assert_eq!(SuiteFileGenerator::load(&artifact).unwrap(), cases);
    }

    #[test]
    fn test_writer_failure_is_a_write_error() {
        let temp = TempDir::new().unwrap();
        let blocker = utf8(&temp).join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = JsonSuiteWriter::new()
            .write(&[], &blocker.join("ItemsTest"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Write { .. }));
    }
}
