//! YAML persistence for test configuration documents

use camino::Utf8Path;
use tracing::debug;

use apiprobe_utils::atomic_write::write_file_atomic;
use apiprobe_utils::error::TestConfError;

use crate::model::TestConfigurationDocument;

/// Render a document as YAML
///
/// # Errors
/// Returns `TestConfError::Persist` if serialization fails.
pub fn to_yaml(doc: &TestConfigurationDocument) -> Result<String, TestConfError> {
    serde_yaml::to_string(doc).map_err(|e| TestConfError::Persist {
        path: "<memory>".to_string(),
        reason: e.to_string(),
    })
}

/// Parse a document from YAML text; `origin` is only used in error messages
///
/// # Errors
/// Returns `TestConfError::Parse` for malformed documents.
pub fn from_yaml(content: &str, origin: &str) -> Result<TestConfigurationDocument, TestConfError> {
    serde_yaml::from_str(content).map_err(|e| TestConfError::Parse {
        path: origin.to_string(),
        reason: e.to_string(),
    })
}

/// Atomically write a document to `path`
///
/// # Errors
/// Returns `TestConfError::Persist` if the file cannot be written.
pub fn save(doc: &TestConfigurationDocument, path: &Utf8Path) -> Result<(), TestConfError> {
    let yaml = to_yaml(doc)?;
    let written = write_file_atomic(path, &yaml).map_err(|e| TestConfError::Persist {
        path: path.to_string(),
        reason: format!("{e:#}"),
    })?;
    debug!(path = %path, bytes = written.bytes_written, "Saved test configuration");
    Ok(())
}

/// Load a document from `path`
///
/// # Errors
/// Returns `TestConfError::Parse` when the file is unreadable or malformed.
pub fn load(path: &Utf8Path) -> Result<TestConfigurationDocument, TestConfError> {
    let content = std::fs::read_to_string(path).map_err(|e| TestConfError::Parse {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    from_yaml(&content, path.as_str())
}
