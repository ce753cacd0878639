//! Process-wide report sink directory
//!
//! The orchestrator publishes the results directory here immediately before a
//! harness run; report renderers and observers that are not handed the path
//! explicitly read it back.

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock};

static RESULTS_DIR: Lazy<RwLock<Option<Utf8PathBuf>>> = Lazy::new(|| RwLock::new(None));

/// Publish the directory test results are written to
pub fn set_results_dir(dir: &Utf8Path) {
    let mut slot = RESULTS_DIR.write().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(dir.to_path_buf());
}

/// The most recently published results directory
#[must_use]
pub fn results_dir() -> Option<Utf8PathBuf> {
    RESULTS_DIR
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Forget the published directory
pub fn clear_results_dir() {
    let mut slot = RESULTS_DIR.write().unwrap_or_else(PoisonError::into_inner);
    *slot = None;
}

/// Reduce `name` to characters safe in a file name on every platform
///
/// Anything other than ASCII alphanumerics, `-` and `_` becomes `_`.
#[must_use]
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_set_and_clear() {
        set_results_dir(Utf8Path::new("target/results"));
        assert_eq!(results_dir().as_deref(), Some(Utf8Path::new("target/results")));
        clear_results_dir();
        assert_eq!(results_dir(), None);
    }

    #[test]
    fn test_file_stem_replaces_unsafe_characters() {
        assert_eq!(file_stem("<SET OPERATION ID>"), "_SET_OPERATION_ID_");
        assert_eq!(file_stem("get/items:v2"), "get_items_v2");
        assert_eq!(file_stem("search-books_1"), "search-books_1");
    }
}
