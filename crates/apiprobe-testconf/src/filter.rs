//! Path/method filters for configuration generation

use apiprobe_openapi::HttpMethod;
use apiprobe_utils::error::TestConfError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// Selects paths (by template, ignoring ASCII case) and the verbs to keep on them
///
/// Text form is `PATH:METHOD[,METHOD...]`. `*` selects every path and an
/// omitted method list selects every verb.
///
/// A path whose last `:` segment has no `/` or `{` (such as `/jobs:cancel`)
/// reads as `PATH:METHODS` and is rejected when those are not verbs. End the
/// filter with `:` to keep the colon in the path: `/jobs:cancel:` selects
/// every verb on `/jobs:cancel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// `None` selects every path
    pub path: Option<String>,
    pub methods: BTreeSet<HttpMethod>,
}

impl Filter {
    #[must_use]
    pub fn new(path: Option<String>, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        Self {
            path,
            methods: methods.into_iter().collect(),
        }
    }

    /// Every path, every verb
    #[must_use]
    pub fn all() -> Self {
        Self::new(None, HttpMethod::iter())
    }

    /// One path, every verb
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self::new(Some(path.into()), HttpMethod::iter())
    }

    #[must_use]
    pub fn matches_path(&self, template: &str) -> bool {
        self.path
            .as_deref()
            .is_none_or(|p| p.eq_ignore_ascii_case(template))
    }

    #[must_use]
    pub fn accepts(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }
}

fn parse_methods(list: &str) -> Result<BTreeSet<HttpMethod>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| HttpMethod::from_str(m).map_err(|_| format!("unknown HTTP method '{m}'")))
        .collect()
}

impl FromStr for Filter {
    type Err = TestConfError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| TestConfError::InvalidFilter {
            filter: text.to_string(),
            reason,
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(invalid("filter is empty".to_string()));
        }

        // Path templates may contain ':' themselves, so only a trailing
        // segment that parses as a method list is treated as one.
        let (path, methods) = match text.rsplit_once(':') {
            Some((path, list)) => match parse_methods(list) {
                Ok(methods) => (path, Some(methods)),
                Err(_) if list.contains('/') || list.contains('{') => (text, None),
                Err(reason) => return Err(invalid(reason)),
            },
            None => (text, None),
        };

        let path = match path.trim() {
            "" => return Err(invalid("path is empty".to_string())),
            "*" => None,
            p => Some(p.to_string()),
        };
        let methods = match methods {
            Some(m) if !m.is_empty() => m,
            _ => HttpMethod::iter().collect(),
        };
        Ok(Self { path, methods })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<_> = self.methods.iter().map(|m| m.as_str()).collect();
        write!(
            f,
            "{}:{}",
            self.path.as_deref().unwrap_or("*"),
            methods.join(",")
        )
    }
}
