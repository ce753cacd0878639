use apiprobe_utils::error::{ApiProbeError, ConfigError};
use once_cell::sync::Lazy;
use regex::Regex;

use super::Config;

static CLASS_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid class name pattern"));

static PACKAGE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)*$")
        .expect("valid package name pattern")
});

fn invalid(key: &str, value: impl Into<String>) -> ApiProbeError {
    ApiProbeError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    })
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ApiProbeError> {
        if let Some(name) = &self.run.test_class_name
            && !CLASS_NAME.is_match(name)
        {
            return Err(invalid(
                "test_class_name",
                format!("'{name}' is not a valid identifier"),
            ));
        }

        if let Some(name) = &self.run.package_name
            && !PACKAGE_NAME.is_match(name)
        {
            return Err(invalid(
                "package_name",
                format!("'{name}' is not a dotted identifier"),
            ));
        }

        if let Some(name) = &self.run.experiment_name
            && (name.is_empty() || name.contains(['/', '\\']))
        {
            return Err(invalid(
                "experiment_name",
                "must be non-empty and contain no path separators",
            ));
        }

        if let Some(timeout) = self.execution.harness_timeout_secs {
            if timeout == 0 {
                return Err(invalid("harness_timeout_secs", "must be greater than 0"));
            }
            if timeout > 86_400 {
                return Err(invalid(
                    "harness_timeout_secs",
                    "exceeds maximum of 86400 seconds (24 hours)",
                ));
            }
        }

        if let Some(timeout) = self.grounding.query_timeout_secs
            && timeout == 0
        {
            return Err(invalid("query_timeout_secs", "must be greater than 0"));
        }

        if self.grounding.result_limit == Some(0) {
            return Err(invalid("result_limit", "must be greater than 0"));
        }

        if let Some(endpoint) = &self.grounding.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(invalid(
                "endpoint",
                format!("'{endpoint}' must be an http(s) URL"),
            ));
        }

        for (key, command) in [
            ("build_command", &self.execution.build_command),
            ("harness_command", &self.execution.harness_command),
            ("report_command", &self.reports.report_command),
        ] {
            if let Some(command) = command
                && command.trim().is_empty()
            {
                return Err(invalid(key, "must not be empty when set"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        let mut config = Config::default();
        config.run.test_class_name = Some("9Lives".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.run.package_name = Some("org.example.".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.run.package_name = Some("org.example.petstore".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_timeouts_and_limits() {
        let mut config = Config::default();
        config.execution.harness_timeout_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.grounding.query_timeout_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.grounding.result_limit = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_endpoint_and_blank_commands() {
        let mut config = Config::default();
        config.grounding.endpoint = Some("ftp://example.org".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoint"));

        let mut config = Config::default();
        config.execution.harness_command = Some("   ".to_string());
        assert!(config.validate().is_err());
    }
}
