use std::collections::BTreeMap;

use super::{Config, ConfigSource};

fn source_label(source: Option<&ConfigSource>) -> String {
    source.copied().unwrap_or(ConfigSource::Default).to_string()
}

impl Config {
    /// Effective configuration as `key -> (value, source)`
    ///
    /// Unset optional values (such as commands) are omitted.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: Option<String>| {
            if let Some(val) = value {
                let source = source_label(self.source_attribution.get(key));
                config.insert(key.to_string(), (val, source));
            }
        };

        add("target_dir", self.run.target_dir.as_ref().map(ToString::to_string));
        add("test_class_name", self.run.test_class_name.clone());
        add("package_name", self.run.package_name.clone());
        add("experiment_name", self.run.experiment_name.clone());

        add("enable_csv_stats", self.stats.enable_csv_stats.map(|v| v.to_string()));
        add(
            "enable_input_coverage",
            self.stats.enable_input_coverage.map(|v| v.to_string()),
        );
        add(
            "enable_output_coverage",
            self.stats.enable_output_coverage.map(|v| v.to_string()),
        );
        add("test_data_dir", self.stats.test_data_dir.as_ref().map(ToString::to_string));
        add(
            "coverage_data_dir",
            self.stats.coverage_data_dir.as_ref().map(ToString::to_string),
        );
        add("testcases_file", self.stats.testcases_file.clone());
        add("nominal_faulty_file", self.stats.nominal_faulty_file.clone());
        add("time_file", self.stats.time_file.clone());

        add("results_dir", self.reports.results_dir.as_ref().map(ToString::to_string));
        add("report_dir", self.reports.report_dir.as_ref().map(ToString::to_string));
        add("report_command", self.reports.report_command.clone());

        add("build_command", self.execution.build_command.clone());
        add("harness_command", self.execution.harness_command.clone());
        add(
            "harness_timeout_secs",
            self.execution.harness_timeout_secs.map(|v| v.to_string()),
        );

        add("endpoint", self.grounding.endpoint.clone());
        add(
            "query_timeout_secs",
            self.grounding.query_timeout_secs.map(|v| v.to_string()),
        );
        add(
            "grounding_output_dir",
            self.grounding.output_dir.as_ref().map(ToString::to_string),
        );
        add("result_limit", self.grounding.result_limit.map(|v| v.to_string()));

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_config_labels_sources() {
        let config = Config::builder()
            .test_class_name("ItemsTest")
            .build()
            .unwrap();
        let effective = config.effective_config();

        assert_eq!(
            effective.get("test_class_name"),
            Some(&("ItemsTest".to_string(), "programmatic".to_string()))
        );
        assert_eq!(
            effective.get("harness_timeout_secs"),
            Some(&("600".to_string(), "default".to_string()))
        );
        assert!(!effective.contains_key("harness_command"));
    }
}
