use std::collections::BTreeMap;

use crate::types::ConfigSource;

use super::Config;

fn source_label(source: Option<&ConfigSource>) -> String {
    source.unwrap_or(&ConfigSource::Default).to_string()
}

impl Config {
    /// Get effective configuration as key-value pairs with source attribution
    ///
    /// Keys are sorted so the `config` command prints in a stable order.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add_config = |key: &str, value: String| {
            let source = source_label(self.source_attribution.get(key));
            config.insert(key.to_string(), (value, source));
        };

        add_config("threshold_bytes", self.threshold_bytes().to_string());
        add_config("base_dir", self.base_dir().display().to_string());
        add_config("failure_policy", self.failure_policy().to_string());
        add_config("prune_stale_parts", self.prune_stale_parts().to_string());
        add_config("assets", self.assets.len().to_string());

        config
    }
}

#[cfg(test)]
mod tests {
    use crate::{AssetConfig, Config};

    #[test]
    fn test_effective_config_reports_sources() {
        let config = Config::builder()
            .project_root("/p")
            .threshold_bytes(100)
            .asset(AssetConfig::new("a.onnx"))
            .build()
            .unwrap();

        let effective = config.effective_config();
        assert_eq!(
            effective.get("threshold_bytes"),
            Some(&("100".to_string(), "programmatic".to_string()))
        );
        assert_eq!(
            effective.get("failure_policy"),
            Some(&("strict".to_string(), "default".to_string()))
        );
        assert_eq!(
            effective.get("assets"),
            Some(&("1".to_string(), "programmatic".to_string()))
        );
        assert_eq!(
            effective.keys().cloned().collect::<Vec<_>>(),
            vec![
                "assets",
                "base_dir",
                "failure_policy",
                "prune_stale_parts",
                "threshold_bytes"
            ]
        );
    }
}
