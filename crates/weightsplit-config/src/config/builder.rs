use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::WeightSplitError;

use super::{AssetConfig, AssetOrigin, Config, ConfigSource, Defaults, FailurePolicy};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when the inventory is known to the caller and no config file
    /// should be discovered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use weightsplit_config::{AssetConfig, Config, FailurePolicy};
    ///
    /// let config = Config::builder()
    ///     .project_root("/srv/app")
    ///     .base_dir("public/models/onnx")
    ///     .threshold_bytes(80 * 1024 * 1024)
    ///     .failure_policy(FailurePolicy::IgnoreMissing)
    ///     .asset(AssetConfig::new("vector_estimator.onnx"))
    ///     .build()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.inventory().unwrap().len(), 1);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration of weightsplit.
///
/// # Source Attribution
///
/// All values set via the builder are attributed to `ConfigSource::Programmatic`
/// in the resulting `Config`'s source attribution map.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    project_root: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    threshold_bytes: Option<u64>,
    failure_policy: Option<FailurePolicy>,
    prune_stale_parts: Option<bool>,
    assets: Vec<AssetConfig>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory relative paths resolve against (default: current directory).
    #[must_use]
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn threshold_bytes(mut self, bytes: u64) -> Self {
        self.threshold_bytes = Some(bytes);
        self
    }

    #[must_use]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn prune_stale_parts(mut self, prune: bool) -> Self {
        self.prune_stale_parts = Some(prune);
        self
    }

    #[must_use]
    pub fn asset(mut self, asset: AssetConfig) -> Self {
        self.assets.push(asset);
        self
    }

    #[must_use]
    pub fn assets(mut self, assets: impl IntoIterator<Item = AssetConfig>) -> Self {
        self.assets.extend(assets);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<Config, WeightSplitError> {
        let mut source_attribution = HashMap::new();
        for key in [
            "threshold_bytes",
            "base_dir",
            "failure_policy",
            "prune_stale_parts",
            "assets",
        ] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }

        let mut mark = |key: &str, set: bool| {
            if set {
                source_attribution.insert(key.to_string(), ConfigSource::Programmatic);
            }
        };
        mark("threshold_bytes", self.threshold_bytes.is_some());
        mark("base_dir", self.base_dir.is_some());
        mark("failure_policy", self.failure_policy.is_some());
        mark("prune_stale_parts", self.prune_stale_parts.is_some());
        mark("assets", !self.assets.is_empty());

        let project_root = match self.project_root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };

        let config = Config {
            defaults: Defaults {
                threshold_bytes: self.threshold_bytes,
                base_dir: self.base_dir,
                failure_policy: self.failure_policy,
                prune_stale_parts: self.prune_stale_parts,
            },
            assets: self.assets,
            project_root,
            config_path: None,
            asset_origin: AssetOrigin::Inventory,
            source_attribution,
        };

        config.validate()?;
        Ok(config)
    }
}
