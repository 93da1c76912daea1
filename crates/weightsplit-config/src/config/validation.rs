use std::collections::HashSet;

use crate::error::{ConfigError, WeightSplitError};

use super::Config;

impl Config {
    /// Validate configuration values
    ///
    /// A zero threshold on an individual `[[assets]]` entry is not rejected
    /// here: it surfaces as that asset's `InvalidThreshold` outcome so the rest
    /// of the batch still runs.
    pub(crate) fn validate(&self) -> Result<(), WeightSplitError> {
        if let Some(threshold) = self.defaults.threshold_bytes
            && threshold == 0
        {
            return Err(WeightSplitError::Config(ConfigError::InvalidValue {
                key: "threshold_bytes".to_string(),
                value: "must be greater than 0".to_string(),
            }));
        }

        if let Some(base_dir) = &self.defaults.base_dir
            && base_dir.as_os_str().is_empty()
        {
            return Err(WeightSplitError::Config(ConfigError::InvalidValue {
                key: "base_dir".to_string(),
                value: "must not be empty".to_string(),
            }));
        }

        let mut seen = HashSet::new();
        for asset in &self.assets {
            if asset.path.as_os_str().is_empty() {
                return Err(WeightSplitError::Config(ConfigError::InvalidValue {
                    key: "assets.path".to_string(),
                    value: "must not be empty".to_string(),
                }));
            }
            if !seen.insert(asset.path.clone()) {
                return Err(WeightSplitError::Config(ConfigError::DuplicateAsset {
                    path: asset.path.display().to_string(),
                }));
            }
        }

        Ok(())
    }
}
