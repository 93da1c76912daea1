use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, WeightSplitError};

use super::{
    AssetConfig, AssetOrigin, CONFIG_DIR_NAME, CONFIG_FILE_NAME, CliArgs, Config, ConfigSource,
    Defaults,
};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<Defaults>,
    #[serde(default)]
    assets: Vec<AssetConfig>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses current working directory for config file discovery when no explicit
    /// path is provided in cli_args.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut source_attribution = HashMap::new();

        let mut defaults = Defaults::default();
        let mut assets = Vec::new();
        let mut asset_origin = AssetOrigin::Inventory;

        for key in [
            "threshold_bytes",
            "base_dir",
            "failure_policy",
            "prune_stale_parts",
            "assets",
        ] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }

        let config_path = if let Some(explicit_path) = &cli_args.config_path {
            if !explicit_path.exists() {
                return Err(WeightSplitError::Config(ConfigError::NotFound {
                    path: explicit_path.display().to_string(),
                })
                .into());
            }
            Some(explicit_path.clone())
        } else {
            Self::discover_config_file_from(start_dir)
        };

        let project_root = match &config_path {
            Some(path) => Self::project_root_for(path, start_dir),
            None => start_dir.to_path_buf(),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;

            if let Some(file_defaults) = file_config.defaults {
                if file_defaults.threshold_bytes.is_some() {
                    defaults.threshold_bytes = file_defaults.threshold_bytes;
                    source_attribution.insert("threshold_bytes".to_string(), ConfigSource::Config);
                }
                if file_defaults.base_dir.is_some() {
                    defaults.base_dir = file_defaults.base_dir;
                    source_attribution.insert("base_dir".to_string(), ConfigSource::Config);
                }
                if file_defaults.failure_policy.is_some() {
                    defaults.failure_policy = file_defaults.failure_policy;
                    source_attribution.insert("failure_policy".to_string(), ConfigSource::Config);
                }
                if file_defaults.prune_stale_parts.is_some() {
                    defaults.prune_stale_parts = file_defaults.prune_stale_parts;
                    source_attribution
                        .insert("prune_stale_parts".to_string(), ConfigSource::Config);
                }
            }

            if !file_config.assets.is_empty() {
                assets = file_config.assets;
                source_attribution.insert("assets".to_string(), ConfigSource::Config);
            }
        }

        // Apply CLI overrides (highest priority)
        if let Some(threshold) = cli_args.threshold_bytes {
            defaults.threshold_bytes = Some(threshold);
            source_attribution.insert("threshold_bytes".to_string(), ConfigSource::Cli);
        }
        if let Some(policy) = cli_args.failure_policy {
            defaults.failure_policy = Some(policy);
            source_attribution.insert("failure_policy".to_string(), ConfigSource::Cli);
        }
        if let Some(prune) = cli_args.prune_stale_parts {
            defaults.prune_stale_parts = Some(prune);
            source_attribution.insert("prune_stale_parts".to_string(), ConfigSource::Cli);
        }

        // Command-line assets replace the inventory and resolve from the
        // working directory, not the project root.
        let project_root = if cli_args.assets.is_empty() {
            project_root
        } else {
            assets = cli_args.assets.iter().cloned().map(AssetConfig::new).collect();
            asset_origin = AssetOrigin::CommandLine;
            source_attribution.insert("assets".to_string(), ConfigSource::Cli);
            start_dir.to_path_buf()
        };

        let config = Config {
            defaults,
            assets,
            project_root,
            config_path,
            asset_origin,
            source_attribution,
        };

        config.validate()?;

        tracing::debug!(
            config_path = ?config.config_path,
            assets = config.assets.len(),
            threshold_bytes = config.threshold_bytes(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Search upward from `start_dir` for `.weightsplit/config.toml`.
    ///
    /// Stops at a repository root (`.git`, `.hg`, `.svn`) or the filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = Some(start_dir);

        while let Some(dir) = current_dir {
            let config_path = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists()
            {
                break;
            }

            current_dir = dir.parent();
        }

        None
    }

    /// Project root for a config file: the parent of `.weightsplit/`, or the
    /// file's own directory for a config stored elsewhere.
    fn project_root_for(config_path: &Path, start_dir: &Path) -> PathBuf {
        let config_path = if config_path.is_absolute() {
            config_path.to_path_buf()
        } else {
            start_dir.join(config_path)
        };

        let Some(parent) = config_path.parent() else {
            return start_dir.to_path_buf();
        };

        if parent.file_name().is_some_and(|name| name == CONFIG_DIR_NAME) {
            parent.parent().unwrap_or(parent).to_path_buf()
        } else {
            parent.to_path_buf()
        }
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).map_err(|e| {
            WeightSplitError::Config(ConfigError::InvalidFile(format!(
                "{}: {}",
                path.display(),
                e.message()
            )))
            .into()
        })
    }
}
