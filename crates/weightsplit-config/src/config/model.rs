use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use weightsplit_utils::types::{ConfigSource, OutcomeKind};

/// Default part size: 80 MiB, comfortably under a 100 MB per-file hosting limit.
pub const DEFAULT_THRESHOLD_BYTES: u64 = 80 * 1024 * 1024;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".weightsplit";

/// Name of the configuration file inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// How per-asset failures translate into the batch's overall exit status.
///
/// The batch always processes every asset and always returns the full report;
/// the policy only decides whether the run as a whole counts as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Never fail the batch; failures appear only in the report.
    BestEffort,
    /// Missing assets are tolerated; I/O failures and bad thresholds fail the batch.
    IgnoreMissing,
    /// Any asset that did not complete fails the batch (default)
    #[default]
    Strict,
}

impl FailurePolicy {
    /// Whether an outcome of this kind should fail the batch under this policy.
    #[must_use]
    pub const fn counts_as_failure(&self, kind: OutcomeKind) -> bool {
        if !kind.is_failure() {
            return false;
        }
        match self {
            Self::BestEffort => false,
            Self::IgnoreMissing => !matches!(kind, OutcomeKind::NotFound),
            Self::Strict => true,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BestEffort => "best-effort",
            Self::IgnoreMissing => "ignore-missing",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best-effort" => Ok(Self::BestEffort),
            "ignore-missing" => Ok(Self::IgnoreMissing),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown failure policy '{other}' (expected best-effort, ignore-missing or strict)"
            )),
        }
    }
}

/// Configuration for weightsplit operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
///
/// # Discovery
///
/// Use [`Config::discover()`] for CLI-like behavior that:
/// - Searches for `.weightsplit/config.toml` upward from current directory
/// - Stops at a repository root (`.git`, `.hg`, `.svn`)
/// - Applies built-in defaults for unspecified values
///
/// # Programmatic Configuration
///
/// Use [`Config::builder()`](crate::Config::builder) when embedding, so the
/// inventory is injected rather than discovered.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default values applied to every asset.
    pub defaults: Defaults,
    /// Configured asset inventory, in processing order.
    pub assets: Vec<AssetConfig>,
    /// Directory relative asset paths and `base_dir` resolve against.
    pub project_root: PathBuf,
    /// Config file the values were loaded from, if any.
    pub config_path: Option<PathBuf>,
    /// Where each asset entry's path is interpreted relative to.
    pub asset_origin: AssetOrigin,
    /// Source attribution for each setting (for the `config` command).
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// Where the asset list came from, which decides how relative paths resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOrigin {
    /// `[[assets]]` entries: relative to `base_dir` under the project root.
    Inventory,
    /// Paths given on the command line: relative to the working directory.
    CommandLine,
}

/// Default configuration values
///
/// ```toml
/// [defaults]
/// threshold_bytes = 83886080
/// base_dir = "public/models/onnx"
/// failure_policy = "strict"
/// prune_stale_parts = true
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    /// Maximum bytes per part (default: 80 MiB).
    pub threshold_bytes: Option<u64>,
    /// Directory that relative `[[assets]]` paths are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Batch failure policy (default: strict).
    pub failure_policy: Option<FailurePolicy>,
    /// Remove higher-ordinal parts left over from an earlier split (default: true).
    pub prune_stale_parts: Option<bool>,
}

/// One `[[assets]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssetConfig {
    /// Asset path, relative to `base_dir` unless absolute.
    pub path: PathBuf,
    /// Per-asset threshold override.
    #[serde(default)]
    pub threshold_bytes: Option<u64>,
}

impl AssetConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            threshold_bytes: None,
        }
    }

    #[must_use]
    pub fn with_threshold(path: impl Into<PathBuf>, threshold_bytes: u64) -> Self {
        Self {
            path: path.into(),
            threshold_bytes: Some(threshold_bytes),
        }
    }
}

impl Config {
    /// Effective default threshold.
    #[must_use]
    pub fn threshold_bytes(&self) -> u64 {
        self.defaults
            .threshold_bytes
            .unwrap_or(DEFAULT_THRESHOLD_BYTES)
    }

    /// Effective batch failure policy.
    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.defaults.failure_policy.unwrap_or_default()
    }

    /// Whether stale higher-ordinal parts are removed after a split.
    #[must_use]
    pub fn prune_stale_parts(&self) -> bool {
        self.defaults.prune_stale_parts.unwrap_or(true)
    }

    /// Resolved base directory for inventory paths.
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        match &self.defaults.base_dir {
            Some(dir) => self.project_root.join(dir),
            None => self.project_root.clone(),
        }
    }
}
