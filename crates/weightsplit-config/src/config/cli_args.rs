use std::path::PathBuf;

use super::FailurePolicy;

/// CLI arguments for configuration override
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file; skips discovery.
    pub config_path: Option<PathBuf>,
    pub threshold_bytes: Option<u64>,
    pub failure_policy: Option<FailurePolicy>,
    pub prune_stale_parts: Option<bool>,
    /// Asset paths given on the command line; replace the configured inventory.
    pub assets: Vec<PathBuf>,
}
