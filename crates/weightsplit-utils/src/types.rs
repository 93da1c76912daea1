use serde::{Deserialize, Serialize};
use std::fmt;

/// Source of a configuration value.
///
/// Tracks where each effective setting came from so the `config` command can
/// explain why a threshold or policy is in effect.
///
/// Serializes to lowercase strings: `"cli"`, `"config"`, `"programmatic"`, `"default"`.
///
/// # Example
///
/// ```rust
/// use weightsplit_utils::types::ConfigSource;
///
/// let source = ConfigSource::Cli;
/// let json = serde_json::to_string(&source).unwrap();
/// assert_eq!(json, r#""cli""#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "test-utils", derive(strum::VariantNames))]
#[cfg_attr(feature = "test-utils", strum(serialize_all = "lowercase"))]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Config => write!(f, "config"),
            Self::Programmatic => write!(f, "programmatic"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Coarse classification of a per-asset result.
///
/// Every asset processed in a batch ends in exactly one of these kinds. The
/// failure kinds line up with the per-asset error taxonomy: a missing source,
/// an I/O failure while streaming, or an unusable threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "test-utils", derive(strum::VariantNames))]
#[cfg_attr(feature = "test-utils", strum(serialize_all = "snake_case"))]
pub enum OutcomeKind {
    /// Asset was at or under its threshold and left untouched.
    Skipped,
    /// Asset was split into parts.
    Split,
    /// Dry run: asset would be split.
    Planned,
    /// Asset did not exist at processing time.
    NotFound,
    /// Read or write failure while inspecting or streaming the asset.
    IoFailure,
    /// Threshold was zero or unrepresentable on this platform.
    InvalidThreshold,
}

impl OutcomeKind {
    /// Canonical snake_case name, matching the serialized form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Split => "split",
            Self::Planned => "planned",
            Self::NotFound => "not_found",
            Self::IoFailure => "io_failure",
            Self::InvalidThreshold => "invalid_threshold",
        }
    }

    /// Whether this kind represents a failed asset.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::IoFailure | Self::InvalidThreshold
        )
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a byte count as mebibytes with two decimals, e.g. `"80.00MiB"`.
#[must_use]
pub fn format_mib(bytes: u64) -> String {
    format!("{:.2}MiB", bytes as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_kind_serialization_matches_as_str() {
        for kind in [
            OutcomeKind::Skipped,
            OutcomeKind::Split,
            OutcomeKind::Planned,
            OutcomeKind::NotFound,
            OutcomeKind::IoFailure,
            OutcomeKind::InvalidThreshold,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_failure_kinds() {
        assert!(!OutcomeKind::Skipped.is_failure());
        assert!(!OutcomeKind::Split.is_failure());
        assert!(!OutcomeKind::Planned.is_failure());
        assert!(OutcomeKind::NotFound.is_failure());
        assert!(OutcomeKind::IoFailure.is_failure());
        assert!(OutcomeKind::InvalidThreshold.is_failure());
    }

    #[test]
    fn test_format_mib() {
        assert_eq!(format_mib(80 * 1024 * 1024), "80.00MiB");
        assert_eq!(format_mib(0), "0.00MiB");
        assert_eq!(format_mib(1024 * 1024 + 512 * 1024), "1.50MiB");
    }

    #[cfg(feature = "test-utils")]
    #[test]
    fn test_variant_names_match_serde() {
        use strum::VariantNames;

        for name in OutcomeKind::VARIANTS {
            let kind: OutcomeKind = serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(kind.as_str(), *name);
        }
        for name in ConfigSource::VARIANTS {
            let source: ConfigSource = serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(source.to_string(), *name);
        }
    }
}
