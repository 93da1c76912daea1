//! Per-asset outcomes and the aggregated batch report.

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use weightsplit_config::FailurePolicy;
use weightsplit_utils::error::{AssetError, UserFriendlyError};
use weightsplit_utils::exit_codes::ExitCode;
use weightsplit_utils::types::{OutcomeKind, format_mib};

use crate::plan::ChunkPlan;
use crate::writer::ChunkRecord;

/// Schema version of the serialized [`BatchReport`].
pub const REPORT_SCHEMA_VERSION: &str = "1";

/// Result of processing one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetOutcome {
    Skipped {
        size_bytes: u64,
    },
    Split {
        size_bytes: u64,
        parts: Vec<ChunkRecord>,
        /// Parts from an earlier run that were removed.
        pruned: Vec<Utf8PathBuf>,
        warnings: Vec<String>,
    },
    Planned {
        plan: ChunkPlan,
    },
    NotFound,
    IoFailure {
        reason: String,
    },
    InvalidThreshold {
        reason: String,
    },
}

impl AssetOutcome {
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Skipped { .. } => OutcomeKind::Skipped,
            Self::Split { .. } => OutcomeKind::Split,
            Self::Planned { .. } => OutcomeKind::Planned,
            Self::NotFound => OutcomeKind::NotFound,
            Self::IoFailure { .. } => OutcomeKind::IoFailure,
            Self::InvalidThreshold { .. } => OutcomeKind::InvalidThreshold,
        }
    }

    /// Number of parts written (or planned).
    #[must_use]
    pub fn part_count(&self) -> usize {
        match self {
            Self::Split { parts, .. } => parts.len(),
            Self::Planned { plan } => usize::try_from(plan.part_count).unwrap_or(usize::MAX),
            _ => 0,
        }
    }
}

impl From<&AssetError> for AssetOutcome {
    fn from(err: &AssetError) -> Self {
        match err.kind() {
            OutcomeKind::NotFound => Self::NotFound,
            OutcomeKind::InvalidThreshold => Self::InvalidThreshold {
                reason: err.user_message(),
            },
            _ => Self::IoFailure {
                reason: err.user_message(),
            },
        }
    }
}

/// One asset's entry in the batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReport {
    pub asset: Utf8PathBuf,
    pub threshold_bytes: u64,
    pub outcome: AssetOutcome,
}

impl AssetReport {
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        self.outcome.kind()
    }
}

impl fmt::Display for AssetReport {
    /// One human-readable status line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let asset = &self.asset;
        match &self.outcome {
            AssetOutcome::Skipped { size_bytes } => write!(
                f,
                "⊘ {asset}: skipped (small enough: {} <= {})",
                format_mib(*size_bytes),
                format_mib(self.threshold_bytes)
            ),
            AssetOutcome::Split {
                size_bytes, parts, ..
            } => write!(
                f,
                "✓ {asset}: split into {} parts ({})",
                parts.len(),
                format_mib(*size_bytes)
            ),
            AssetOutcome::Planned { plan } => write!(
                f,
                "→ {asset}: would split into {} parts ({})",
                plan.part_count,
                format_mib(plan.size_bytes)
            ),
            AssetOutcome::NotFound => write!(f, "✗ {asset}: not found"),
            AssetOutcome::IoFailure { reason } => write!(f, "✗ {asset}: I/O failure: {reason}"),
            AssetOutcome::InvalidThreshold { reason } => {
                write!(f, "✗ {asset}: invalid threshold: {reason}")
            }
        }
    }
}

/// Structured result of a batch run, one entry per inventory asset in order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub schema_version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub assets: Vec<AssetReport>,
}

impl BatchReport {
    /// Assets whose outcome is a failure, regardless of policy.
    pub fn failures(&self) -> impl Iterator<Item = &AssetReport> {
        self.assets.iter().filter(|a| a.kind().is_failure())
    }

    /// True when every asset was skipped, split or planned.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    #[must_use]
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.assets.iter().filter(|a| a.kind() == kind).count()
    }

    /// Overall exit code under `policy`.
    ///
    /// Failures the policy ignores map to `SUCCESS`. Among the rest the most
    /// severe kind wins.
    #[must_use]
    pub fn exit_code(&self, policy: FailurePolicy) -> ExitCode {
        self.assets
            .iter()
            .map(AssetReport::kind)
            .filter(|kind| policy.counts_as_failure(*kind))
            .map(ExitCode::for_outcome)
            .fold(ExitCode::SUCCESS, ExitCode::max_severity)
    }

    /// Short tally, e.g. `"3 assets: 1 split, 1 skipped, 1 not found"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut pieces = Vec::new();
        for (kind, label) in [
            (OutcomeKind::Split, "split"),
            (OutcomeKind::Planned, "to split"),
            (OutcomeKind::Skipped, "skipped"),
            (OutcomeKind::NotFound, "not found"),
            (OutcomeKind::IoFailure, "failed"),
            (OutcomeKind::InvalidThreshold, "invalid threshold"),
        ] {
            let n = self.count(kind);
            if n > 0 {
                pieces.push(format!("{n} {label}"));
            }
        }
        let noun = if self.assets.len() == 1 { "asset" } else { "assets" };
        if pieces.is_empty() {
            format!("{} {noun}", self.assets.len())
        } else {
            format!("{} {noun}: {}", self.assets.len(), pieces.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<AssetOutcome>) -> BatchReport {
        let now = Utc::now();
        BatchReport {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            started_at: now,
            finished_at: now,
            dry_run: false,
            assets: outcomes
                .into_iter()
                .enumerate()
                .map(|(i, outcome)| AssetReport {
                    asset: Utf8PathBuf::from(format!("m{i}.onnx")),
                    threshold_bytes: 10,
                    outcome,
                })
                .collect(),
        }
    }

    fn io_failure() -> AssetOutcome {
        AssetOutcome::IoFailure {
            reason: "disk full".to_string(),
        }
    }

    #[test]
    fn test_exit_code_by_policy() {
        let only_missing = report(vec![
            AssetOutcome::Skipped { size_bytes: 1 },
            AssetOutcome::NotFound,
        ]);
        assert_eq!(
            only_missing.exit_code(FailurePolicy::Strict),
            ExitCode::ASSET_NOT_FOUND
        );
        assert_eq!(
            only_missing.exit_code(FailurePolicy::IgnoreMissing),
            ExitCode::SUCCESS
        );
        assert_eq!(
            only_missing.exit_code(FailurePolicy::BestEffort),
            ExitCode::SUCCESS
        );

        let mixed = report(vec![AssetOutcome::NotFound, io_failure()]);
        assert_eq!(
            mixed.exit_code(FailurePolicy::Strict),
            ExitCode::ASSET_IO_FAILURE
        );
        assert_eq!(
            mixed.exit_code(FailurePolicy::IgnoreMissing),
            ExitCode::ASSET_IO_FAILURE
        );
        assert_eq!(mixed.exit_code(FailurePolicy::BestEffort), ExitCode::SUCCESS);
    }

    #[test]
    fn test_clean_report() {
        let clean = report(vec![AssetOutcome::Skipped { size_bytes: 3 }]);
        assert!(clean.is_clean());
        assert_eq!(clean.exit_code(FailurePolicy::Strict), ExitCode::SUCCESS);
        assert_eq!(clean.summary(), "1 asset: 1 skipped");
    }

    #[test]
    fn test_summary_counts() {
        let r = report(vec![
            AssetOutcome::NotFound,
            io_failure(),
            AssetOutcome::Skipped { size_bytes: 1 },
        ]);
        assert_eq!(r.summary(), "3 assets: 1 skipped, 1 not found, 1 failed");
        assert_eq!(r.failures().count(), 2);
        assert!(report(vec![]).summary().starts_with("0 assets"));
    }

    #[test]
    fn test_outcome_from_asset_error() {
        let err = AssetError::NotFound {
            path: Utf8PathBuf::from("a.onnx"),
        };
        assert_eq!(AssetOutcome::from(&err), AssetOutcome::NotFound);

        let err = AssetError::SizeChanged {
            path: Utf8PathBuf::from("a.onnx"),
            expected: 2,
            actual: 1,
        };
        assert_eq!(AssetOutcome::from(&err).kind(), OutcomeKind::IoFailure);
    }

    #[test]
    fn test_status_lines() {
        let r = report(vec![AssetOutcome::NotFound, io_failure()]);
        assert_eq!(r.assets[0].to_string(), "✗ m0.onnx: not found");
        assert_eq!(r.assets[1].to_string(), "✗ m1.onnx: I/O failure: disk full");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(AssetOutcome::Skipped { size_bytes: 5 }).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["size_bytes"], 5);
        let json = serde_json::to_value(AssetOutcome::NotFound).unwrap();
        assert_eq!(json["status"], "not_found");
    }
}
