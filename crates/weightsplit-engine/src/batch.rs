//! Batch runner: Inventory → Size Gate → Chunk Writer, one asset at a time.

use chrono::Utc;

use weightsplit_config::{AssetEntry, Inventory};
use weightsplit_utils::error::AssetError;
use weightsplit_utils::logging::{asset_span, log_asset_outcome};

use crate::gate::{GateDecision, inspect};
use crate::parts::remove_stale_parts;
use crate::plan::ChunkPlan;
use crate::report::{AssetOutcome, AssetReport, BatchReport, REPORT_SCHEMA_VERSION};
use crate::writer::ChunkWriter;

/// Knobs for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Inspect only; report what would be split without writing.
    pub dry_run: bool,
    /// Remove higher-ordinal parts left by an earlier split.
    pub prune_stale_parts: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            prune_stale_parts: true,
        }
    }
}

/// Process every inventory entry in order and collect the outcomes.
///
/// Never fails as a whole: each asset's error is caught at the asset boundary
/// and recorded, and later assets are still processed. Use
/// [`BatchReport::exit_code`] to turn the report into an overall status.
#[must_use]
pub fn run_batch(inventory: &Inventory, options: &BatchOptions) -> BatchReport {
    let started_at = Utc::now();

    let assets = inventory
        .iter()
        .map(|entry| process_asset(entry, options))
        .collect();

    BatchReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        started_at,
        finished_at: Utc::now(),
        dry_run: options.dry_run,
        assets,
    }
}

/// Gate and, if needed, split a single asset.
#[must_use]
pub fn process_asset(entry: &AssetEntry, options: &BatchOptions) -> AssetReport {
    let span = asset_span(entry.path.as_str(), entry.threshold_bytes);
    let _guard = span.enter();

    let (outcome, detail) = match split_asset(entry, options) {
        Ok(outcome) => (outcome, None),
        Err(err) => (AssetOutcome::from(&err), Some(err.to_string())),
    };

    log_asset_outcome(
        entry.path.as_str(),
        outcome.kind(),
        outcome.part_count(),
        detail.as_deref(),
    );

    AssetReport {
        asset: entry.path.clone(),
        threshold_bytes: entry.threshold_bytes,
        outcome,
    }
}

fn split_asset(entry: &AssetEntry, options: &BatchOptions) -> Result<AssetOutcome, AssetError> {
    let size_bytes = match inspect(&entry.path, entry.threshold_bytes)? {
        GateDecision::Skip { size_bytes } => return Ok(AssetOutcome::Skipped { size_bytes }),
        GateDecision::Split { size_bytes } => size_bytes,
    };

    if options.dry_run {
        // The gate already rejected a zero threshold.
        let plan = ChunkPlan::new(size_bytes, entry.threshold_bytes).ok_or_else(|| {
            AssetError::InvalidThreshold {
                path: entry.path.clone(),
                threshold_bytes: entry.threshold_bytes,
                reason: "must be greater than 0".to_string(),
            }
        })?;
        return Ok(AssetOutcome::Planned { plan });
    }

    let writer = ChunkWriter::new(entry.path.clone(), entry.threshold_bytes)?;
    let parts = writer.split(size_bytes)?;

    let mut warnings = Vec::new();
    let pruned = if options.prune_stale_parts {
        match remove_stale_parts(&entry.path, parts.len() as u64) {
            Ok(pruned) => pruned,
            Err(err) => {
                // Parts are complete; a leftover stale part is reported, not fatal.
                warnings.push(err.to_string());
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    Ok(AssetOutcome::Split {
        size_bytes,
        parts,
        pruned,
        warnings,
    })
}
