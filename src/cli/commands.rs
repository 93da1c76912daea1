//! Command implementations
//!
//! Each handler prints its own output and returns the exit code the run should
//! end with. Errors that abort a command before it produces output are
//! returned as `anyhow::Error` and reported by `run()`.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::{
    AssetOutcome, BatchOptions, BatchReport, Config, ExitCode, PartEntry, PartGap,
    WeightSplitError, check_contiguous, discover_parts, emit_jcs, part_path, run_batch,
};
use weightsplit_utils::error::ConfigError;
use weightsplit_utils::types::format_mib;

/// Execute `split` (or `plan` when `dry_run` is set) over the configured inventory.
pub fn execute_split_command(config: &Config, dry_run: bool, json: bool) -> Result<ExitCode> {
    let inventory = config.inventory()?;

    if inventory.is_empty() && !json {
        eprintln!("⚠ No assets configured.");
        eprintln!("  Add [[assets]] entries to .weightsplit/config.toml or pass asset paths.");
    }

    let options = BatchOptions {
        dry_run,
        prune_stale_parts: config.prune_stale_parts(),
    };
    let report = run_batch(&inventory, &options);

    if json {
        println!("{}", render_json(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report.exit_code(config.failure_policy()))
}

fn print_report(report: &BatchReport) {
    for asset in &report.assets {
        println!("{asset}");
        match &asset.outcome {
            AssetOutcome::Planned { plan } => {
                for (ordinal, len) in (0u64..).zip(plan.part_lengths()) {
                    println!("    {}: {}", part_path(&asset.asset, ordinal), format_mib(len));
                }
            }
            AssetOutcome::Split {
                pruned, warnings, ..
            } => {
                if !pruned.is_empty() {
                    println!("    removed {} stale part(s)", pruned.len());
                }
                for warning in warnings {
                    println!("    ⚠ {warning}");
                }
            }
            _ => {}
        }
    }

    println!();
    println!("{}", report.summary());
}

/// JSON output of the `parts` command.
#[derive(Debug, Serialize)]
struct PartsListing<'a> {
    asset: &'a Utf8Path,
    parts: &'a [PartEntry],
    total_bytes: u64,
    contiguous: bool,
    gap: Option<PartGap>,
}

/// Execute `parts`: list an asset's parts in reassembly order and check for gaps.
///
/// Exits with `ASSET_NOT_FOUND` when there are no parts or one is missing,
/// since reassembly would produce a wrong file.
pub fn execute_parts_command(asset: &Path, json: bool) -> Result<ExitCode> {
    let asset = Utf8PathBuf::from_path_buf(asset.to_path_buf()).map_err(|path| {
        WeightSplitError::Config(ConfigError::InvalidValue {
            key: "asset".to_string(),
            value: format!("{} (path is not valid UTF-8)", path.display()),
        })
    })?;

    let parts = discover_parts(&asset).map_err(WeightSplitError::from)?;
    let gap = check_contiguous(&parts).err();
    let total_bytes: u64 = parts.iter().map(|p| p.size_bytes).sum();
    let complete = !parts.is_empty() && gap.is_none();

    if json {
        let listing = PartsListing {
            asset: &asset,
            parts: &parts,
            total_bytes,
            contiguous: gap.is_none(),
            gap: gap.clone(),
        };
        println!("{}", render_json(&listing)?);
    } else if parts.is_empty() {
        println!("✗ {asset}: no parts found");
    } else {
        for part in &parts {
            println!(
                "  {:>4}  {}  {}",
                part.ordinal,
                part.path,
                format_mib(part.size_bytes)
            );
        }
        match &gap {
            Some(gap) => println!("✗ {asset}: {gap}"),
            None => println!(
                "✓ {asset}: {} parts, {} total",
                parts.len(),
                format_mib(total_bytes)
            ),
        }
    }

    Ok(if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::ASSET_NOT_FOUND
    })
}

/// One effective setting and where it came from.
#[derive(Debug, Serialize)]
struct EffectiveValue {
    value: String,
    source: String,
}

/// JSON output of the `config` command.
#[derive(Debug, Serialize)]
struct ConfigListing {
    config_path: Option<String>,
    project_root: String,
    values: BTreeMap<String, EffectiveValue>,
    assets: Vec<crate::AssetEntry>,
}

/// Execute `config`: print effective values with source attribution and the resolved inventory.
pub fn execute_config_command(config: &Config, json: bool) -> Result<ExitCode> {
    let effective = config.effective_config();
    let inventory = config.inventory()?;

    if json {
        let listing = ConfigListing {
            config_path: config
                .config_path
                .as_ref()
                .map(|p| p.display().to_string()),
            project_root: config.project_root.display().to_string(),
            values: effective
                .into_iter()
                .map(|(key, (value, source))| (key, EffectiveValue { value, source }))
                .collect(),
            assets: inventory.entries,
        };
        println!("{}", render_json(&listing)?);
        return Ok(ExitCode::SUCCESS);
    }

    match &config.config_path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: none (using defaults)"),
    }
    println!("Project root: {}", config.project_root.display());
    println!();
    println!("Effective configuration:");
    for (key, (value, source)) in &effective {
        println!("  {key} = {value}  ({source})");
    }

    if !inventory.is_empty() {
        println!();
        println!("Assets:");
        for entry in &inventory {
            println!(
                "  {}  (threshold {})",
                entry.path,
                format_mib(entry.threshold_bytes)
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn render_json<T: Serialize>(value: &T) -> Result<String> {
    emit_jcs(value).map_err(|e| {
        WeightSplitError::ReportFailed {
            reason: format!("{e:#}"),
        }
        .into()
    })
}
