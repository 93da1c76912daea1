//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::FailurePolicy;

/// weightsplit - split oversized model assets into hostable parts
#[derive(Parser, Debug)]
#[command(name = "weightsplit")]
#[command(about = "Split model weight files that exceed a hosting size limit into ordered parts")]
#[command(long_about = r#"
weightsplit checks each configured asset against a size threshold and splits
every asset that exceeds it into sibling files named <asset>.part0,
<asset>.part1, ... Concatenating the parts in numeric ordinal order
reproduces the original bytes. Source assets are never modified.

EXAMPLES:
  # Split every asset listed in .weightsplit/config.toml
  weightsplit split

  # Split specific files with a 50 MiB limit
  weightsplit split --threshold-bytes 52428800 models/a.onnx models/b.onnx

  # Show what would be split without writing anything
  weightsplit plan

  # List the parts of an asset in reassembly order
  weightsplit parts public/models/onnx/vocoder.onnx

  # Print the effective configuration and where each value came from
  weightsplit config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .weightsplit/config.toml
  Use --config to specify an explicit config file path

EXIT CODES:
  0 success, 1 internal error, 2 invalid arguments or configuration,
  3 asset not found, 4 asset I/O failure, 5 invalid threshold
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON (JCS canonical form) instead of status lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Maximum bytes per part (default: 83886080, i.e. 80 MiB)
    #[arg(long, global = true)]
    pub threshold_bytes: Option<u64>,

    /// When the batch counts as failed: best-effort, ignore-missing or strict
    #[arg(long, global = true)]
    pub failure_policy: Option<FailurePolicy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split every asset that exceeds its threshold
    Split {
        /// Assets to process instead of the configured inventory
        assets: Vec<PathBuf>,

        /// Keep parts left over from an earlier split with more parts
        #[arg(long)]
        no_prune: bool,
    },

    /// Report what `split` would do without writing anything
    Plan {
        /// Assets to inspect instead of the configured inventory
        assets: Vec<PathBuf>,
    },

    /// List the parts of an asset in reassembly order and check for gaps
    Parts {
        /// Source asset path (the parts are `<ASSET>.part<N>`)
        asset: PathBuf,
    },

    /// Print the effective configuration with the source of each value
    Config,
}

impl Commands {
    /// Operation name used in error reports.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Split { .. } => "split",
            Self::Plan { .. } => "plan",
            Self::Parts { .. } => "parts",
            Self::Config => "config",
        }
    }

    /// Assets named on the command line, if this command takes any.
    #[must_use]
    pub fn asset_args(&self) -> &[PathBuf] {
        match self {
            Self::Split { assets, .. } | Self::Plan { assets } => assets,
            Self::Parts { .. } | Self::Config => &[],
        }
    }
}
