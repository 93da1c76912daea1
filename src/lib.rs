//! weightsplit - split oversized model assets into hostable parts
//!
//! Static hosts commonly reject files above a fixed size. weightsplit checks
//! each asset in an inventory against a byte threshold and splits any asset
//! that exceeds it into sibling files `<asset>.part0`, `<asset>.part1`, ...
//! Every part except possibly the last holds exactly `threshold_bytes` bytes,
//! and concatenating the parts in numeric ordinal order reproduces the
//! source. The source asset is never modified.
//!
//! weightsplit can be used in two ways:
//! - **CLI**: run `weightsplit split` from a project containing
//!   `.weightsplit/config.toml`
//! - **Library**: build an [`Inventory`] and call [`run_batch`]
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Split everything listed in the config file
//! weightsplit split
//!
//! # Preview without writing
//! weightsplit plan --json
//!
//! # Check that an asset's parts can be reassembled
//! weightsplit parts public/models/onnx/vocoder.onnx
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use weightsplit::{BatchOptions, FailurePolicy, Inventory, run_batch};
//!
//! let inventory = Inventory::uniform(
//!     ["public/models/onnx/vector_estimator.onnx"],
//!     80 * 1024 * 1024,
//! );
//! let report = run_batch(&inventory, &BatchOptions::default());
//! for asset in &report.assets {
//!     println!("{asset}");
//! }
//! let code = report.exit_code(FailurePolicy::Strict);
//! # let _ = code;
//! ```
//!
//! # JSON Contracts
//!
//! `split --json` and `plan --json` print the [`BatchReport`] in JCS
//! (RFC 8785) canonical form. Use [`emit_jcs`] for your own integrations.

// ============================================================================
// Stable Public API
// ============================================================================

/// Configuration for weightsplit operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
///
/// Use [`Config::discover()`] for CLI-like behavior or [`Config::builder()`]
/// for programmatic configuration in embedding scenarios.
pub use weightsplit_config::Config;

/// Builder for programmatic configuration.
///
/// # Example
///
/// ```rust,no_run
/// use weightsplit::{AssetConfig, Config, FailurePolicy};
///
/// let config = Config::builder()
///     .project_root("/srv/site")
///     .base_dir("public/models/onnx")
///     .threshold_bytes(50 * 1024 * 1024)
///     .failure_policy(FailurePolicy::IgnoreMissing)
///     .asset(AssetConfig::new("vocoder.onnx"))
///     .build()
///     .expect("Failed to build config");
/// let inventory = config.inventory().expect("paths are UTF-8");
/// ```
pub use weightsplit_config::ConfigBuilder;

pub use weightsplit_config::{
    AssetConfig, AssetEntry, CliArgs, DEFAULT_THRESHOLD_BYTES, FailurePolicy, Inventory,
};

/// Library-level error type with rich context.
///
/// Library code returns `WeightSplitError` and does NOT call `std::process::exit()`.
pub use weightsplit_utils::error::WeightSplitError;

pub use weightsplit_utils::error::{AssetError, ErrorCategory, UserFriendlyError};

/// Exit codes matching the documented exit code table.
pub use weightsplit_utils::exit_codes::ExitCode;

/// JCS (RFC 8785) canonical JSON emission.
pub use weightsplit_utils::canonicalization::emit_jcs;

pub use weightsplit_engine::{
    AssetOutcome, AssetReport, BatchOptions, BatchReport, ChunkPlan, ChunkRecord, ChunkWriter,
    GateDecision, PartEntry, PartGap, check_contiguous, discover_parts, inspect, part_path,
    process_asset, run_batch,
};

// ============================================================================
// Internal modules - accessible but not stable
// ============================================================================

#[doc(hidden)]
pub use weightsplit_utils::{atomic_write, canonicalization, error, exit_codes, logging, types};

#[doc(hidden)]
pub use weightsplit_config as config;

#[doc(hidden)]
pub use weightsplit_engine::{batch, gate, parts, plan, report, writer};

// CLI module - exported with #[doc(hidden)] to allow white-box testing of flag parsing
#[doc(hidden)]
pub mod cli;
