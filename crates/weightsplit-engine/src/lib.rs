//! Size gate, chunk writer and batch runner for oversized model assets.
//!
//! An asset larger than its threshold is split into `<asset>.part<N>` files
//! of at most `threshold_bytes` each. The source asset is never modified.

// Re-export shared crates to keep `crate::` paths short in engine modules.
pub use weightsplit_config as config;

pub use weightsplit_utils::atomic_write;
pub use weightsplit_utils::error;
pub use weightsplit_utils::exit_codes;
pub use weightsplit_utils::logging;
pub use weightsplit_utils::types;

pub mod batch;
pub mod gate;
pub mod parts;
pub mod plan;
pub mod report;
pub mod writer;

pub use batch::{BatchOptions, process_asset, run_batch};
pub use gate::{GateDecision, inspect};
pub use parts::{PartEntry, PartGap, check_contiguous, discover_parts, part_path};
pub use plan::ChunkPlan;
pub use report::{AssetOutcome, AssetReport, BatchReport, REPORT_SCHEMA_VERSION};
pub use writer::{ChunkRecord, ChunkWriter};
