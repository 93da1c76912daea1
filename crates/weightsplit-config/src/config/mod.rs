//! Configuration management for weightsplit
//!
//! This module provides hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. Supports TOML configuration files with a `[defaults]`
//! table and an ordered list of `[[assets]]` entries.

mod builder;
mod cli_args;
mod discovery;
mod inventory;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use inventory::{AssetEntry, Inventory};
pub use model::*;
pub use weightsplit_utils::types::ConfigSource;
