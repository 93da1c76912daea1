//! Configuration model, discovery, and validation for weightsplit.
//!
//! The central output is an [`Inventory`]: the ordered list of assets to
//! check and the threshold that applies to each.

mod config;

pub use config::*;

pub(crate) use weightsplit_utils::{error, types};
