//! Size gate: decide per asset whether splitting is needed.
//!
//! The gate only reads metadata. It never opens the asset for reading and
//! never creates output, so it is safe to call repeatedly.

use camino::Utf8Path;
use std::fs;
use std::io;

use weightsplit_utils::error::AssetError;

/// What the batch should do with an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// At or under the threshold; leave the asset alone.
    Skip { size_bytes: u64 },
    /// Over the threshold; hand to the chunk writer.
    Split { size_bytes: u64 },
}

impl GateDecision {
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Skip { size_bytes } | Self::Split { size_bytes } => *size_bytes,
        }
    }
}

/// Inspect `asset` and compare its current size against `threshold_bytes`.
///
/// A zero threshold is rejected before the filesystem is touched. The size
/// boundary is inclusive: an asset of exactly `threshold_bytes` is skipped.
pub fn inspect(asset: &Utf8Path, threshold_bytes: u64) -> Result<GateDecision, AssetError> {
    if threshold_bytes == 0 {
        return Err(AssetError::InvalidThreshold {
            path: asset.to_path_buf(),
            threshold_bytes,
            reason: "must be greater than 0".to_string(),
        });
    }

    let metadata = match fs::metadata(asset) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AssetError::NotFound {
                path: asset.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(AssetError::Metadata {
                path: asset.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_file() {
        return Err(AssetError::NotAFile {
            path: asset.to_path_buf(),
        });
    }

    let size_bytes = metadata.len();
    if size_bytes <= threshold_bytes {
        Ok(GateDecision::Skip { size_bytes })
    } else {
        Ok(GateDecision::Split { size_bytes })
    }
}
