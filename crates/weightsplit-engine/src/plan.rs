//! Part-count arithmetic for a given size and threshold.

use serde::Serialize;

/// How an asset of `size_bytes` divides into parts of at most `threshold_bytes`.
///
/// Assets at or under the threshold need no parts at all; the source stays as
/// the only artifact. Otherwise there are `ceil(size / threshold)` parts, all
/// full except possibly the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkPlan {
    pub size_bytes: u64,
    pub threshold_bytes: u64,
    pub part_count: u64,
    /// Length of the final part, or 0 when no split is needed.
    pub last_part_bytes: u64,
}

impl ChunkPlan {
    /// Returns `None` for a zero threshold.
    #[must_use]
    pub fn new(size_bytes: u64, threshold_bytes: u64) -> Option<Self> {
        if threshold_bytes == 0 {
            return None;
        }

        if size_bytes <= threshold_bytes {
            return Some(Self {
                size_bytes,
                threshold_bytes,
                part_count: 0,
                last_part_bytes: 0,
            });
        }

        let part_count = size_bytes.div_ceil(threshold_bytes);
        let last_part_bytes = size_bytes - (part_count - 1) * threshold_bytes;

        Some(Self {
            size_bytes,
            threshold_bytes,
            part_count,
            last_part_bytes,
        })
    }

    #[must_use]
    pub fn needs_split(&self) -> bool {
        self.part_count > 0
    }

    /// Length of the part at `ordinal`, or `None` past the end.
    #[must_use]
    pub fn part_len(&self, ordinal: u64) -> Option<u64> {
        if ordinal >= self.part_count {
            None
        } else if ordinal + 1 == self.part_count {
            Some(self.last_part_bytes)
        } else {
            Some(self.threshold_bytes)
        }
    }

    /// Lengths of every part in ordinal order.
    pub fn part_lengths(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.part_count).filter_map(|ordinal| self.part_len(ordinal))
    }
}
