//! Part file naming shared by the writer and any reassembly consumer.
//!
//! A part of asset `<path>` lives next to it as `<path>.part<N>`, where `N` is
//! the zero-based ordinal in plain decimal. Ordinals are not zero-padded, so
//! `model.onnx.part10` sorts before `model.onnx.part2` lexicographically.
//! Consumers must order parts by the parsed ordinal, which is what
//! [`discover_parts`] does.
//!
//! Reassembly is concatenation in that order:
//!
//! ```rust,no_run
//! use camino::Utf8Path;
//! use std::io::Write;
//! use weightsplit_engine::parts::{check_contiguous, discover_parts};
//!
//! # fn main() -> anyhow::Result<()> {
//! let asset = Utf8Path::new("public/models/onnx/vector_estimator.onnx");
//! let parts = discover_parts(asset)?;
//! check_contiguous(&parts)?;
//!
//! let mut out = std::fs::File::create(asset)?;
//! for part in &parts {
//!     let mut input = std::fs::File::open(&part.path)?;
//!     std::io::copy(&mut input, &mut out)?;
//! }
//! out.flush()?;
//! # Ok(())
//! # }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fs;
use thiserror::Error;

use weightsplit_utils::error::AssetError;

/// Separator between the asset file name and the ordinal.
pub const PART_MARKER: &str = ".part";

/// A part file found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartEntry {
    pub ordinal: u64,
    pub path: Utf8PathBuf,
    pub size_bytes: u64,
}

/// The discovered parts do not form the sequence `0..n`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("part {missing} is missing ({found} parts found, highest ordinal {highest})")]
pub struct PartGap {
    pub missing: u64,
    pub found: usize,
    pub highest: u64,
}

/// Path of the part at `ordinal` for `asset`.
#[must_use]
pub fn part_path(asset: &Utf8Path, ordinal: u64) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{asset}{PART_MARKER}{ordinal}"))
}

/// Parse the ordinal from a sibling file name, if it is a part of `asset_file_name`.
///
/// Only `<asset_file_name>.part` followed by ASCII digits matches, and leading
/// zeros are rejected (except `0` itself) so each ordinal has exactly one name.
#[must_use]
pub fn parse_part_ordinal(asset_file_name: &str, candidate: &str) -> Option<u64> {
    let digits = candidate
        .strip_prefix(asset_file_name)?
        .strip_prefix(PART_MARKER)?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }

    digits.parse().ok()
}

fn asset_dir(asset: &Utf8Path) -> &Utf8Path {
    match asset.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    }
}

/// Enumerate the parts of `asset` in ascending numeric ordinal order.
///
/// Only the asset's directory is read. Entries that are not regular files or
/// whose names are not valid UTF-8 are ignored. A missing directory yields
/// `NotFound`.
pub fn discover_parts(asset: &Utf8Path) -> Result<Vec<PartEntry>, AssetError> {
    let Some(file_name) = asset.file_name() else {
        return Err(AssetError::NotAFile {
            path: asset.to_path_buf(),
        });
    };
    let dir = asset_dir(asset);

    let entries = fs::read_dir(dir).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound {
                path: dir.to_path_buf(),
            }
        } else {
            AssetError::Metadata {
                path: dir.to_path_buf(),
                source,
            }
        }
    })?;

    let mut parts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AssetError::Metadata {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(ordinal) = parse_part_ordinal(file_name, name) else {
            continue;
        };

        let path = part_path(asset, ordinal);
        let metadata = fs::metadata(&path).map_err(|source| AssetError::Metadata {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            continue;
        }

        parts.push(PartEntry {
            ordinal,
            path,
            size_bytes: metadata.len(),
        });
    }

    parts.sort_by_key(|part| part.ordinal);
    Ok(parts)
}

/// Check that `parts` (sorted by ordinal) are exactly `0..parts.len()`.
pub fn check_contiguous(parts: &[PartEntry]) -> Result<(), PartGap> {
    for (expected, part) in (0u64..).zip(parts) {
        if part.ordinal != expected {
            return Err(PartGap {
                missing: expected,
                found: parts.len(),
                highest: parts.last().map_or(0, |p| p.ordinal),
            });
        }
    }
    Ok(())
}

/// Remove parts of `asset` with ordinal `>= keep`.
///
/// Called after a successful split so parts left by an earlier run with a
/// smaller threshold cannot be picked up by reassembly. Returns the removed
/// paths.
pub fn remove_stale_parts(asset: &Utf8Path, keep: u64) -> Result<Vec<Utf8PathBuf>, AssetError> {
    let mut removed = Vec::new();
    for part in discover_parts(asset)? {
        if part.ordinal < keep {
            continue;
        }
        fs::remove_file(&part.path).map_err(|e| AssetError::Write {
            part: part.path.clone(),
            ordinal: part.ordinal,
            reason: format!("failed to remove stale part: {e}"),
        })?;
        removed.push(part.path);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_part_path_appends_unpadded_ordinal() {
        let asset = Utf8Path::new("public/models/onnx/vocoder.onnx");
        assert_eq!(
            part_path(asset, 0),
            Utf8PathBuf::from("public/models/onnx/vocoder.onnx.part0")
        );
        assert_eq!(
            part_path(asset, 12),
            Utf8PathBuf::from("public/models/onnx/vocoder.onnx.part12")
        );
    }

    #[test]
    fn test_parse_part_ordinal() {
        assert_eq!(parse_part_ordinal("a.onnx", "a.onnx.part0"), Some(0));
        assert_eq!(parse_part_ordinal("a.onnx", "a.onnx.part10"), Some(10));
        assert_eq!(parse_part_ordinal("a.onnx", "a.onnx.part"), None);
        assert_eq!(parse_part_ordinal("a.onnx", "a.onnx.part01"), None);
        assert_eq!(parse_part_ordinal("a.onnx", "a.onnx.part-1"), None);
        assert_eq!(parse_part_ordinal("a.onnx", "a.onnx.part1.tmp"), None);
        assert_eq!(parse_part_ordinal("a.onnx", "b.onnx.part1"), None);
        assert_eq!(parse_part_ordinal("a.onnx", "a.onnx"), None);
        // A different asset whose name extends this one
        assert_eq!(parse_part_ordinal("a.onnx", "a.onnx_quant.onnx.part0"), None);
        assert_eq!(
            parse_part_ordinal("a.onnx", "a.onnx.part99999999999999999999999"),
            None
        );
    }

    #[test]
    fn test_discover_parts_orders_numerically() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        let asset = dir.join("model.onnx");

        for ordinal in [10u64, 2, 0, 11, 1, 3, 4, 5, 6, 7, 8, 9] {
            fs::write(part_path(&asset, ordinal), vec![0u8; ordinal as usize]).unwrap();
        }
        fs::write(dir.join("model.onnx.part03"), b"padded").unwrap();
        fs::write(dir.join("other.onnx.part0"), b"other").unwrap();
        fs::create_dir(dir.join("model.onnx.part12")).unwrap();

        let parts = discover_parts(&asset).unwrap();
        let ordinals: Vec<u64> = parts.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, (0..12).collect::<Vec<_>>());
        assert_eq!(parts[10].size_bytes, 10);
        check_contiguous(&parts).unwrap();
    }

    #[test]
    fn test_discover_parts_missing_directory() {
        let temp = TempDir::new().unwrap();
        let asset = utf8_dir(&temp).join("nope").join("model.onnx");
        assert!(matches!(
            discover_parts(&asset),
            Err(AssetError::NotFound { .. })
        ));
    }

    #[test]
    fn test_check_contiguous_reports_gap() {
        let temp = TempDir::new().unwrap();
        let asset = utf8_dir(&temp).join("model.onnx");
        for ordinal in [0u64, 1, 3] {
            fs::write(part_path(&asset, ordinal), b"x").unwrap();
        }

        let parts = discover_parts(&asset).unwrap();
        let gap = check_contiguous(&parts).unwrap_err();
        assert_eq!(
            gap,
            PartGap {
                missing: 2,
                found: 3,
                highest: 3
            }
        );
    }

    #[test]
    fn test_check_contiguous_requires_part_zero() {
        let parts = vec![PartEntry {
            ordinal: 1,
            path: Utf8PathBuf::from("m.part1"),
            size_bytes: 1,
        }];
        assert_eq!(check_contiguous(&parts).unwrap_err().missing, 0);
        assert!(check_contiguous(&[]).is_ok());
    }

    #[test]
    fn test_remove_stale_parts_keeps_lower_ordinals() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        let asset = dir.join("model.onnx");
        fs::write(&asset, b"source").unwrap();
        for ordinal in 0..5u64 {
            fs::write(part_path(&asset, ordinal), b"x").unwrap();
        }

        let removed = remove_stale_parts(&asset, 2).unwrap();
        assert_eq!(
            removed,
            vec![part_path(&asset, 2), part_path(&asset, 3), part_path(&asset, 4)]
        );
        assert!(asset.exists());
        let remaining: Vec<u64> = discover_parts(&asset)
            .unwrap()
            .iter()
            .map(|p| p.ordinal)
            .collect();
        assert_eq!(remaining, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn prop_part_name_round_trips(ordinal in any::<u64>(), stem in "[a-z_]{1,12}\\.onnx") {
            let asset = Utf8PathBuf::from(format!("models/{stem}"));
            let path = part_path(&asset, ordinal);
            let name = path.file_name().unwrap();
            prop_assert_eq!(parse_part_ordinal(&stem, name), Some(ordinal));
        }

        #[test]
        fn prop_numeric_order_differs_from_lexicographic(count in 11u64..200) {
            let mut names: Vec<String> = (0..count)
                .map(|n| part_path(Utf8Path::new("m.bin"), n).into_string())
                .collect();
            names.sort();
            let mut ordinals: Vec<u64> = names
                .iter()
                .filter_map(|n| parse_part_ordinal("m.bin", n))
                .collect();
            prop_assert_ne!(&ordinals, &(0..count).collect::<Vec<_>>());
            ordinals.sort_unstable();
            prop_assert_eq!(ordinals, (0..count).collect::<Vec<_>>());
        }
    }
}
