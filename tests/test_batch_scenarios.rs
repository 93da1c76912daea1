//! End-to-end batch scenarios
//!
//! Tests:
//! - A missing asset is reported and does not stop later assets
//! - Re-running a split is idempotent
//! - Twelve parts reassemble in numeric (not lexicographic) order
//! - Stale parts from an earlier, finer split are pruned
//! - A mid-stream read failure leaves earlier parts complete and fails the asset
//! - A part that cannot be written fails its asset but not the rest of the batch
//! - The 200 MiB asset with an 80 MiB threshold becomes 80 + 80 + 40 MiB parts
//! - An asset of exactly 80 MiB is not split

use anyhow::Result;
use camino::Utf8PathBuf;
use std::fs::{self, File};
use std::io::{self, Read};
use tempfile::TempDir;
use weightsplit::types::OutcomeKind;
use weightsplit::{
    AssetError, AssetOutcome, BatchOptions, ChunkWriter, DEFAULT_THRESHOLD_BYTES, ExitCode,
    FailurePolicy, Inventory, discover_parts, part_path, run_batch,
};

const MIB: u64 = 1024 * 1024;

fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 253) as u8).collect()
}

#[test]
fn test_missing_asset_does_not_stop_batch() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8_dir(&temp);
    let present = root.join("vocoder.onnx");
    fs::write(&present, pattern(300))?;

    let inventory = Inventory::uniform([root.join("vector_estimator.onnx"), present.clone()], 100);
    let report = run_batch(&inventory, &BatchOptions::default());

    assert_eq!(report.assets[0].kind(), OutcomeKind::NotFound);
    assert_eq!(report.assets[1].kind(), OutcomeKind::Split);
    assert_eq!(discover_parts(&present)?.len(), 3);
    assert!(!part_path(&root.join("vector_estimator.onnx"), 0).exists());

    assert_eq!(
        report.exit_code(FailurePolicy::Strict),
        ExitCode::ASSET_NOT_FOUND
    );
    assert_eq!(
        report.exit_code(FailurePolicy::IgnoreMissing),
        ExitCode::SUCCESS
    );
    assert_eq!(report.exit_code(FailurePolicy::BestEffort), ExitCode::SUCCESS);
    Ok(())
}

#[test]
fn test_resplit_is_idempotent() -> Result<()> {
    let temp = TempDir::new()?;
    let asset = utf8_dir(&temp).join("model.onnx");
    fs::write(&asset, pattern(250))?;
    let inventory = Inventory::uniform([asset.clone()], 100);

    run_batch(&inventory, &BatchOptions::default());
    let first: Vec<(Utf8PathBuf, Vec<u8>)> = discover_parts(&asset)?
        .into_iter()
        .map(|p| {
            let bytes = fs::read(&p.path).unwrap();
            (p.path, bytes)
        })
        .collect();

    let report = run_batch(&inventory, &BatchOptions::default());
    let second: Vec<(Utf8PathBuf, Vec<u8>)> = discover_parts(&asset)?
        .into_iter()
        .map(|p| {
            let bytes = fs::read(&p.path).unwrap();
            (p.path, bytes)
        })
        .collect();

    assert_eq!(first, second);
    assert!(report.is_clean());
    // Only the source and its three parts; no temp files left behind.
    assert_eq!(fs::read_dir(temp.path())?.count(), 4);
    Ok(())
}

#[test]
fn test_twelve_parts_reassemble_in_numeric_order() -> Result<()> {
    let temp = TempDir::new()?;
    let asset = utf8_dir(&temp).join("model.onnx");
    let data = pattern(12 * 10 - 3);
    fs::write(&asset, &data)?;

    run_batch(
        &Inventory::uniform([asset.clone()], 10),
        &BatchOptions::default(),
    );

    let parts = discover_parts(&asset)?;
    assert_eq!(parts.len(), 12);
    assert_eq!(parts[2].path, part_path(&asset, 2));
    assert_eq!(parts[10].path, part_path(&asset, 10));

    let mut numeric = Vec::new();
    for part in &parts {
        numeric.extend(fs::read(&part.path)?);
    }
    assert_eq!(numeric, data);

    // Lexicographic name order puts part10 before part2 and corrupts the asset.
    let mut names: Vec<Utf8PathBuf> = parts.iter().map(|p| p.path.clone()).collect();
    names.sort();
    let mut lexicographic = Vec::new();
    for name in &names {
        lexicographic.extend(fs::read(name)?);
    }
    assert_ne!(lexicographic, data);
    Ok(())
}

#[test]
fn test_stale_parts_pruned_after_coarser_split() -> Result<()> {
    let temp = TempDir::new()?;
    let asset = utf8_dir(&temp).join("model.onnx");
    let data = pattern(100);
    fs::write(&asset, &data)?;

    run_batch(
        &Inventory::uniform([asset.clone()], 10),
        &BatchOptions::default(),
    );
    assert_eq!(discover_parts(&asset)?.len(), 10);

    let report = run_batch(
        &Inventory::uniform([asset.clone()], 40),
        &BatchOptions::default(),
    );
    match &report.assets[0].outcome {
        AssetOutcome::Split { parts, pruned, .. } => {
            assert_eq!(parts.len(), 3);
            assert_eq!(pruned.len(), 7);
        }
        other => panic!("expected split, got {other:?}"),
    }

    let parts = discover_parts(&asset)?;
    assert_eq!(parts.len(), 3);
    let joined: Vec<u8> = parts
        .iter()
        .flat_map(|p| fs::read(&p.path).unwrap())
        .collect();
    assert_eq!(joined, data);
    Ok(())
}

/// Serves `ok_bytes` bytes of data, then fails every read.
struct FailingReader {
    data: Vec<u8>,
    pos: usize,
    ok_bytes: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.ok_bytes {
            return Err(io::Error::other("simulated device error"));
        }
        let n = buf.len().min(self.ok_bytes - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[test]
fn test_read_failure_keeps_earlier_parts() -> Result<()> {
    let temp = TempDir::new()?;
    let asset = utf8_dir(&temp).join("model.onnx");
    let data = pattern(50);
    let reader = FailingReader {
        data: data.clone(),
        pos: 0,
        ok_bytes: 25,
    };

    let err = ChunkWriter::new(asset.clone(), 10)?
        .split_reader(reader, Some(50))
        .unwrap_err();

    match &err {
        AssetError::Read { offset, .. } => assert_eq!(*offset, 20),
        other => panic!("expected read error, got {other:?}"),
    }
    assert_eq!(err.kind(), OutcomeKind::IoFailure);

    // Parts 0 and 1 were fully written before the failing block; nothing else exists.
    assert_eq!(fs::read(part_path(&asset, 0))?, &data[..10]);
    assert_eq!(fs::read(part_path(&asset, 1))?, &data[10..20]);
    assert!(!part_path(&asset, 2).exists());
    assert_eq!(fs::read_dir(temp.path())?.count(), 2);
    Ok(())
}

#[test]
fn test_write_failure_does_not_stop_batch() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8_dir(&temp);
    let blocked = root.join("vector_estimator.onnx");
    let healthy = root.join("vocoder.onnx");
    fs::write(&blocked, pattern(250))?;
    fs::write(&healthy, pattern(250))?;
    // A directory where part 1 should go makes the rename fail.
    fs::create_dir(part_path(&blocked, 1))?;

    let report = run_batch(
        &Inventory::uniform([blocked.clone(), healthy.clone()], 100),
        &BatchOptions::default(),
    );

    let kinds: Vec<OutcomeKind> = report.assets.iter().map(|a| a.kind()).collect();
    assert_eq!(kinds, vec![OutcomeKind::IoFailure, OutcomeKind::Split]);
    assert_eq!(
        report.exit_code(FailurePolicy::Strict),
        ExitCode::ASSET_IO_FAILURE
    );
    assert_eq!(
        report.exit_code(FailurePolicy::IgnoreMissing),
        ExitCode::ASSET_IO_FAILURE
    );

    assert_eq!(fs::read(part_path(&blocked, 0))?, &pattern(250)[..100]);
    assert!(!part_path(&blocked, 2).exists());
    assert_eq!(discover_parts(&healthy)?.len(), 3);
    Ok(())
}

#[test]
fn test_200_mib_asset_with_80_mib_threshold() -> Result<()> {
    let temp = TempDir::new()?;
    let asset = utf8_dir(&temp).join("vector_estimator.onnx");
    // Sparse file: the size is what matters, not the content.
    File::create(&asset)?.set_len(200 * MIB)?;

    let report = run_batch(
        &Inventory::uniform([asset.clone()], DEFAULT_THRESHOLD_BYTES),
        &BatchOptions::default(),
    );
    assert_eq!(report.assets[0].kind(), OutcomeKind::Split);

    let sizes: Vec<u64> = discover_parts(&asset)?
        .iter()
        .map(|p| p.size_bytes)
        .collect();
    assert_eq!(sizes, vec![80 * MIB, 80 * MIB, 40 * MIB]);
    assert_eq!(fs::metadata(&asset)?.len(), 200 * MIB);
    Ok(())
}

#[test]
fn test_exactly_80_mib_is_not_split() -> Result<()> {
    let temp = TempDir::new()?;
    let asset = utf8_dir(&temp).join("vocoder.onnx");
    File::create(&asset)?.set_len(80 * MIB)?;

    let report = run_batch(
        &Inventory::uniform([asset.clone()], DEFAULT_THRESHOLD_BYTES),
        &BatchOptions::default(),
    );
    assert_eq!(
        report.assets[0].outcome,
        AssetOutcome::Skipped {
            size_bytes: 80 * MIB
        }
    );
    assert!(discover_parts(&asset)?.is_empty());
    Ok(())
}
