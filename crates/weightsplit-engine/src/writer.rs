//! Chunk writer: stream a source asset into ordered, size-bounded part files.
//!
//! The writer holds exactly one block buffer of `threshold_bytes`, so memory
//! use does not depend on the asset's size. Blocks are read sequentially and
//! each one is persisted (temp file, fsync, rename) before the next read.
//! Parts split from a file on disk carry that file's permissions.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fs::{File, Permissions};
use std::io::{self, Read};
use tracing::{debug, warn};

use weightsplit_utils::atomic_write::write_bytes_atomic;
use weightsplit_utils::error::AssetError;

use crate::parts::part_path;

/// One part written by the chunk writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkRecord {
    pub ordinal: u64,
    pub path: Utf8PathBuf,
    pub size_bytes: u64,
}

/// Splits one asset into `<asset>.part<N>` files.
#[derive(Debug, Clone)]
pub struct ChunkWriter {
    asset: Utf8PathBuf,
    threshold_bytes: u64,
    block_len: usize,
}

impl ChunkWriter {
    /// Create a writer for `asset`.
    ///
    /// Fails with `InvalidThreshold` if the threshold is zero or does not fit
    /// in memory on this platform.
    pub fn new(asset: impl Into<Utf8PathBuf>, threshold_bytes: u64) -> Result<Self, AssetError> {
        let asset = asset.into();
        if threshold_bytes == 0 {
            return Err(AssetError::InvalidThreshold {
                path: asset,
                threshold_bytes,
                reason: "must be greater than 0".to_string(),
            });
        }
        let block_len =
            usize::try_from(threshold_bytes).map_err(|_| AssetError::InvalidThreshold {
                path: asset.clone(),
                threshold_bytes,
                reason: "exceeds addressable memory on this platform".to_string(),
            })?;

        Ok(Self {
            asset,
            threshold_bytes,
            block_len,
        })
    }

    #[must_use]
    pub fn asset(&self) -> &Utf8Path {
        &self.asset
    }

    #[must_use]
    pub fn threshold_bytes(&self) -> u64 {
        self.threshold_bytes
    }

    /// Split the asset file on disk.
    ///
    /// `expected_size` is the size the gate observed. If the stream ends at a
    /// different length the split fails with `SizeChanged`; parts written up
    /// to that point stay in place.
    pub fn split(&self, expected_size: u64) -> Result<Vec<ChunkRecord>, AssetError> {
        let source = File::open(&self.asset).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                AssetError::NotFound {
                    path: self.asset.clone(),
                }
            } else {
                AssetError::Read {
                    path: self.asset.clone(),
                    offset: 0,
                    source,
                }
            }
        })?;
        let permissions = source
            .metadata()
            .map_err(|source| AssetError::Metadata {
                path: self.asset.clone(),
                source,
            })?
            .permissions();
        #[cfg(windows)]
        let permissions = {
            let mut permissions = permissions;
            permissions.set_readonly(false);
            permissions
        };

        self.write_parts(source, Some(expected_size), Some(&permissions))
    }

    /// Split an arbitrary byte stream into parts named after this writer's asset.
    ///
    /// On a read or write error the split stops immediately. Parts already
    /// persisted are left as they are; the in-flight temporary file is removed.
    /// Parts get the default mode of a new temporary file (owner-only on unix).
    pub fn split_reader<R: Read>(
        &self,
        reader: R,
        expected_size: Option<u64>,
    ) -> Result<Vec<ChunkRecord>, AssetError> {
        self.write_parts(reader, expected_size, None)
    }

    fn write_parts<R: Read>(
        &self,
        mut reader: R,
        expected_size: Option<u64>,
        permissions: Option<&Permissions>,
    ) -> Result<Vec<ChunkRecord>, AssetError> {
        let mut block = vec![0u8; self.block_len];
        let mut records = Vec::new();
        let mut offset: u64 = 0;
        let mut ordinal: u64 = 0;

        loop {
            let filled = fill_block(&mut reader, &mut block).map_err(|source| AssetError::Read {
                path: self.asset.clone(),
                offset,
                source,
            })?;
            if filled == 0 {
                break;
            }

            let part = part_path(&self.asset, ordinal);
            let result = write_bytes_atomic(&part, &block[..filled], permissions).map_err(|e| {
                AssetError::Write {
                    part: part.clone(),
                    ordinal,
                    reason: format!("{e:#}"),
                }
            })?;
            for warning in &result.warnings {
                warn!(part = %part, warning = %warning, "Part written with warnings");
            }
            debug!(part = %part, ordinal, bytes = filled, "Wrote part");

            records.push(ChunkRecord {
                ordinal,
                path: part,
                size_bytes: filled as u64,
            });
            offset += filled as u64;
            ordinal += 1;

            // A short block means the stream is exhausted.
            if filled < block.len() {
                break;
            }
        }

        if let Some(expected) = expected_size
            && offset != expected
        {
            return Err(AssetError::SizeChanged {
                path: self.asset.clone(),
                expected,
                actual: offset,
            });
        }

        Ok(records)
    }
}

/// Read until `buf` is full or the stream ends. Returns the bytes read.
fn fill_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
