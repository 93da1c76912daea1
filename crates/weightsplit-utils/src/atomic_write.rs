//! Atomic file operations with cross-platform support
//!
//! Part files are written with:
//! - Temporary file creation in the target's directory, with fsync
//! - Optional permissions applied to the temporary file before it is visible
//! - Atomic rename into place
//! - Windows rename retry with exponential backoff (≤ 250ms total)
//!
//! A crash mid-write leaves only an anonymous temporary file behind, never a
//! truncated file under the final name.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs::Permissions;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

#[cfg(target_os = "windows")]
use std::{thread, time::Duration};

/// Result of an atomic write operation
#[derive(Debug, Clone, Default)]
pub struct AtomicWriteResult {
    /// Number of bytes written
    pub bytes_written: u64,
    /// Number of rename retries that occurred (Windows only)
    pub rename_retry_count: u32,
    /// Any warnings generated during the operation
    pub warnings: Vec<String>,
}

/// Atomically write bytes to a file using temp file + fsync + rename.
///
/// The content is written verbatim. The target's parent directory must already
/// exist; the temporary file is created there so the final rename never crosses
/// a filesystem boundary. An existing file at `path` is replaced.
///
/// Temporary files are created owner-only (0600 on unix) and the rename keeps
/// that mode unless `permissions` are given.
pub fn write_bytes_atomic(
    path: &Utf8Path,
    content: &[u8],
    permissions: Option<&Permissions>,
) -> Result<AtomicWriteResult> {
    let mut result = AtomicWriteResult::default();

    let temp_dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {temp_dir}"))?;

    temp_file
        .write_all(content)
        .with_context(|| "Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .with_context(|| "Failed to fsync temporary file")?;

    if let Some(permissions) = permissions {
        temp_file
            .as_file()
            .set_permissions(permissions.clone())
            .with_context(|| "Failed to set permissions on temporary file")?;
    }

    let retry_count = atomic_rename(temp_file, path.as_std_path())
        .with_context(|| format!("Failed to atomically write file: {path}"))?;

    result.bytes_written = content.len() as u64;
    result.rename_retry_count = retry_count;
    if retry_count > 0 {
        result.warnings.push(format!(
            "Rename required {retry_count} retries due to transient filesystem locks"
        ));
    }

    Ok(result)
}

/// Attempt atomic rename with platform-specific retry logic
///
/// Returns the number of retries that were needed.
/// On Windows, implements exponential backoff with ≤ 250ms total.
#[cfg(target_os = "windows")]
fn atomic_rename(mut temp_file: NamedTempFile, target: &Path) -> Result<u32> {
    use std::io::ErrorKind;

    const MAX_RETRIES: u32 = 5;
    const INITIAL_DELAY_MS: u64 = 10;
    const MAX_TOTAL_DELAY_MS: u64 = 250;

    let mut retry_count = 0;
    let mut total_delay_ms = 0;

    loop {
        match temp_file.persist(target) {
            Ok(_) => return Ok(retry_count),
            Err(persist_error) => {
                if retry_count >= MAX_RETRIES {
                    return Err(anyhow::anyhow!(persist_error.error));
                }

                // Antivirus and indexers briefly hold handles on fresh files.
                let is_retryable = matches!(
                    persist_error.error.kind(),
                    ErrorKind::PermissionDenied | ErrorKind::Other
                );

                if !is_retryable {
                    return Err(anyhow::anyhow!(persist_error.error));
                }

                let delay_ms = INITIAL_DELAY_MS * 2_u64.pow(retry_count);

                if total_delay_ms + delay_ms > MAX_TOTAL_DELAY_MS {
                    let remaining = MAX_TOTAL_DELAY_MS.saturating_sub(total_delay_ms);
                    if remaining > 0 {
                        thread::sleep(Duration::from_millis(remaining));
                    }
                    return persist_error
                        .file
                        .persist(target)
                        .map(|_| retry_count + 1)
                        .map_err(|e| anyhow::anyhow!(e.error));
                }

                thread::sleep(Duration::from_millis(delay_ms));
                total_delay_ms += delay_ms;
                retry_count += 1;

                temp_file = persist_error.file;
            }
        }
    }
}

/// Attempt atomic rename (Unix: no retry needed)
#[cfg(not(target_os = "windows"))]
fn atomic_rename(temp_file: NamedTempFile, target: &Path) -> Result<u32> {
    temp_file
        .persist(target)
        .map(|_| 0)
        .map_err(|e| anyhow::anyhow!(e.error))
}
