//! Exit code constants and outcome mapping for weightsplit.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `ASSET_NOT_FOUND` | At least one asset was missing |
//! | 4 | `ASSET_IO_FAILURE` | At least one asset hit a read/write failure |
//! | 5 | `INVALID_THRESHOLD` | At least one asset had an unusable threshold |
//!
//! When a batch has several kinds of failure, the most severe wins:
//! I/O failure, then invalid threshold, then not found.

use crate::types::OutcomeKind;

/// Exit codes matching the documented exit code table.
///
/// # Example
///
/// ```rust
/// use weightsplit_utils::exit_codes::ExitCode;
/// use weightsplit_utils::types::OutcomeKind;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::for_outcome(OutcomeKind::NotFound), ExitCode::ASSET_NOT_FOUND);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments or config
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Asset not found - a configured asset did not exist
    pub const ASSET_NOT_FOUND: ExitCode = ExitCode(3);

    /// Asset I/O failure - reading or writing an asset failed mid-stream
    pub const ASSET_IO_FAILURE: ExitCode = ExitCode(4);

    /// Invalid threshold - an asset was configured with threshold 0
    pub const INVALID_THRESHOLD: ExitCode = ExitCode(5);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Exit code for a single asset outcome. Non-failure kinds map to `SUCCESS`.
    #[must_use]
    pub const fn for_outcome(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Skipped | OutcomeKind::Split | OutcomeKind::Planned => Self::SUCCESS,
            OutcomeKind::NotFound => Self::ASSET_NOT_FOUND,
            OutcomeKind::IoFailure => Self::ASSET_IO_FAILURE,
            OutcomeKind::InvalidThreshold => Self::INVALID_THRESHOLD,
        }
    }

    /// Ranking used to pick one code for a batch with mixed failures.
    const fn severity(self) -> u8 {
        match self.0 {
            0 => 0,
            3 => 1,
            5 => 2,
            4 => 3,
            _ => 4,
        }
    }

    /// Pick the more severe of two exit codes.
    #[must_use]
    pub const fn max_severity(self, other: ExitCode) -> ExitCode {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
