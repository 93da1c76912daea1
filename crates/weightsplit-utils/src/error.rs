use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::io;
use thiserror::Error;

use crate::types::OutcomeKind;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `WeightSplitError` is the primary error type returned by weightsplit library
/// operations that are not scoped to a single asset. Per-asset failures are
/// carried as [`AssetError`] inside the batch report and only surface here when
/// a caller works with a single asset directly.
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file or CLI argument errors |
/// | `Asset` | A single asset could not be inspected or split |
/// | `Io` | Filesystem failures outside of asset streaming |
/// | `ReportFailed` | The batch report could not be serialized |
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 3 | Asset not found |
/// | 4 | Asset I/O failure |
/// | 5 | Invalid threshold |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use weightsplit_utils::error::{ConfigError, WeightSplitError};
/// use weightsplit_utils::exit_codes::ExitCode;
///
/// let err = WeightSplitError::Config(ConfigError::InvalidFile("bad toml".to_string()));
/// assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
/// eprintln!("{}", err.display_for_user());
/// ```
///
/// Library code returns `WeightSplitError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum WeightSplitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Report emission failed: {reason}")]
    ReportFailed { reason: String },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FileSystem,
    AssetProcessing,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::FileSystem => write!(f, "File System"),
            Self::AssetProcessing => write!(f, "Asset Processing"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Asset listed more than once in inventory: {path}")]
    DuplicateAsset { path: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
            Self::DuplicateAsset { path } => {
                format!("Asset '{path}' appears more than once in the inventory")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with a [defaults] table \
                 and [[assets]] entries."
                    .to_string(),
            ),
            Self::InvalidValue { key, value: _ } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::NotFound { path: _ } => Some(
                "weightsplit searches for .weightsplit/config.toml starting from \
                 the current directory upward."
                    .to_string(),
            ),
            Self::DuplicateAsset { path: _ } => Some(
                "Splitting the same asset twice in one batch would race on its part files."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of the configuration file".to_string(),
                "Each [[assets]] entry needs a 'path' key".to_string(),
            ],
            Self::InvalidValue { key, value: _ } => vec![
                format!("Check the value of '{key}' in the configuration file or CLI flags"),
                "threshold_bytes must be a positive integer".to_string(),
            ],
            Self::NotFound { path: _ } => vec![
                "Pass an existing file with --config".to_string(),
                "Or create .weightsplit/config.toml in the project root".to_string(),
            ],
            Self::DuplicateAsset { path: _ } => {
                vec!["Remove the duplicate [[assets]] entry".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Per-asset failures raised by the size gate and chunk writer.
///
/// These never abort a batch: the batch runner catches them at the asset
/// boundary and records them in the report. Use [`AssetError::kind`] to get
/// the outcome classification.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset not found: {path}")]
    NotFound { path: Utf8PathBuf },

    #[error("invalid threshold {threshold_bytes} for {path}: {reason}")]
    InvalidThreshold {
        path: Utf8PathBuf,
        threshold_bytes: u64,
        reason: String,
    },

    #[error("not a regular file: {path}")]
    NotAFile { path: Utf8PathBuf },

    #[error("failed to read metadata for {path}: {source}")]
    Metadata {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path} at offset {offset}: {source}")]
    Read {
        path: Utf8PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to write part {ordinal} ({part}): {reason}")]
    Write {
        part: Utf8PathBuf,
        ordinal: u64,
        reason: String,
    },

    #[error("{path} changed size while splitting: expected {expected} bytes, read {actual}")]
    SizeChanged {
        path: Utf8PathBuf,
        expected: u64,
        actual: u64,
    },
}

impl AssetError {
    /// Outcome classification for the batch report.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::NotFound { .. } => OutcomeKind::NotFound,
            Self::InvalidThreshold { .. } => OutcomeKind::InvalidThreshold,
            Self::NotAFile { .. }
            | Self::Metadata { .. }
            | Self::Read { .. }
            | Self::Write { .. }
            | Self::SizeChanged { .. } => OutcomeKind::IoFailure,
        }
    }

    /// Path most relevant to the failure (the source, or the part being written).
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::NotFound { path }
            | Self::InvalidThreshold { path, .. }
            | Self::NotAFile { path }
            | Self::Metadata { path, .. }
            | Self::Read { path, .. }
            | Self::SizeChanged { path, .. } => path,
            Self::Write { part, .. } => part,
        }
    }
}

impl UserFriendlyError for AssetError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => format!("Asset {path} does not exist"),
            Self::InvalidThreshold {
                path,
                threshold_bytes,
                reason,
            } => format!("Threshold {threshold_bytes} for {path} is unusable: {reason}"),
            Self::NotAFile { path } => format!("{path} is not a regular file"),
            Self::Metadata { path, source } => {
                format!("Could not inspect {path}: {source}")
            }
            Self::Read {
                path,
                offset,
                source,
            } => format!("Reading {path} failed at byte {offset}: {source}"),
            Self::Write {
                part,
                ordinal,
                reason,
            } => format!("Writing part {ordinal} to {part} failed: {reason}"),
            Self::SizeChanged {
                path,
                expected,
                actual,
            } => format!("{path} was {expected} bytes when inspected but {actual} bytes were read"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } => Some(
                "Assets are produced by the upstream precision-conversion step \
                 and must exist before splitting."
                    .to_string(),
            ),
            Self::InvalidThreshold { .. } => {
                Some("Each part holds at most threshold_bytes bytes.".to_string())
            }
            Self::Read { .. } | Self::Write { .. } | Self::SizeChanged { .. } => Some(
                "Parts written before the failure are left in place; re-running overwrites them."
                    .to_string(),
            ),
            Self::NotAFile { .. } | Self::Metadata { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } => vec![
                "Run the conversion step that produces this asset".to_string(),
                "Check the asset path and base_dir in the configuration".to_string(),
            ],
            Self::InvalidThreshold { .. } => {
                vec!["Set threshold_bytes to a positive integer".to_string()]
            }
            Self::NotAFile { .. } => {
                vec!["Point the inventory entry at the asset file, not a directory".to_string()]
            }
            Self::Metadata { .. } | Self::Read { .. } => {
                vec!["Check file permissions on the asset".to_string()]
            }
            Self::Write { .. } => vec![
                "Check free disk space in the asset directory".to_string(),
                "Check write permissions on the asset directory".to_string(),
            ],
            Self::SizeChanged { .. } => vec![
                "Make sure the conversion step has finished writing the asset".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidThreshold { .. } => ErrorCategory::Configuration,
            _ => ErrorCategory::AssetProcessing,
        }
    }
}

impl UserFriendlyError for WeightSplitError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(config_err) => config_err.user_message(),
            Self::Asset(asset_err) => asset_err.user_message(),
            Self::Io(io_err) => {
                format!("File system operation failed: {io_err}")
            }
            Self::ReportFailed { reason } => {
                format!("Failed to produce the batch report: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(config_err) => config_err.context(),
            Self::Asset(asset_err) => asset_err.context(),
            Self::Io(_) => Some(
                "File system operations require appropriate permissions and available disk space."
                    .to_string(),
            ),
            Self::ReportFailed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(config_err) => config_err.suggestions(),
            Self::Asset(asset_err) => asset_err.suggestions(),
            Self::Io(_) => vec![
                "Check file and directory permissions".to_string(),
                "Ensure sufficient disk space is available".to_string(),
            ],
            Self::ReportFailed { .. } => {
                vec!["Re-run without --json to see the human-readable summary".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Asset(asset_err) => asset_err.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
            Self::ReportFailed { .. } => ErrorCategory::Internal,
        }
    }
}

impl WeightSplitError {
    /// Get a user-friendly error message with context and actionable suggestions
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    ///
    /// | Exit Code | Name | Description |
    /// |-----------|------|-------------|
    /// | 1 | INTERNAL | General failure |
    /// | 2 | CLI_ARGS | Invalid CLI arguments or configuration |
    /// | 3 | ASSET_NOT_FOUND | Asset missing |
    /// | 4 | ASSET_IO_FAILURE | Asset read/write failure |
    /// | 5 | INVALID_THRESHOLD | Unusable threshold |
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            WeightSplitError::Config(_) => ExitCode::CLI_ARGS,
            WeightSplitError::Asset(asset_err) => ExitCode::for_outcome(asset_err.kind()),
            WeightSplitError::Io(_) | WeightSplitError::ReportFailed { .. } => ExitCode::INTERNAL,
        }
    }
}
