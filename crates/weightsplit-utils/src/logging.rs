//! Logging and observability infrastructure for weightsplit
//!
//! Structured logging goes through `tracing`. The CLI installs a subscriber
//! with [`init_tracing`]; library callers may install their own.

use std::io::IsTerminal;
use tracing::{Level, error, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::types::OutcomeKind;

/// Check if colored output should be used.
///
/// Returns true only if stderr is a terminal and `NO_COLOR` is not set.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Build the filter used by [`init_tracing`].
///
/// `RUST_LOG` takes precedence. Otherwise weightsplit crates log at `info`
/// (or `debug` when verbose) and everything else at `warn`.
#[must_use]
pub fn default_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            let level = if verbose { "debug" } else { "info" };
            EnvFilter::try_new(format!(
                "weightsplit={level},weightsplit_engine={level},weightsplit_config={level},warn"
            ))
        })
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing subscriber for structured logging
///
/// Log output goes to stderr so stdout stays reserved for status lines and
/// JSON reports. Verbose mode adds targets and span close events with timing.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = default_env_filter(verbose);

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(use_color())
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(use_color())
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span covering all work on a single asset.
pub fn asset_span(asset: &str, threshold_bytes: u64) -> tracing::Span {
    span!(
        Level::INFO,
        "asset",
        asset = %asset,
        threshold_bytes = threshold_bytes,
    )
}

/// Log the final outcome for one asset with structured fields.
///
/// Failures log at `error` (I/O) or `warn` (missing asset, bad threshold) so a
/// `RUST_LOG=warn` run still shows every asset that did not complete.
pub fn log_asset_outcome(asset: &str, kind: OutcomeKind, parts: usize, detail: Option<&str>) {
    match kind {
        OutcomeKind::Skipped => info!(asset = %asset, outcome = %kind, "Asset within threshold"),
        OutcomeKind::Split => info!(asset = %asset, outcome = %kind, parts, "Asset split"),
        OutcomeKind::Planned => {
            info!(asset = %asset, outcome = %kind, parts, "Asset would be split")
        }
        OutcomeKind::NotFound | OutcomeKind::InvalidThreshold => warn!(
            asset = %asset,
            outcome = %kind,
            error = detail.unwrap_or(""),
            "Asset not processed"
        ),
        OutcomeKind::IoFailure => error!(
            asset = %asset,
            outcome = %kind,
            error = detail.unwrap_or(""),
            "Asset processing failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_span_is_constructible_without_subscriber() {
        let span = asset_span("models/a.onnx", 1024);
        let _guard = span.enter();
        log_asset_outcome("models/a.onnx", OutcomeKind::Split, 3, None);
        log_asset_outcome(
            "models/b.onnx",
            OutcomeKind::IoFailure,
            0,
            Some("disk full"),
        );
    }

    #[test]
    fn test_default_env_filter_builds() {
        let _quiet = default_env_filter(false);
        let _verbose = default_env_filter(true);
    }
}
