use camino::Utf8PathBuf;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, WeightSplitError};

use super::{AssetOrigin, Config};

/// One asset to process and the threshold that applies to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    /// Resolved path of the source asset.
    pub path: Utf8PathBuf,
    /// Maximum bytes per part.
    pub threshold_bytes: u64,
}

impl AssetEntry {
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, threshold_bytes: u64) -> Self {
        Self {
            path: path.into(),
            threshold_bytes,
        }
    }
}

/// Ordered list of assets that are candidates for splitting.
///
/// Pure data: the batch runner walks it front to back. Build one from a
/// [`Config`] with [`Config::inventory`], or construct it directly when
/// embedding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub entries: Vec<AssetEntry>,
}

impl Inventory {
    #[must_use]
    pub fn new(entries: Vec<AssetEntry>) -> Self {
        Self { entries }
    }

    /// Same threshold for every path.
    #[must_use]
    pub fn uniform<I, P>(paths: I, threshold_bytes: u64) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self {
            entries: paths
                .into_iter()
                .map(|p| AssetEntry::new(p, threshold_bytes))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a AssetEntry;
    type IntoIter = std::slice::Iter<'a, AssetEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn to_utf8(path: PathBuf) -> Result<Utf8PathBuf, WeightSplitError> {
    Utf8PathBuf::from_path_buf(path).map_err(|p| {
        WeightSplitError::Config(ConfigError::InvalidValue {
            key: "assets.path".to_string(),
            value: format!("path is not valid UTF-8: {}", p.display()),
        })
    })
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl Config {
    /// Resolve the configured assets into an [`Inventory`].
    ///
    /// Inventory paths resolve against [`Config::base_dir`]; command-line paths
    /// resolve against the project root, which is the working directory in
    /// that case. Entries without their own threshold get the default.
    pub fn inventory(&self) -> Result<Inventory, WeightSplitError> {
        let base = match self.asset_origin {
            AssetOrigin::Inventory => self.base_dir(),
            AssetOrigin::CommandLine => self.project_root.clone(),
        };
        let default_threshold = self.threshold_bytes();

        let entries = self
            .assets
            .iter()
            .map(|asset| {
                Ok(AssetEntry {
                    path: to_utf8(resolve(&base, &asset.path))?,
                    threshold_bytes: asset.threshold_bytes.unwrap_or(default_threshold),
                })
            })
            .collect::<Result<Vec<_>, WeightSplitError>>()?;

        Ok(Inventory { entries })
    }
}
