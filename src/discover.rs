//! Project manifest discovery.
//!
//! A generation run is driven by a set of per-project manifest files. They
//! are either listed explicitly or found by scanning the manifest root for
//! `*.codegen.json`. The file name (minus the suffix) names the contributor.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const MANIFEST_SUFFIX: &str = ".codegen.json";

/// A manifest file paired with the contributor it speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredManifest {
    pub contributor: String,
    pub path: PathBuf,
}

/// Recursively scan `root` for manifest files. Results are sorted by
/// contributor name so a scan is a stable, reproducible ingestion order.
pub fn discover_manifests(root: &Path) -> Result<Vec<DiscoveredManifest>> {
    let mut manifests = Vec::new();
    for entry in WalkDir::new(root) {
        let entry =
            entry.with_context(|| format!("failed to scan manifest root {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if let Some(contributor) = contributor_name(&path) {
            debug!(contributor, path = %path.display(), "manifest discovered");
            manifests.push(DiscoveredManifest { contributor, path });
        }
    }
    manifests.sort_by(|a, b| a.contributor.cmp(&b.contributor));
    Ok(manifests)
}

/// Contributor name for a manifest path: the file name with the manifest
/// suffix stripped, falling back to the file stem for explicitly listed files
/// that don't follow the `*.codegen.json` convention.
pub fn contributor_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    file_name
        .strip_suffix(MANIFEST_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// Contributor name for an explicitly supplied manifest path.
pub fn contributor_name_for_explicit(path: &Path) -> Option<String> {
    contributor_name(path).or_else(|| {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
    })
}
