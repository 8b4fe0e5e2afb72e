pub mod aggregator;
pub mod config;
pub mod discover;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod render;
pub mod writer;

pub use aggregator::{Aggregator, MaterializeOptions};
pub use config::{CliArgs, RunConfig};
pub use discover::DiscoveredManifest;
pub use error::{GenError, Result};
pub use logging::{LoggingConfig, init_logging};
pub use manifest::{ManifestEntry, ProjectManifest};
pub use model::{GeneratedArtifact, TypeDeclaration, TypeKind, TypeShape};
pub use writer::{ArtifactStore, FsStore, MaterializeReport, WriteOutcome};

use anyhow::Context;
use tracing::info;

/// Run one full generation pass: discover project manifests, ingest them,
/// then materialize every owned key.
///
/// Manifest files are loaded and parsed on one worker thread each, but
/// submissions happen in stable source order: contributor ordering in the
/// generated artifacts must not depend on thread scheduling. The aggregator
/// itself tolerates fully concurrent submission for hosts that drive it that
/// way. Materialization runs single-threaded once ingestion is complete.
pub fn run_generation(config: RunConfig) -> anyhow::Result<MaterializeReport> {
    config.ensure_inputs()?;

    let mut sources = Vec::new();
    if let Some(root) = config.manifest_root.as_ref() {
        sources.extend(discover::discover_manifests(root)?);
    }
    for path in &config.manifests {
        let contributor = discover::contributor_name_for_explicit(path).with_context(|| {
            format!("cannot derive a contributor name from {}", path.display())
        })?;
        sources.push(DiscoveredManifest {
            contributor,
            path: path.clone(),
        });
    }
    anyhow::ensure!(
        !sources.is_empty(),
        "no project manifests found under the configured sources"
    );

    info!(manifest_count = sources.len(), "starting generation run");

    let manifests: Vec<Result<ProjectManifest>> = std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| scope.spawn(move || ProjectManifest::load(&source.path)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let aggregator = Aggregator::new();
    for (source, manifest) in sources.iter().zip(manifests) {
        aggregator.ingest_manifest(&source.contributor, manifest?)?;
    }

    let options = MaterializeOptions {
        output_root: config.output_root.clone(),
        sort_contributors: config.sort_contributors,
        dry_run: config.dry_run,
    };
    let report = aggregator.materialize_all(&mut FsStore::new(), &options)?;
    Ok(report)
}
