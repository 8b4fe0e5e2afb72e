//! The aggregation core: merges per-project generation requests into one
//! model per key, then materializes each key into its artifact.
//!
//! Many callers submit for the same key in arbitrary order, potentially from
//! parallel workers; all registry mutation happens under a single lock held
//! only for the in-memory merge (never across I/O). Materialization consumes
//! the aggregator by value, so the submit-then-materialize barrier is enforced
//! by the type system rather than by caller discipline.
//!
//! Per-key lifecycle: unseen → pending (content before declaration) → typed
//! (declaration registered, pending contributions migrated exactly once) →
//! materialized. Keys still pending at materialize time are orphaned: their
//! owner may simply not be part of the current generation subset, so they are
//! dropped silently rather than treated as errors.

use crate::error::{GenError, Result};
use crate::manifest::{ManifestEntry, ProjectManifest};
use crate::model::{Contributions, GeneratedArtifact, TypeDeclaration};
use crate::render;
use crate::writer::{self, ArtifactStore, MaterializeReport, WriteOutcome};
use indexmap::IndexMap;
use indexmap::map::Entry;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

enum KeyState {
    /// Contributions buffered before any declaration arrived.
    Pending(Contributions),
    Typed(TypedEntry),
}

struct TypedEntry {
    owner: String,
    declaration: TypeDeclaration,
    contributions: Contributions,
}

/// Options for the terminal materialize pass.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Root against which relative destination paths resolve.
    pub output_root: PathBuf,
    /// Sort contributors by name at render time instead of preserving
    /// first-submission order.
    pub sort_contributors: bool,
    /// Render and diff, but never write.
    pub dry_run: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            sort_contributors: false,
            dry_run: false,
        }
    }
}

/// Process-wide collection point for generation requests. One instance per
/// generation run; construct a fresh one per test.
#[derive(Default)]
pub struct Aggregator {
    registry: Mutex<IndexMap<String, KeyState>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the owning declaration for `key`, claimed by `contributor`.
    ///
    /// Any contributions buffered for the key so far migrate into the typed
    /// entry, preserving contributor order and each contributor's value
    /// order. A second declaration for the same key is an ownership violation
    /// and fails with [`GenError::DuplicateDeclaration`].
    pub fn register_declaration(
        &self,
        key: &str,
        contributor: &str,
        declaration: TypeDeclaration,
    ) -> Result<()> {
        debug_assert!(!key.is_empty(), "generation key must not be empty");

        let mut registry = self.registry.lock();
        match registry.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                debug!(key, contributor, kind = %declaration.kind(), "declaration registered");
                slot.insert(KeyState::Typed(TypedEntry {
                    owner: contributor.to_string(),
                    declaration,
                    contributions: Contributions::new(),
                }));
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                let state = slot.get_mut();
                match state {
                    KeyState::Pending(pending) => {
                        let migrated = std::mem::take(pending);
                        debug!(
                            key,
                            contributor,
                            migrated_contributors = migrated.len(),
                            "declaration registered, pending contributions migrated"
                        );
                        *state = KeyState::Typed(TypedEntry {
                            owner: contributor.to_string(),
                            declaration,
                            contributions: migrated,
                        });
                        Ok(())
                    }
                    KeyState::Typed(entry) => Err(GenError::DuplicateDeclaration {
                        key: key.to_string(),
                        prior_owner: entry.owner.clone(),
                        prior_target: entry.declaration.target_name.clone(),
                        new_owner: contributor.to_string(),
                        new_target: declaration.target_name,
                    }),
                }
            }
        }
    }

    /// Submit ordered content values for `key` on behalf of `contributor`.
    ///
    /// Buffers under pending state until a declaration arrives. An empty
    /// value list is a no-op. A second submission from the same contributor
    /// for the same key fails with [`GenError::DuplicateContributor`].
    pub fn submit_content(&self, key: &str, contributor: &str, values: Vec<String>) -> Result<()> {
        debug_assert!(!key.is_empty(), "generation key must not be empty");

        if values.is_empty() {
            return Ok(());
        }

        let mut registry = self.registry.lock();
        let contributions = match registry
            .entry(key.to_string())
            .or_insert_with(|| KeyState::Pending(Contributions::new()))
        {
            KeyState::Pending(pending) => pending,
            KeyState::Typed(entry) => &mut entry.contributions,
        };

        if contributions.contains_key(contributor) {
            return Err(GenError::DuplicateContributor {
                key: key.to_string(),
                contributor: contributor.to_string(),
            });
        }
        debug!(key, contributor, values = values.len(), "content submitted");
        contributions.insert(contributor.to_string(), values);
        Ok(())
    }

    /// Apply one project's parsed manifest: owning entries register their
    /// declaration and submit the project's own values; content-only entries
    /// just submit.
    pub fn ingest_manifest(&self, contributor: &str, manifest: ProjectManifest) -> Result<()> {
        for (key, entry) in manifest.entries {
            match entry {
                ManifestEntry::Owning {
                    declaration,
                    values,
                } => {
                    self.register_declaration(&key, contributor, declaration)?;
                    self.submit_content(&key, contributor, values)?;
                }
                ManifestEntry::ContentOnly { values } => {
                    self.submit_content(&key, contributor, values)?;
                }
            }
        }
        Ok(())
    }

    /// Render every typed key and write the artifacts that changed.
    ///
    /// Rendering and validation run for all keys before the first write, so a
    /// validation failure never leaves a partially updated artifact set.
    /// Write failures do not abort the pass: every artifact is attempted and
    /// all failures are reported together.
    pub fn materialize_all(
        self,
        store: &mut dyn ArtifactStore,
        options: &MaterializeOptions,
    ) -> Result<MaterializeReport> {
        let registry = self.registry.into_inner();
        let mut report = MaterializeReport::default();
        let mut rendered = Vec::new();

        for (key, state) in registry {
            match state {
                KeyState::Pending(contributions) => {
                    debug!(
                        key,
                        contributors = contributions.len(),
                        "key has no owning declaration, dropping"
                    );
                    report.orphaned.push(key);
                }
                KeyState::Typed(entry) => {
                    let artifact = GeneratedArtifact {
                        key,
                        owner: entry.owner,
                        declaration: entry.declaration,
                        contributions: entry.contributions,
                    };
                    let text = render::render_artifact(&artifact, options.sort_contributors)?;
                    debug!(
                        key = %artifact.key,
                        content_hash = %writer::content_hash(&text),
                        "artifact rendered"
                    );
                    let destination =
                        resolve_destination(&options.output_root, &artifact.declaration.destination);
                    rendered.push((destination, text));
                }
            }
        }

        let mut failures = Vec::new();
        for (destination, text) in rendered {
            match writer::write_if_changed(store, &destination, text.as_bytes(), options.dry_run) {
                Ok(WriteOutcome::Written) => report.written.push(destination),
                Ok(WriteOutcome::Unchanged) => report.unchanged.push(destination),
                Err(failure) => failures.push(failure),
            }
        }
        if !failures.is_empty() {
            return Err(GenError::WriteFailures { failures });
        }

        info!(
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            orphaned = report.orphaned.len(),
            dry_run = options.dry_run,
            "materialize pass complete"
        );
        Ok(report)
    }
}

fn resolve_destination(output_root: &Path, destination: &Path) -> PathBuf {
    if destination.is_absolute() {
        destination.to_path_buf()
    } else {
        output_root.join(destination)
    }
}
