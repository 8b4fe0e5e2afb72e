//! Error types for the generation run.
//!
//! Every error here is fatal for the run: a broken manifest, an ownership
//! violation, or a failed artifact write all indicate a misconfigured project
//! set that must be fixed at the source. Orphaned keys (content without an
//! owning declaration) are deliberately *not* errors; see
//! [`crate::aggregator::Aggregator::materialize_all`].

use std::io;
use std::path::PathBuf;

pub type Result<T, E = GenError> = std::result::Result<T, E>;

/// A single failed artifact write, carrying the destination and the I/O cause.
#[derive(Debug, thiserror::Error)]
#[error("failed to write artifact {}", path.display())]
pub struct ArtifactWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("failed to read manifest {}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest {}: {detail}", path.display())]
    ManifestParse { path: PathBuf, detail: String },

    #[error("unknown generation type kind '{kind}' for key '{key}'")]
    UnknownTypeKind { key: String, kind: String },

    /// Ownership violation: a key may carry exactly one type declaration per
    /// run. Names both owners and both target names so the conflict can be
    /// traced to its projects.
    #[error(
        "duplicate declaration for key '{key}': '{new_owner}' declares '{new_target}' \
         but '{prior_owner}' already declared '{prior_target}'"
    )]
    DuplicateDeclaration {
        key: String,
        prior_owner: String,
        prior_target: String,
        new_owner: String,
        new_target: String,
    },

    #[error("contributor '{contributor}' submitted content twice for key '{key}'")]
    DuplicateContributor { key: String, contributor: String },

    /// Two contributions carry the same enumerator literal. Rejected here so
    /// the clash is reported against the contributing projects rather than as
    /// a compiler error in a generated file.
    #[error(
        "duplicate enumerator '{value}' for key '{key}': \
         contributed by '{first_contributor}' and '{second_contributor}'"
    )]
    DuplicateValue {
        key: String,
        value: String,
        first_contributor: String,
        second_contributor: String,
    },

    #[error("{}", summarize_write_failures(.failures))]
    WriteFailures { failures: Vec<ArtifactWriteError> },
}

fn summarize_write_failures(failures: &[ArtifactWriteError]) -> String {
    let paths = failures
        .iter()
        .map(|failure| failure.path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} artifact write(s) failed: {paths}", failures.len())
}
