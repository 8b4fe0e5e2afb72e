//! Per-project generation manifest parsing.
//!
//! Each project ships a JSON document mapping generation keys to entries. An
//! entry always carries a `Content` value list; the single project that owns
//! the key additionally carries the type declaration fields (`Type` plus
//! `ClassName`/`Filepath` for enums, `ElementType`/`Name`/`Filepath` and
//! optional `Includes` for arrays).
//!
//! The raw document shape is deserialized into [`RawEntry`] and immediately
//! resolved into the discriminated [`ManifestEntry`], so downstream code never
//! probes optional fields.

use crate::error::{GenError, Result};
use crate::model::TypeDeclaration;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const KIND_ENUM: &str = "Enum";
const KIND_ARRAY: &str = "Array";

/// One resolved manifest entry for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// This project owns the key: it supplies the declaration and its own
    /// values.
    Owning {
        declaration: TypeDeclaration,
        values: Vec<String>,
    },
    /// This project only contributes values to a key owned elsewhere.
    ContentOnly { values: Vec<String> },
}

impl ManifestEntry {
    pub fn values(&self) -> &[String] {
        match self {
            ManifestEntry::Owning { values, .. } => values,
            ManifestEntry::ContentOnly { values } => values,
        }
    }
}

/// A parsed project manifest: key → resolved entry, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectManifest {
    pub entries: IndexMap<String, ManifestEntry>,
}

/// Wire shape of a manifest entry before resolution.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "Type")]
    kind: Option<String>,
    #[serde(rename = "ClassName")]
    class_name: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "ElementType")]
    element_type: Option<String>,
    #[serde(rename = "Filepath")]
    filepath: Option<PathBuf>,
    #[serde(rename = "Includes", default)]
    includes: Vec<String>,
    #[serde(rename = "Content")]
    content: Vec<String>,
}

impl ProjectManifest {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| GenError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parse a manifest document. `path` is only used for error context.
    pub fn parse(document: &str, path: &Path) -> Result<Self> {
        let raw: IndexMap<String, RawEntry> =
            serde_json::from_str(document).map_err(|err| GenError::ManifestParse {
                path: path.to_path_buf(),
                detail: err.to_string(),
            })?;

        let mut entries = IndexMap::with_capacity(raw.len());
        for (key, raw_entry) in raw {
            if key.is_empty() {
                return Err(GenError::ManifestParse {
                    path: path.to_path_buf(),
                    detail: "generation key must not be empty".into(),
                });
            }
            let entry = resolve_entry(&key, raw_entry, path)?;
            entries.insert(key, entry);
        }
        Ok(Self { entries })
    }
}

fn resolve_entry(key: &str, raw: RawEntry, path: &Path) -> Result<ManifestEntry> {
    let Some(kind) = raw.kind else {
        return Ok(ManifestEntry::ContentOnly {
            values: raw.content,
        });
    };

    let declaration = match kind.as_str() {
        KIND_ENUM => TypeDeclaration::enumeration(
            require_field(key, "ClassName", raw.class_name, path)?,
            require_field(key, "Filepath", raw.filepath, path)?,
        ),
        KIND_ARRAY => TypeDeclaration::array(
            require_field(key, "Name", raw.name, path)?,
            require_field(key, "ElementType", raw.element_type, path)?,
            require_field(key, "Filepath", raw.filepath, path)?,
            raw.includes,
        ),
        _ => {
            return Err(GenError::UnknownTypeKind {
                key: key.to_string(),
                kind,
            });
        }
    };

    Ok(ManifestEntry::Owning {
        declaration,
        values: raw.content,
    })
}

fn require_field<T>(key: &str, field: &str, value: Option<T>, path: &Path) -> Result<T> {
    value.ok_or_else(|| GenError::ManifestParse {
        path: path.to_path_buf(),
        detail: format!("key '{key}' declares a type but is missing required field '{field}'"),
    })
}
