//! Rendering of merged artifacts into generated C++ source text.
//!
//! Both kinds share the same frame: an auto-generated banner naming the
//! originating key, `#pragma once`, and a fixed namespace wrapper. Values are
//! grouped by contributor, each group preceded by a comment naming the
//! contributor, in first-submission order (or sorted by contributor name when
//! the run opts in).

use crate::error::{GenError, Result};
use crate::model::{GeneratedArtifact, TypeShape};
use std::collections::HashMap;

/// Namespace wrapping every generated declaration.
const NAMESPACE: &str = "gen";

/// Container type used for generated array aggregates, and the framework
/// header that provides it. The include is always emitted after any declared
/// includes.
const ARRAY_CONTAINER_TYPE: &str = "StaticArray";
const ARRAY_CONTAINER_INCLUDE: &str = "gen/static_array.h";

const BANNER_RULE: &str =
    "// ---------------------------------------------------------------------------";

type OrderedContributions<'a> = Vec<(&'a String, &'a Vec<String>)>;

/// Render one artifact to source text.
///
/// Enumerations are validated for duplicate enumerator literals first: two
/// contributors (or one contributor twice) supplying the same literal would
/// only surface as a compiler error deep in a generated file, so it is
/// rejected here with both contributor names. Array elements carry the
/// contributor tag and cannot collide.
pub fn render_artifact(artifact: &GeneratedArtifact, sort_contributors: bool) -> Result<String> {
    let mut ordered: OrderedContributions<'_> = artifact.contributions.iter().collect();
    if sort_contributors {
        ordered.sort_by(|a, b| a.0.cmp(b.0));
    }

    match &artifact.declaration.shape {
        TypeShape::Enumeration => {
            check_duplicate_enumerators(&artifact.key, &ordered)?;
            Ok(render_enumeration(artifact, &ordered))
        }
        TypeShape::Array {
            element_type,
            includes,
        } => Ok(render_array(artifact, &ordered, element_type, includes)),
    }
}

fn check_duplicate_enumerators(key: &str, ordered: &OrderedContributions<'_>) -> Result<()> {
    let mut first_seen: HashMap<&str, &str> = HashMap::new();
    for (contributor, values) in ordered {
        for value in *values {
            if let Some(first_contributor) = first_seen.insert(value, contributor) {
                return Err(GenError::DuplicateValue {
                    key: key.to_string(),
                    value: value.clone(),
                    first_contributor: first_contributor.to_string(),
                    second_contributor: contributor.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn header(key: &str) -> String {
    format!(
        "{BANNER_RULE}\n\
         // Auto-generated from generation key '{key}'. Do not edit.\n\
         // Changes are overwritten on the next generation run.\n\
         {BANNER_RULE}\n\
         \n\
         #pragma once\n"
    )
}

fn footer(key: &str) -> String {
    format!("}} // namespace {NAMESPACE}\n\n// End of generated file for key '{key}'.\n")
}

fn render_enumeration(artifact: &GeneratedArtifact, ordered: &OrderedContributions<'_>) -> String {
    let mut out = header(&artifact.key);
    out.push_str(&format!("\nnamespace {NAMESPACE}\n{{\n"));
    out.push_str(&format!(
        "  enum class {}\n  {{\n",
        artifact.declaration.target_name
    ));
    for (contributor, values) in ordered {
        if values.is_empty() {
            continue;
        }
        out.push_str(&format!("    // {contributor}\n"));
        for value in *values {
            out.push_str(&format!("    {value},\n"));
        }
    }
    out.push_str("  };\n");
    out.push_str(&footer(&artifact.key));
    out
}

fn render_array(
    artifact: &GeneratedArtifact,
    ordered: &OrderedContributions<'_>,
    element_type: &str,
    includes: &[String],
) -> String {
    let mut out = header(&artifact.key);
    out.push('\n');
    for include in includes {
        out.push_str(&format!("#include \"{include}\"\n"));
    }
    out.push_str(&format!("#include \"{ARRAY_CONTAINER_INCLUDE}\"\n"));

    let count = artifact.value_count();
    out.push_str(&format!("\nnamespace {NAMESPACE}\n{{\n"));
    out.push_str(&format!(
        "  inline {ARRAY_CONTAINER_TYPE}<{element_type}, {count}> {} = {{\n",
        artifact.declaration.target_name
    ));
    for (contributor, values) in ordered {
        if values.is_empty() {
            continue;
        }
        out.push_str(&format!("    // {contributor}\n"));
        for value in *values {
            out.push_str(&format!("    {element_type}{{ {value}, \"{contributor}\" }},\n"));
        }
    }
    out.push_str("  };\n");
    out.push_str(&footer(&artifact.key));
    out
}
