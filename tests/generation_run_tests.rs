//! End-to-end tests driving a full generation run: manifest files on disk,
//! discovery, parallel ingestion, and materialization through the real
//! filesystem store.

use assert_matches::assert_matches;
use genweave::{GenError, RunConfig, run_generation};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    manifest_root: PathBuf,
    output_root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp directory");
        let manifest_root = dir.path().join("projects");
        let output_root = dir.path().join("generated");
        fs::create_dir_all(&manifest_root).unwrap();
        Self {
            _dir: dir,
            manifest_root,
            output_root,
        }
    }

    fn add_manifest(&self, contributor: &str, document: &str) {
        let path = self.manifest_root.join(format!("{contributor}.codegen.json"));
        fs::write(path, document).unwrap();
    }

    fn config(&self) -> RunConfig {
        RunConfig {
            manifest_root: Some(self.manifest_root.clone()),
            manifests: vec![],
            output_root: self.output_root.clone(),
            sort_contributors: false,
            dry_run: false,
        }
    }

    fn artifact(&self, relative: &str) -> String {
        fs::read_to_string(self.output_root.join(relative)).unwrap()
    }

    fn artifact_exists(&self, relative: &str) -> bool {
        self.output_root.join(relative).exists()
    }
}

#[test]
fn enum_artifact_merges_contributions_from_two_projects() {
    let workspace = Workspace::new();
    workspace.add_manifest(
        "core",
        r#"{
            "Tags": {
                "Type": "Enum",
                "ClassName": "Tag",
                "Filepath": "tags.h",
                "Content": ["Global", "Engine"]
            }
        }"#,
    );
    workspace.add_manifest(
        "network",
        r#"{ "Tags": { "Content": ["Net"] } }"#,
    );

    let report = run_generation(workspace.config()).unwrap();
    assert_eq!(report.written.len(), 1);

    let text = workspace.artifact("tags.h");
    assert!(text.contains("#pragma once"));
    assert!(text.contains("enum class Tag"));
    let core = text.find("// core").unwrap();
    let global = text.find("Global,").unwrap();
    let engine = text.find("Engine,").unwrap();
    let network = text.find("// network").unwrap();
    let net = text.find("Net,").unwrap();
    assert!(core < global && global < engine && engine < network && network < net);
}

#[test]
fn array_artifact_tags_elements_with_contributor() {
    let workspace = Workspace::new();
    workspace.add_manifest(
        "a",
        r#"{
            "Handlers": {
                "Type": "Array",
                "Name": "handlers",
                "ElementType": "Handler",
                "Filepath": "handlers.h",
                "Includes": ["engine/handler.h"],
                "Content": ["h1", "h2"]
            }
        }"#,
    );

    run_generation(workspace.config()).unwrap();

    let text = workspace.artifact("handlers.h");
    assert!(text.contains("#include \"engine/handler.h\""));
    assert!(text.contains("#include \"gen/static_array.h\""));
    assert!(text.contains("Handler{ h1, \"a\" },"));
    assert!(text.contains("Handler{ h2, \"a\" },"));
}

#[test]
fn conflicting_declarations_abort_the_run_without_writing() {
    let workspace = Workspace::new();
    workspace.add_manifest(
        "core",
        r#"{
            "Dup": {
                "Type": "Enum",
                "ClassName": "CoreDup",
                "Filepath": "dup.h",
                "Content": []
            }
        }"#,
    );
    workspace.add_manifest(
        "engine",
        r#"{
            "Dup": {
                "Type": "Enum",
                "ClassName": "EngineDup",
                "Filepath": "dup.h",
                "Content": []
            }
        }"#,
    );

    let err = run_generation(workspace.config()).unwrap_err();
    let gen_err = err.downcast_ref::<GenError>().expect("expected GenError");
    assert_matches!(gen_err, GenError::DuplicateDeclaration { key, .. } => {
        assert_eq!(key, "Dup");
    });
    let message = gen_err.to_string();
    assert!(message.contains("CoreDup"));
    assert!(message.contains("EngineDup"));
    assert!(!workspace.artifact_exists("dup.h"));
}

#[test]
fn orphaned_keys_are_dropped_silently() {
    let workspace = Workspace::new();
    workspace.add_manifest("network", r#"{ "Unowned": { "Content": ["Net"] } }"#);

    let report = run_generation(workspace.config()).unwrap();
    assert_eq!(report.orphaned, vec!["Unowned".to_string()]);
    assert!(report.written.is_empty());
}

#[test]
fn second_run_with_identical_inputs_leaves_artifacts_unchanged() {
    let workspace = Workspace::new();
    workspace.add_manifest(
        "core",
        r#"{
            "Tags": {
                "Type": "Enum",
                "ClassName": "Tag",
                "Filepath": "tags.h",
                "Content": ["Global"]
            }
        }"#,
    );

    let first = run_generation(workspace.config()).unwrap();
    assert_eq!(first.written.len(), 1);
    assert!(first.unchanged.is_empty());

    let second = run_generation(workspace.config()).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 1);
}

#[test]
fn dry_run_reports_but_does_not_create_files() {
    let workspace = Workspace::new();
    workspace.add_manifest(
        "core",
        r#"{
            "Tags": {
                "Type": "Enum",
                "ClassName": "Tag",
                "Filepath": "tags.h",
                "Content": ["Global"]
            }
        }"#,
    );

    let mut config = workspace.config();
    config.dry_run = true;
    let report = run_generation(config).unwrap();

    assert_eq!(report.written.len(), 1);
    assert!(!workspace.artifact_exists("tags.h"));
}

#[test]
fn malformed_manifest_fails_the_run_with_its_path() {
    let workspace = Workspace::new();
    workspace.add_manifest("broken", "{ not json");

    let err = run_generation(workspace.config()).unwrap_err();
    let gen_err = err.downcast_ref::<GenError>().expect("expected GenError");
    assert_matches!(gen_err, GenError::ManifestParse { path, .. } => {
        assert!(path.ends_with(Path::new("broken.codegen.json")));
    });
}

#[test]
fn explicit_manifest_paths_work_without_a_root() {
    let workspace = Workspace::new();
    workspace.add_manifest(
        "core",
        r#"{
            "Tags": {
                "Type": "Enum",
                "ClassName": "Tag",
                "Filepath": "tags.h",
                "Content": ["Global"]
            }
        }"#,
    );

    let config = RunConfig {
        manifest_root: None,
        manifests: vec![workspace.manifest_root.join("core.codegen.json")],
        output_root: workspace.output_root.clone(),
        sort_contributors: false,
        dry_run: false,
    };
    let report = run_generation(config).unwrap();
    assert_eq!(report.written.len(), 1);
    assert!(workspace.artifact("tags.h").contains("// core"));
}

#[test]
fn duplicate_enum_literal_across_projects_fails_before_any_write() {
    let workspace = Workspace::new();
    workspace.add_manifest(
        "core",
        r#"{
            "Tags": {
                "Type": "Enum",
                "ClassName": "Tag",
                "Filepath": "tags.h",
                "Content": ["Global"]
            },
            "Other": {
                "Type": "Enum",
                "ClassName": "Other",
                "Filepath": "other.h",
                "Content": ["X"]
            }
        }"#,
    );
    workspace.add_manifest("engine", r#"{ "Tags": { "Content": ["Global"] } }"#);

    let err = run_generation(workspace.config()).unwrap_err();
    let gen_err = err.downcast_ref::<GenError>().expect("expected GenError");
    assert_matches!(gen_err, GenError::DuplicateValue { value, .. } => {
        assert_eq!(value, "Global");
    });
    // validation runs before the first write, so no artifact was touched
    assert!(!workspace.artifact_exists("tags.h"));
    assert!(!workspace.artifact_exists("other.h"));
}
