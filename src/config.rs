use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "genweave",
    about = "Merge per-project code-generation manifests into generated sources",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "GENWEAVE_MANIFEST_ROOT",
        value_name = "DIR",
        help = "Directory scanned recursively for *.codegen.json project manifests"
    )]
    pub manifest_root: Option<PathBuf>,

    #[arg(
        long = "manifest",
        value_name = "FILE",
        help = "Explicit manifest path, may be given multiple times"
    )]
    pub manifests: Vec<PathBuf>,

    #[arg(
        long,
        env = "GENWEAVE_OUTPUT_ROOT",
        value_name = "DIR",
        help = "Root directory for relative artifact destination paths"
    )]
    pub output_root: Option<PathBuf>,

    #[arg(long, help = "Sort contributors by name at render time")]
    pub sort_contributors: bool,

    #[arg(long, help = "Render and diff artifacts but do not write anything")]
    pub dry_run: bool,
}

/// Fully resolved run configuration: CLI over config file over defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub manifest_root: Option<PathBuf>,
    pub manifests: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub sort_contributors: bool,
    pub dry_run: bool,
}

impl RunConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            manifest_root: cli_manifest_root,
            manifests: cli_manifests,
            output_root: cli_output_root,
            sort_contributors: cli_sort_contributors,
            dry_run: cli_dry_run,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            manifest_root: file_manifest_root,
            manifests: file_manifests,
            output_root: file_output_root,
            sort_contributors: file_sort_contributors,
            dry_run: file_dry_run,
        } = file_config;

        let manifests = if cli_manifests.is_empty() {
            file_manifests.unwrap_or_default()
        } else {
            cli_manifests
        };

        let manifest_root = cli_manifest_root.or(file_manifest_root);

        anyhow::ensure!(
            manifest_root.is_some() || !manifests.is_empty(),
            "no manifests to process: provide --manifest-root or at least one --manifest"
        );

        Ok(Self {
            manifest_root,
            manifests,
            output_root: cli_output_root
                .or(file_output_root)
                .unwrap_or_else(|| PathBuf::from(".")),
            sort_contributors: cli_sort_contributors || file_sort_contributors.unwrap_or(false),
            dry_run: cli_dry_run || file_dry_run.unwrap_or(false),
        })
    }

    pub fn ensure_inputs(&self) -> Result<()> {
        if let Some(root) = self.manifest_root.as_ref() {
            anyhow::ensure!(
                root.exists(),
                "manifest root {} does not exist",
                root.display()
            );
            anyhow::ensure!(
                root.is_dir(),
                "manifest root {} is not a directory",
                root.display()
            );
        }
        for manifest in &self.manifests {
            anyhow::ensure!(
                manifest.is_file(),
                "manifest {} does not exist or is not a file",
                manifest.display()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    manifest_root: Option<PathBuf>,
    manifests: Option<Vec<PathBuf>>,
    output_root: Option<PathBuf>,
    sort_contributors: Option<bool>,
    dry_run: Option<bool>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {} does not exist", path.display());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {}", path.display()))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {}", path.display()))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
