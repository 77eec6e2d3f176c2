//! Manifest Validator CLI
//!
//! Validates dot-organize manifests and inspects their derived key sets.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dot_organize::config::OutputFormat;
use dot_organize::present::{render_text, to_json_value};
use dot_organize::rules::CATALOGUE;
use dot_organize::{derive_key_sets, read_manifest_file, validate_with, ReadError, ValidatorConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Usage problems and missing files
const EXIT_USAGE: i32 = 2;

const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

#[derive(Parser)]
#[command(name = "dot-validate")]
#[command(about = "Validate dot-organize manifests")]
#[command(version)]
struct Cli {
    /// Config file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate manifest files or directories of manifests
    Validate {
        /// Files or directories (searched for *.yaml, *.yml, *.json)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        /// Skip WARN-severity rules
        #[arg(long)]
        no_warnings: bool,
    },

    /// List the rule catalogue
    Rules,

    /// Print the key sets derived from a manifest
    Keys {
        path: PathBuf,
    },

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default config file
    Init {
        #[arg(default_value = "dot.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_USAGE);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config_path = cli.config.as_deref().map(path_str).transpose()?;
    let mut config = ValidatorConfig::load_from(config_path).context("loading configuration")?;

    match cli.command {
        Commands::Validate {
            paths,
            json,
            no_warnings,
        } => {
            if json {
                config.output.format = OutputFormat::Json;
            }
            if no_warnings {
                config.validation.include_warnings = false;
            }
            validate_paths(&paths, &config)
        }

        Commands::Rules => {
            for rule in CATALOGUE {
                println!("{:<14} {:<5} {}", rule.id, rule.severity, rule.summary);
            }
            Ok(0)
        }

        Commands::Keys { path } => {
            let manifest = match read_manifest_file(&path) {
                Ok(manifest) => manifest,
                Err(e @ ReadError::NotFound(_)) => {
                    eprintln!("❌ {e}");
                    return Ok(EXIT_USAGE);
                }
                Err(e) => {
                    eprintln!("❌ {}: {e}", path.display());
                    return Ok(1);
                }
            };
            for key_set in derive_key_sets(&manifest) {
                println!("{}  ({})", key_set.name, key_set.frames.join(", "));
            }
            Ok(0)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", config.to_toml()?);
                Ok(0)
            }
            ConfigAction::Init { path, force } => {
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                ValidatorConfig::default().save(path_str(&path)?)?;
                println!("✅ Wrote {}", path.display());
                Ok(0)
            }
        },
    }
}

/// Validate every manifest under `paths`; the exit code is the worst seen
fn validate_paths(paths: &[PathBuf], config: &ValidatorConfig) -> anyhow::Result<i32> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            eprintln!("❌ File not found: {}", path.display());
            return Ok(EXIT_USAGE);
        }
        files.extend(collect_manifests(path)?);
    }
    if files.is_empty() {
        eprintln!("❌ No manifest files found");
        return Ok(EXIT_USAGE);
    }

    let mut exit_code = 0;
    let mut json_reports = Vec::new();

    for file in &files {
        debug!(file = %file.display(), "validating");
        let manifest = match read_manifest_file(file) {
            Ok(manifest) => manifest,
            Err(e) => {
                match config.output.format {
                    OutputFormat::Text => eprintln!("❌ {}: {e}", file.display()),
                    OutputFormat::Json => json_reports.push(serde_json::json!({
                        "file": file.display().to_string(),
                        "valid": false,
                        "parse_error": e.to_string(),
                    })),
                }
                exit_code = exit_code.max(1);
                continue;
            }
        };

        let report = validate_with(&manifest, config);
        exit_code = exit_code.max(report.outcome.exit_code());

        match config.output.format {
            OutputFormat::Text => {
                let marker = if report.is_valid() { "✅" } else { "❌" };
                println!("{marker} {}", file.display());
                println!("{}", render_text(&report));
                println!();
            }
            OutputFormat::Json => {
                let mut value = to_json_value(&report)?;
                value["file"] = serde_json::Value::String(file.display().to_string());
                json_reports.push(value);
            }
        }
    }

    if config.output.format == OutputFormat::Json {
        let out = if json_reports.len() == 1 {
            json_reports.remove(0)
        } else {
            serde_json::Value::Array(json_reports)
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    }

    Ok(exit_code)
}

fn collect_manifests(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", path.display()))?;
        let is_manifest = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext));
        if entry.file_type().is_file() && is_manifest {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn path_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}
