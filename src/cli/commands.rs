//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, subcommands, and their arguments.

use crate::config::Config;
use crate::error::{Result, SettexError};
use crate::interchange::{
    resolve, serialize, stage, validate, BlobRejection, CodeBlockLocator, ExportContext, Scanner,
    SettingsBlob,
};
use crate::registry::SettingsStore;
use crate::utils::format::{DisplayUtils, OutputFormat, TableFormatter};
use crate::version::{current_version, VERSION_HISTORY};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tabled::Tabled;
use tracing::debug;

#[derive(Parser)]
#[command(name = "stx")]
#[command(about = "Share and restore application settings as portable text blobs")]
#[command(version = current_version(), author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a settings collection as a shareable blob
    Export {
        /// Name of the collection to export
        collection: String,
        /// Write the blob to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Username for the manifest, overriding the configured one
        #[arg(long)]
        user: Option<String>,
    },
    /// Validate a settings blob and stage its values into the store
    Import {
        /// Blob file; reads stdin when omitted or '-'
        file: Option<PathBuf>,
        /// Report what would be applied without committing
        #[arg(long)]
        dry_run: bool,
    },
    /// Find settings blobs inside a shared document
    Scan {
        /// Document to scan (Markdown or plain text)
        file: PathBuf,
        /// Stage and commit every valid blob found
        #[arg(long)]
        apply: bool,
    },
    /// Check whether a file contains a valid settings blob
    Validate {
        file: PathBuf,
    },
    /// List the configured export collections
    Collections,
    /// List store modules, or the options of one module
    Modules {
        module_id: Option<String>,
    },
    /// Show or change settex configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print version and release history
    Version,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Print the config file location
    Path,
    /// Set the username used in export manifests
    SetUser { username: String },
    /// Set the settings store location
    SetStore { path: PathBuf },
}

#[derive(Tabled, Serialize)]
struct CollectionRow {
    #[tabled(rename = "Collection")]
    collection: String,
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Options")]
    options: String,
    #[tabled(rename = "Private")]
    private: String,
}

#[derive(Tabled, Serialize)]
struct ModuleRow {
    #[tabled(rename = "Module")]
    id: String,
    #[tabled(rename = "Options")]
    options: usize,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled, Serialize)]
struct OptionRow {
    #[tabled(rename = "Option")]
    key: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Private")]
    private: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled, Serialize)]
struct BlobRow {
    #[tabled(rename = "From")]
    username: String,
    #[tabled(rename = "Exported")]
    exported: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Entries")]
    entries: usize,
}

#[derive(Tabled, Serialize)]
struct SkippedRow {
    #[tabled(rename = "Entry")]
    index: usize,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl Cli {
    pub async fn execute(self, mut config: Config) -> Result<()> {
        let no_color = self.no_color || config.no_color;
        let formatter = TableFormatter::new(self.format, no_color);
        let display = DisplayUtils::new(no_color);

        match self.command {
            Commands::Export {
                collection,
                output,
                user,
            } => handle_export(&config, &display, &collection, output, user).await,
            Commands::Import { file, dry_run } => {
                handle_import(&config, &formatter, &display, file, dry_run).await
            }
            Commands::Scan { file, apply } => {
                handle_scan(&config, &formatter, &display, &file, apply).await
            }
            Commands::Validate { file } => handle_validate(&display, &file).await,
            Commands::Collections => handle_collections(&config, &formatter),
            Commands::Modules { module_id } => handle_modules(&config, &formatter, module_id),
            Commands::Config { command } => handle_config(&mut config, &display, command).await,
            Commands::Version => handle_version(&display),
            Commands::Completions { shell } => {
                clap_complete::generate(shell, &mut Cli::command(), "stx", &mut std::io::stdout());
                Ok(())
            }
        }
    }
}

fn load_store(config: &Config) -> Result<SettingsStore> {
    let path = config.resolve_store_path()?;
    if !path.exists() {
        return Err(SettexError::store(format!(
            "settings store not found at {} (set store_path in the config or SETTEX_STORE)",
            path.display()
        )));
    }
    SettingsStore::load(&path)
}

async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => Ok(tokio::fs::read_to_string(path).await?),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

async fn handle_export(
    config: &Config,
    display: &DisplayUtils,
    collection: &str,
    output: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    if !config.collections.iter().any(|r| r.collection == collection) {
        return Err(SettexError::collection_not_found(collection));
    }

    let store = load_store(config)?;
    let triples = resolve(&store, &config.collections, collection);
    if triples.is_empty() {
        display.print_warning("collection resolved to no exportable options");
    }

    let context = ExportContext {
        username: user.unwrap_or_else(|| config.username.clone()),
        version: current_version().to_string(),
    };
    let text = serialize(&store, &triples, &context)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, format!("{text}\n")).await?;
            display.print_success(&format!(
                "Exported {} option value(s) to {}",
                triples.len(),
                path.display()
            ));
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn print_stage_summary(
    formatter: &TableFormatter,
    display: &DisplayUtils,
    blob: &SettingsBlob,
    report: &crate::interchange::StageReport,
) -> Result<()> {
    println!(
        "{}",
        display.format_key_value_pairs(&[
            ("From", blob.manifest.username.clone()),
            ("Exported", blob.manifest.exported.clone()),
            ("Version", blob.manifest.version.clone()),
            ("Applied", report.applied.to_string()),
            ("Skipped", report.skipped.len().to_string()),
        ])
    );
    if !report.skipped.is_empty() {
        let rows: Vec<SkippedRow> = report
            .skipped
            .iter()
            .map(|e| SkippedRow {
                index: e.index,
                reason: e.to_string(),
            })
            .collect();
        println!("{}", formatter.format_table(&rows)?);
    }
    Ok(())
}

async fn handle_import(
    config: &Config,
    formatter: &TableFormatter,
    display: &DisplayUtils,
    file: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let text = read_input(file.as_deref()).await?;
    let blob = validate(text.trim()).map_err(|r| SettexError::invalid_blob(r.to_string()))?;

    let mut store = load_store(config)?;
    let report = stage(&mut store, &blob);
    print_stage_summary(formatter, display, &blob, &report)?;

    if dry_run {
        display.print_warning("dry run: no values committed");
        return Ok(());
    }

    store.commit()?;
    display.print_success(&format!("Applied {} option value(s)", report.applied));
    Ok(())
}

async fn handle_scan(
    config: &Config,
    formatter: &TableFormatter,
    display: &DisplayUtils,
    file: &Path,
    apply: bool,
) -> Result<()> {
    let document = tokio::fs::read_to_string(file).await?;
    let mut scanner = Scanner::new(CodeBlockLocator::new());
    let report = scanner.scan(&document);

    for rejection in &report.rejections {
        match rejection {
            BlobRejection::VersionMismatch { .. } => display.print_warning(&rejection.to_string()),
            // most code fragments are simply not blobs
            _ => debug!(%rejection, "fragment rejected"),
        }
    }

    if report.found.is_empty() {
        println!("No settings blobs found in {}", file.display());
        return Ok(());
    }

    let rows: Vec<BlobRow> = report
        .found
        .iter()
        .map(|blob| BlobRow {
            username: blob.manifest.username.clone(),
            exported: blob.manifest.exported.clone(),
            version: blob.manifest.version.clone(),
            entries: blob.options.len(),
        })
        .collect();
    println!("{}", formatter.format_table(&rows)?);

    if !apply {
        println!("Re-run with --apply to stage these settings");
        return Ok(());
    }

    let mut store = load_store(config)?;
    for blob in &report.found {
        let stage_report = stage(&mut store, blob);
        print_stage_summary(formatter, display, blob, &stage_report)?;
        store.commit()?;
        display.print_success(&format!("Applied {} option value(s)", stage_report.applied));
    }
    Ok(())
}

async fn handle_validate(display: &DisplayUtils, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file).await?;
    let blob = validate(text.trim()).map_err(|r| SettexError::invalid_blob(r.to_string()))?;
    display.print_success(&format!(
        "Valid settings blob from '{}' with {} entr{}",
        blob.manifest.username,
        blob.options.len(),
        if blob.options.len() == 1 { "y" } else { "ies" }
    ));
    Ok(())
}

fn handle_collections(config: &Config, formatter: &TableFormatter) -> Result<()> {
    let rows: Vec<CollectionRow> = config
        .collections
        .iter()
        .map(|row| CollectionRow {
            collection: row.collection.clone(),
            module: row.module_id.clone(),
            options: row.option_keys.clone(),
            private: if row.include_private { "yes" } else { "no" }.to_string(),
        })
        .collect();
    println!("{}", formatter.format_table(&rows)?);
    Ok(())
}

fn handle_modules(
    config: &Config,
    formatter: &TableFormatter,
    module_id: Option<String>,
) -> Result<()> {
    let store = load_store(config)?;

    match module_id {
        None => {
            let rows: Vec<ModuleRow> = store
                .modules()
                .filter(|(_, module)| !module.options.is_empty())
                .map(|(id, module)| ModuleRow {
                    id: id.clone(),
                    options: module.options.len(),
                    description: module.description.clone().unwrap_or_default(),
                })
                .collect();
            println!("{}", formatter.format_table(&rows)?);
        }
        Some(module_id) => {
            let module = store
                .module(&module_id)
                .ok_or_else(|| SettexError::unknown_module(module_id.as_str()))?;
            let rows: Vec<OptionRow> = module
                .options
                .iter()
                .map(|(key, decl)| OptionRow {
                    key: key.clone(),
                    kind: decl.kind.as_str().to_string(),
                    private: if decl.private { "yes" } else { "no" }.to_string(),
                    description: decl.description.clone().unwrap_or_default(),
                })
                .collect();
            println!("{}", formatter.format_table(&rows)?);
        }
    }
    Ok(())
}

async fn handle_config(
    config: &mut Config,
    display: &DisplayUtils,
    command: ConfigCommands,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let store = config
                .resolve_store_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            println!(
                "{}",
                display.format_key_value_pairs(&[
                    ("Username", config.username.clone()),
                    ("Store", store),
                    ("Collections", config.collections.len().to_string()),
                ])
            );
        }
        ConfigCommands::Path => {
            println!("{}", Config::get_config_path()?.display());
        }
        ConfigCommands::SetUser { username } => {
            config.username = username;
            config.save().await?;
            display.print_success("Username updated");
        }
        ConfigCommands::SetStore { path } => {
            config.store_path = Some(path);
            config.save().await?;
            display.print_success("Store path updated");
        }
    }
    Ok(())
}

fn handle_version(display: &DisplayUtils) -> Result<()> {
    println!(
        "{}",
        display.format_key_value_pairs(&[
            ("settex", current_version().to_string()),
            ("History", VERSION_HISTORY.join(", ")),
        ])
    );
    Ok(())
}
